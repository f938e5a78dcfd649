use crate::utils::error::{ReportError, Result};
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Results of a fan-out batch, in completion order.
#[derive(Debug)]
pub struct BatchOutcome<R> {
    pub completed: Vec<R>,
    pub failures: Vec<ReportError>,
}

impl<R> BatchOutcome<R> {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    /// Collapses the batch into a single result. Without `allow_partial`,
    /// any failed task fails the batch; with it, failures are logged and dropped.
    pub fn into_result(self, allow_partial: bool) -> Result<Vec<R>> {
        if self.failures.is_empty() {
            return Ok(self.completed);
        }

        let total = self.total();
        let failed = self.failures.len();
        for failure in &self.failures {
            tracing::error!("❌ Task failed: {}", failure);
        }

        if allow_partial {
            tracing::warn!(
                "Continuing with {} of {} tasks; {} failed",
                self.completed.len(),
                total,
                failed
            );
            return Ok(self.completed);
        }

        let first = self
            .failures
            .into_iter()
            .next()
            .map(|e| e.to_string())
            .unwrap_or_default();
        Err(ReportError::BatchError {
            failed,
            total,
            first,
        })
    }
}

/// Runs `task` for every item on the tokio runtime, at most `workers` at a
/// time. Every task runs to completion; one task failing never cancels the
/// others. Output order follows completion, not input.
pub async fn fan_out<T, R, F, Fut>(items: Vec<T>, workers: usize, task: F) -> BatchOutcome<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let mut outcome = BatchOutcome {
        completed: Vec::with_capacity(items.len()),
        failures: Vec::new(),
    };

    let mut results = stream::iter(items)
        .map(|item| tokio::spawn(task(item)))
        .buffer_unordered(workers.max(1));

    while let Some(joined) = results.next().await {
        match joined {
            Ok(Ok(value)) => outcome.completed.push(value),
            Ok(Err(e)) => outcome.failures.push(e),
            Err(join_error) => outcome.failures.push(ReportError::TaskJoinError(join_error)),
        }
    }

    outcome
}

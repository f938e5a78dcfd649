use crate::adapters::ApiClient;
use crate::core::csv_export;
use crate::domain::model::Customer;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Rows a report hands to the CSV writer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    CustomerTable(Vec<Customer>),
    SingleColumn(Vec<String>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::CustomerTable(rows) => rows.len(),
            ReportRows::SingleColumn(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        match self {
            ReportRows::CustomerTable(customers) => csv_export::encode_customer_table(customers),
            ReportRows::SingleColumn(values) => csv_export::encode_single_column(values),
        }
    }
}

#[async_trait]
pub trait Report: Send + Sync {
    /// Noun used in the `Number of ...` summary line.
    fn label(&self) -> &'static str;
    fn file_name(&self) -> &'static str;
    async fn extract(&self, api: Arc<ApiClient>) -> Result<ReportRows>;
}

#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub label: &'static str,
    pub count: usize,
    pub output_path: PathBuf,
}

pub struct ReportEngine<S: Storage> {
    api: Arc<ApiClient>,
    storage: S,
}

impl<S: Storage> ReportEngine<S> {
    pub fn new(api: Arc<ApiClient>, storage: S) -> Self {
        Self { api, storage }
    }

    pub async fn run(&self, report: &dyn Report) -> Result<ReportSummary> {
        tracing::info!("🚀 Starting report: {}", report.label());

        let started = Instant::now();
        let rows = report.extract(self.api.clone()).await?;
        tracing::info!(
            "Extracted {} rows in {:?}",
            rows.len(),
            started.elapsed()
        );
        if rows.is_empty() {
            tracing::warn!("{} report has no rows", report.label());
        }

        let started = Instant::now();
        let data = rows.to_csv()?;
        tracing::debug!("Encoded {} bytes of CSV in {:?}", data.len(), started.elapsed());

        let started = Instant::now();
        let output_path = self.storage.write_file(report.file_name(), &data).await?;
        tracing::info!(
            "📁 Output saved to: {} ({:?})",
            output_path.display(),
            started.elapsed()
        );

        Ok(ReportSummary {
            label: report.label(),
            count: rows.len(),
            output_path,
        })
    }
}

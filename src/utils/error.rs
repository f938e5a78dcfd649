use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed{}: {message}", status_suffix(.status))]
    AuthError { status: Option<u16>, message: String },

    #[error("Request to {url} failed with status {status}")]
    HttpError { status: u16, url: String },

    #[error("{failed} of {total} tasks failed (first error: {first})")]
    BatchError {
        failed: usize,
        total: usize,
        first: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Remote side failed; rerunning later may succeed.
    Medium,
    /// Local processing or filesystem failure.
    High,
    /// Nothing will work until config or credentials are fixed.
    Critical,
}

impl ReportError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReportError::ApiError(_)
            | ReportError::HttpError { .. }
            | ReportError::BatchError { .. } => ErrorSeverity::Medium,
            ReportError::CsvError(_)
            | ReportError::IoError(_)
            | ReportError::SerializationError(_)
            | ReportError::TaskJoinError(_) => ErrorSeverity::High,
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::AuthError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. } => {
                "Check the config file (tenant_id, client_id, client_secret) and its format"
            }
            ReportError::AuthError { .. } => "Verify the client credentials and tenant id",
            ReportError::HttpError { status: 401, .. } => {
                "The API rejected a freshly issued token; check tenant permissions"
            }
            ReportError::HttpError { .. } | ReportError::ApiError(_) => {
                "The vendor API is unreachable or failing; retry later or raise request_timeout_secs"
            }
            ReportError::BatchError { .. } => {
                "Some customers could not be fetched; rerun, or set allow_partial to keep the rest"
            }
            ReportError::IoError(_) | ReportError::CsvError(_) => {
                "Check that the output directory is writable"
            }
            ReportError::SerializationError(_) => "The API returned an unexpected payload",
            ReportError::TaskJoinError(_) => "A worker task panicked; rerun with --verbose",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" with status {}", s))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ReportError>;

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::{ApiClient, LocalStorage};
pub use config::AppConfig;
pub use crate::core::{Report, ReportEngine, ReportSummary};
pub use utils::error::{ReportError, Result};

pub mod aggregator;
pub mod csv_export;
pub mod engine;
pub mod filters;
pub mod pagination;

pub use engine::{Report, ReportEngine, ReportRows, ReportSummary};

pub mod assistant;
pub mod executor;
pub mod pipeline;
pub mod report;
pub mod reports;

pub use executor::QueryExecutor;
pub use pipeline::{run_report, ReportRequest};
pub use report::{DataQuality, RatioField, ReportResult, ReportSpec};

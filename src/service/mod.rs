pub mod aging;
pub mod clients;
pub mod fanout;
pub mod grouping;
pub mod periods;
pub mod report;

pub use clients::ClientFilter;
pub use report::{ReportService, TREND_MONTHS};

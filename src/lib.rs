pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::{QueryClient, QueryExecutor};
pub use error::{ApiError, QueryError};
pub use service::{ClientFilter, ReportService};

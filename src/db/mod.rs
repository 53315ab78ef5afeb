pub mod client;
pub mod guard;
pub mod queries;

pub use client::{auth_token, query_as, QueryClient, QueryExecutor};
pub use guard::validate_query;
pub use queries::*;

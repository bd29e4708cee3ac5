pub mod config;
pub mod error;
pub mod models;
pub mod query_builder;

pub use error::{QueryBuildError, Result};
pub use models::{CanaryScope, MetricQueryConfig};
pub use query_builder::QueryBuilder;

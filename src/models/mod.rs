pub mod query;
pub mod scope;

pub use query::MetricQueryConfig;
pub use scope::{CanaryScope, format_instant};

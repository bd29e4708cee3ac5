use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time window and deployment scope a canary metric is fetched for.
///
/// Only `start`, `end` and `scope` shape the query. The remaining fields
/// travel with the scope for the collaborators that schedule and execute it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanaryScope {
    /// Optional `name:value` equality filter, e.g. `autoscaling_group:myapp-prod-v002`.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Inclusive window start.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Exclusive window end.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Sampling step in seconds.
    #[serde(default)]
    pub step: Option<u64>,
    #[serde(default)]
    pub extended_scope_params: BTreeMap<String, String>,
}

impl CanaryScope {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_step(mut self, step_secs: u64) -> Self {
        self.step = Some(step_secs);
        self
    }
}

/// Render an instant as RFC 3339 UTC (`Z` suffix), printing sub-second
/// digits only when the instant has them.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

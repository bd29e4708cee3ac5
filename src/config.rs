use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::models::{CanaryScope, MetricQueryConfig};
use crate::query_builder::QueryBuilder;

/// Catalog of canary metric queries loaded from `influx-query.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct QueryCatalog {
    #[serde(default)]
    pub defaults: CatalogDefaults,
    #[serde(default)]
    pub metrics: Vec<NamedMetricQuery>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogDefaults {
    /// Scope expression applied when the caller does not supply one.
    pub scope: Option<String>,
}

/// A canary metric: its display name plus the InfluxDB query config.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedMetricQuery {
    pub name: String,
    #[serde(flatten)]
    pub query: MetricQueryConfig,
}

impl QueryCatalog {
    /// Load the catalog from a TOML file. Returns an empty catalog if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("catalog file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            "loaded {} metric queries from {}",
            catalog.metrics.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn metric(&self, name: &str) -> Option<&NamedMetricQuery> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn default_scope(&self) -> Option<&str> {
        self.defaults.scope.as_deref()
    }

    /// Render every metric in the catalog against one scope, in file order.
    /// A failing metric does not stop the others.
    pub fn build_all(&self, scope: &CanaryScope) -> Vec<(&str, Result<String>)> {
        let builder = QueryBuilder::new();
        self.metrics
            .iter()
            .map(|m| (m.name.as_str(), builder.build(&m.query, Some(scope))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    const CATALOG: &str = r#"
[defaults]
scope = "server:myapp-prod-v002"

[[metrics]]
name = "temperature"
metric_name = "temperature"
fields = ["external", "internal"]

[[metrics]]
name = "grouped"
metricName = "temperature"
groupByFields = ["time(1m)", "label1"]

[metrics.tags]
label2 = "value2"
label1 = "value1"

[[metrics]]
name = "broken"
metric_name = ""
"#;

    fn scope() -> CanaryScope {
        CanaryScope::new(
            Utc.timestamp_opt(1262347200, 0).unwrap(),
            Utc.timestamp_opt(1262347300, 0).unwrap(),
        )
        .with_scope("server:myapp-prod-v002")
    }

    #[test]
    fn parse_catalog() {
        let catalog = QueryCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.default_scope(), Some("server:myapp-prod-v002"));
        assert_eq!(catalog.metrics.len(), 3);

        let grouped = catalog.metric("grouped").unwrap();
        assert_eq!(grouped.query.metric_name, "temperature");
        assert_eq!(grouped.query.tags.as_ref().unwrap().len(), 2);
        assert!(catalog.metric("missing").is_none());
    }

    #[test]
    fn build_all_keeps_going_past_failures() {
        let catalog = QueryCatalog::from_toml_str(CATALOG).unwrap();
        let built = catalog.build_all(&scope());
        assert_eq!(built.len(), 3);

        assert_eq!(built[0].0, "temperature");
        assert_eq!(
            built[1].1.as_deref().unwrap(),
            "SELECT *::field FROM temperature WHERE time >= '2010-01-01T12:00:00Z' AND time < '2010-01-01T12:01:40Z' AND server='myapp-prod-v002' AND label1='value1' AND label2='value2' GROUP BY time(1m), label1"
        );
        assert!(built[2].1.as_ref().unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = QueryCatalog::load(dir.path().join("absent.toml")).unwrap();
        assert!(catalog.metrics.is_empty());
        assert!(catalog.default_scope().is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let catalog = QueryCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.metrics.len(), 3);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[metrics]]\nname = ").unwrap();
        assert!(QueryCatalog::load(file.path()).is_err());
    }
}

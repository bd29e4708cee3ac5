use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declarative description of the InfluxDB series a canary metric reads.
///
/// Accepts the canary JSON shape (`metricName`, `groupByFields`) as well as
/// snake_case keys so the same type can be read from TOML catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQueryConfig {
    /// Measurement to select from. Rendered verbatim.
    #[serde(alias = "metric_name")]
    pub metric_name: String,
    /// Fields to select. `None` or empty selects every field.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Exact-match tag filters, rendered in ascending key order.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Grouping expressions such as `time(1m)` or a tag key, kept in order.
    #[serde(default, alias = "group_by_fields")]
    pub group_by_fields: Option<Vec<String>>,
}

impl MetricQueryConfig {
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            ..Self::default()
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags = Some(
            tags.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn with_group_by_fields<I, S>(mut self, group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by_fields = Some(group_by.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_canary_json() {
        let json = r#"{
            "metricName": "temperature",
            "fields": ["external", "internal"],
            "tags": {"label2": "value2", "label1": "value1"},
            "groupByFields": ["time(1m)"]
        }"#;
        let config: MetricQueryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.metric_name, "temperature");
        assert_eq!(
            config.fields,
            Some(vec!["external".to_string(), "internal".to_string()])
        );
        let tags = config.tags.unwrap();
        assert_eq!(
            tags.keys().collect::<Vec<_>>(),
            vec!["label1", "label2"]
        );
        assert_eq!(config.group_by_fields, Some(vec!["time(1m)".to_string()]));
    }

    #[test]
    fn deserialize_nulls_and_missing_keys() {
        let json = r#"{"metricName": "temperature", "fields": null}"#;
        let config: MetricQueryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, MetricQueryConfig::new("temperature"));
    }

    #[test]
    fn deserialize_snake_case_aliases() {
        let json = r#"{"metric_name": "cpu", "group_by_fields": ["host"]}"#;
        let config: MetricQueryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.metric_name, "cpu");
        assert_eq!(config.group_by_fields, Some(vec!["host".to_string()]));
    }

    #[test]
    fn builder_sets_every_part() {
        let config = MetricQueryConfig::new("temperature")
            .with_fields(["external"])
            .with_tags([("label1", "value1")])
            .with_group_by_fields(["time(1m)", "label1"]);
        assert_eq!(config.fields.as_deref(), Some(&["external".to_string()][..]));
        assert_eq!(config.tags.unwrap()["label1"], "value1");
        assert_eq!(config.group_by_fields.unwrap().len(), 2);
    }
}

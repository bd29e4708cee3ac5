use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::{QueryBuildError, Result};
use crate::models::{CanaryScope, MetricQueryConfig, format_instant};

/// Wildcard selecting every field (but no tags) of a measurement.
pub const ALL_FIELDS: &str = "*::field";

const SCOPE_INVALID_FORMAT_MSG: &str = "Scope expected in the format of 'name:value'. e.g. autoscaling_group:myapp-prod-v002, received: ";

/// Builds InfluxQL select statements for canary metric fetches.
///
/// Stateless: one instance can be shared freely across threads.
///
/// Scope and tag values are interpolated into single-quoted literals as-is.
/// Nothing is escaped, so a value containing `'` produces a broken query.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the query for `config` over the window described by `scope`.
    ///
    /// Clauses are emitted in a fixed order: SELECT, FROM, WHERE (time
    /// range, scope filter, tag filters), GROUP BY. Absent optional inputs
    /// drop their fragment entirely.
    pub fn build(&self, config: &MetricQueryConfig, scope: Option<&CanaryScope>) -> Result<String> {
        let (canary_scope, start, end) = validate_mandatory_params(config, scope)?;

        let scope_filter = canary_scope
            .scope
            .as_deref()
            .map(parse_scope)
            .transpose()?;

        let mut clauses = vec![
            select_clause(config.fields.as_deref()),
            format!("FROM {}", config.metric_name),
            where_clause(start, end, scope_filter, config.tags.as_ref()),
        ];
        if let Some(group_by) = group_by_clause(config.group_by_fields.as_deref()) {
            clauses.push(group_by);
        }

        let query = clauses.join(" ");
        tracing::debug!("built query: {query} config: {config:?} scope: {canary_scope:?}");
        Ok(query)
    }
}

fn validate_mandatory_params<'a>(
    config: &MetricQueryConfig,
    scope: Option<&'a CanaryScope>,
) -> Result<(&'a CanaryScope, &'a DateTime<Utc>, &'a DateTime<Utc>)> {
    if config.metric_name.is_empty() {
        return Err(QueryBuildError::InvalidConfiguration(
            "Measurement is required to query metrics".to_string(),
        ));
    }
    let Some(scope) = scope else {
        return Err(QueryBuildError::InvalidConfiguration(
            "CanaryScope is missing".to_string(),
        ));
    };
    match (scope.start.as_ref(), scope.end.as_ref()) {
        (Some(start), Some(end)) => Ok((scope, start, end)),
        _ => Err(QueryBuildError::InvalidConfiguration(
            "Start and End times are required".to_string(),
        )),
    }
}

/// `SELECT a, b`, or `SELECT *::field` when no fields are given.
pub fn select_clause(fields: Option<&[String]>) -> String {
    match fields {
        Some(fields) if !fields.is_empty() => format!("SELECT {}", fields.join(", ")),
        _ => format!("SELECT {ALL_FIELDS}"),
    }
}

/// Build the WHERE clause: half-open time range, then the scope filter,
/// then every tag filter in key order.
pub fn where_clause(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    scope_filter: Option<(&str, &str)>,
    tags: Option<&BTreeMap<String, String>>,
) -> String {
    let mut conditions = vec![
        format!("time >= '{}'", format_instant(start)),
        format!("time < '{}'", format_instant(end)),
    ];

    if let Some((key, value)) = scope_filter {
        conditions.push(format!("{key}='{value}'"));
    }

    if let Some(tags) = tags {
        conditions.extend(tags.iter().map(|(key, value)| format!("{key}='{value}'")));
    }

    format!("WHERE {}", conditions.join(" AND "))
}

/// `GROUP BY a, b` in the given order, or `None` when there is nothing to group by.
pub fn group_by_clause(group_by: Option<&[String]>) -> Option<String> {
    match group_by {
        Some(exprs) if !exprs.is_empty() => Some(format!("GROUP BY {}", exprs.join(", "))),
        _ => None,
    }
}

/// Split a `name:value` scope expression into its two parts.
///
/// Exactly one `:` is allowed and neither side may be empty.
pub fn parse_scope(raw: &str) -> Result<(&str, &str)> {
    let invalid = || QueryBuildError::InvalidScopeFormat(format!("{SCOPE_INVALID_FORMAT_MSG}{raw}"));

    let (key, value) = raw.split_once(':').ok_or_else(invalid)?;
    if key.is_empty() || value.is_empty() || value.contains(':') {
        return Err(invalid());
    }
    Ok((key, value))
}

//! Declarative report definitions.
//!
//! A report is described by data, not code: its query template, where rows
//! carry their site and date, which fields are additive, which are
//! non-additive, which are monetary, and which summary ratios to derive.
//! New report types are added by declaring field roles, not by duplicating
//! pipeline code.

use serde::Serialize;
use serde_json::Value;

use cartlytics_core::currency::MonetaryField;
use cartlytics_core::row::{numeric_or_zero, Row};

/// A derived summary ratio: `name = total(numerator) / total(denominator)`,
/// zero when the denominator is zero.
#[derive(Debug, Clone)]
pub struct RatioField {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

impl RatioField {
    pub fn new(name: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            name: name.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }
}

/// Full declarative description of one report pipeline.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub name: &'static str,
    /// Query template with a `{site_filter}` placeholder. Bound values are
    /// always passed as named parameters, never interpolated.
    pub query: String,
    /// Field carrying the warehouse site identifier on each row.
    pub site_field: String,
    /// Field carrying the row's date, used for rate-month selection and
    /// normalized from driver value-objects before use.
    pub date_field: String,
    pub group_by: Vec<String>,
    pub sum_fields: Vec<String>,
    pub max_fields: Vec<String>,
    pub monetary_fields: Vec<MonetaryField>,
    pub ratios: Vec<RatioField>,
}

impl ReportSpec {
    /// Date fields needing value-object normalization: the row date plus
    /// any distinct date field named by a monetary descriptor.
    pub fn date_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.date_field.as_str()];
        for m in &self.monetary_fields {
            if !fields.contains(&m.date_field.as_str()) {
                fields.push(m.date_field.as_str());
            }
        }
        fields
    }
}

/// Per-response data-quality signal.
///
/// Missing exchange rates degrade values to unconverted rather than failing
/// the report; this counter makes that degradation visible to callers
/// instead of silent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub unconverted_values: u64,
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub rows: Vec<Row>,
    pub summary: Row,
    pub data_quality: DataQuality,
}

/// Reduce final rows into the summary object: totals for every additive
/// field, then the declared derived ratios.
pub fn summarize(rows: &[Row], spec: &ReportSpec) -> Row {
    let mut summary = Row::new();
    for field in &spec.sum_fields {
        let total: f64 = rows.iter().map(|row| numeric_or_zero(row, field)).sum();
        summary.insert(field.clone(), Value::from(total));
    }
    for ratio in &spec.ratios {
        let numerator = rows
            .iter()
            .map(|row| numeric_or_zero(row, &ratio.numerator))
            .sum::<f64>();
        let denominator = rows
            .iter()
            .map(|row| numeric_or_zero(row, &ratio.denominator))
            .sum::<f64>();
        let value = if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        };
        summary.insert(ratio.name.clone(), Value::from(value));
    }
    summary
}

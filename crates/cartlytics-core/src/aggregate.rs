//! Grouped-row aggregation.
//!
//! When a logical site selection resolves to several physical sites, the
//! warehouse returns one row per (group key, site). Those rows are collapsed
//! into one combined row per group key so a grouped selection reads like a
//! single site. The site identifier is always dropped from aggregated
//! output: once rows originate from heterogeneous sites, a single site id on
//! the combined row would be misleading.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::row::{key_text, numeric, Row};

/// Field roles for one aggregation pass. Supplied as data by each report
/// definition rather than hardcoded per pipeline.
#[derive(Debug, Clone)]
pub struct AggregateSpec<'a> {
    /// Rows sharing the same values for these fields collapse into one row.
    pub group_by: &'a [String],
    /// Additive fields, summed across the group (missing/non-numeric = 0).
    pub sum_fields: &'a [String],
    /// Non-additive fields, maximum observed value wins.
    pub max_fields: &'a [String],
    /// The site identifier field, removed from all output.
    pub site_field: &'a str,
}

const KEY_SEPARATOR: char = '\u{1f}';

fn group_key(row: &Row, group_by: &[String]) -> String {
    let mut key = String::new();
    for (i, field) in group_by.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&key_text(row.get(field)));
    }
    key
}

fn strip_site(mut row: Row, site_field: &str) -> Row {
    row.remove(site_field);
    row
}

/// Collapse rows spanning multiple sites into one row per group key.
///
/// Rows all originating from a single distinct site pass through unchanged
/// apart from site-field removal; this fast path keeps single-site reports
/// identical to their pre-aggregation output. Output group order follows
/// first appearance in the input, though callers must not rely on it.
pub fn aggregate_rows(rows: Vec<Row>, spec: &AggregateSpec<'_>) -> Vec<Row> {
    let distinct_sites: HashSet<String> = rows
        .iter()
        .map(|row| key_text(row.get(spec.site_field)))
        .collect();
    if distinct_sites.len() <= 1 {
        return rows
            .into_iter()
            .map(|row| strip_site(row, spec.site_field))
            .collect();
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();
    for row in rows {
        let key = group_key(&row, spec.group_by);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut out = Vec::with_capacity(order.len());
    for key in order {
        let Some(group) = groups.remove(&key) else {
            continue;
        };
        out.push(collapse_group(group, spec));
    }
    out
}

fn collapse_group(group: Vec<Row>, spec: &AggregateSpec<'_>) -> Row {
    let mut iter = group.into_iter();
    let Some(first) = iter.next() else {
        return Row::new();
    };
    let rest: Vec<Row> = iter.collect();
    if rest.is_empty() {
        return strip_site(first, spec.site_field);
    }

    let mut combined = first.clone();
    let all = std::iter::once(&first).chain(rest.iter());

    for field in spec.sum_fields {
        let sum: f64 = all
            .clone()
            .map(|row| row.get(field).and_then(numeric).unwrap_or(0.0))
            .sum();
        combined.insert(field.clone(), Value::from(sum));
    }
    for field in spec.max_fields {
        let max = all
            .clone()
            .filter_map(|row| row.get(field).and_then(numeric))
            .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |m| m.max(v))));
        if let Some(max) = max {
            combined.insert(field.clone(), Value::from(max));
        }
    }
    strip_site(combined, spec.site_field)
}

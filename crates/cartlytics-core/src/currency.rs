//! Historical currency conversion.
//!
//! Monetary values arrive in each site's native transaction currency and are
//! normalized to the tenant's base reporting currency using month-granularity
//! historical rates. A rate is defined as "1 unit of base currency = `rate`
//! units of source currency", so conversion divides by the rate.
//!
//! Missing data never fails a report: an absent context, an unknown source
//! currency or a missing month rate all degrade to the unconverted value
//! with a warning, and the caller is told how many values degraded.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::row::{self, Row};

/// currency code (uppercase) -> "YYYY-MM" -> rate.
pub type RateTable = HashMap<String, HashMap<String, f64>>;

/// Request-scoped snapshot of everything needed to convert one tenant's
/// rows. Built fresh per report request, never cached or shared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyContext {
    /// Tenant-wide reporting currency, uppercase.
    pub base_currency: String,
    pub rates: RateTable,
    /// Site identifier -> native currency code. Keyed by both the warehouse
    /// identifier and the commerce identifier so either addressing scheme
    /// resolves.
    pub site_currencies: HashMap<String, String>,
}

impl CurrencyContext {
    pub fn site_currency(&self, site_id: &str) -> Option<&str> {
        self.site_currencies.get(site_id).map(String::as_str)
    }

    /// Positive rate for `(currency, month)`, or `None`. Absence at either
    /// level is an expected state, not malformed data.
    pub fn rate_for(&self, currency: &str, month: &str) -> Option<f64> {
        let rate = *self.rates.get(&currency.to_uppercase())?.get(month)?;
        (rate > 0.0).then_some(rate)
    }
}

/// Derive the "YYYY-MM" rate-table key from a date-like string.
///
/// Accepts full dates (optionally with a time suffix) and bare year-month
/// strings. Returns `None` when the input has less than year-month
/// precision.
pub fn month_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date.format("%Y-%m").to_string());
        }
    }
    let prefix = trimmed.get(..7)?;
    if trimmed.len() > 7 && trimmed.as_bytes().get(7) != Some(&b'-') {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{prefix}-01"), "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m").to_string())
}

/// Per-value conversion inputs. All fields are optional; the converter
/// degrades to the unconverted value when it cannot resolve a currency or
/// month from what is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions<'a> {
    pub site_id: Option<&'a str>,
    /// Explicit source currency; takes precedence over the site lookup.
    pub currency_override: Option<&'a str>,
    pub date: Option<&'a str>,
    /// Used when `date` cannot be parsed to year-month precision.
    pub fallback_month: Option<&'a str>,
}

/// Result of a single conversion attempt. `degraded` marks values returned
/// unconverted because of a configuration gap (unknown currency, missing or
/// non-positive rate, unresolvable month).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted {
    pub value: f64,
    pub degraded: bool,
}

impl Converted {
    fn unchanged(value: f64) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    fn degraded(value: f64) -> Self {
        Self {
            value,
            degraded: true,
        }
    }
}

/// Convert one monetary value into the context's base currency.
///
/// With no context the value passes through untouched (the tenant could not
/// be loaded; the report renders unconverted figures rather than failing).
pub fn convert_value(value: f64, ctx: Option<&CurrencyContext>, opts: ConvertOptions) -> Converted {
    let Some(ctx) = ctx else {
        return Converted::unchanged(value);
    };

    let source = opts
        .currency_override
        .or_else(|| opts.site_id.and_then(|id| ctx.site_currency(id)));
    let Some(source) = source else {
        tracing::warn!(
            site_id = opts.site_id.unwrap_or("<none>"),
            "no source currency for monetary value, returning unconverted"
        );
        return Converted::degraded(value);
    };

    let source = source.to_uppercase();
    if source == ctx.base_currency {
        return Converted::unchanged(value);
    }

    let month = opts
        .date
        .and_then(month_key)
        .or_else(|| opts.fallback_month.and_then(month_key));
    let Some(month) = month else {
        tracing::warn!(
            currency = %source,
            date = opts.date.unwrap_or("<none>"),
            "unparseable date and no usable fallback month, returning unconverted"
        );
        return Converted::degraded(value);
    };

    match ctx.rate_for(&source, &month) {
        Some(rate) => Converted::unchanged(value / rate),
        None => {
            tracing::warn!(
                currency = %source,
                month = %month,
                "no exchange rate for month, returning unconverted"
            );
            Converted::degraded(value)
        }
    }
}

/// Declares one monetary field on a row and where that row carries its
/// originating site and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonetaryField {
    pub field: String,
    pub site_field: String,
    pub date_field: String,
}

impl MonetaryField {
    pub fn new(field: &str, site_field: &str, date_field: &str) -> Self {
        Self {
            field: field.to_string(),
            site_field: site_field.to_string(),
            date_field: date_field.to_string(),
        }
    }
}

/// Apply [`convert_value`] to each declared field on a row, producing a new
/// row with only those fields replaced. Non-numeric declared fields are
/// left untouched. Returns the new row and the count of degraded values.
pub fn convert_row_fields(
    row: &Row,
    fields: &[MonetaryField],
    ctx: Option<&CurrencyContext>,
    fallback_month: Option<&str>,
) -> (Row, u64) {
    let mut out = row.clone();
    let mut degraded = 0u64;
    for descriptor in fields {
        let Some(value) = row.get(&descriptor.field).and_then(row::numeric) else {
            continue;
        };
        let opts = ConvertOptions {
            site_id: row::field_str(row, &descriptor.site_field),
            currency_override: None,
            date: row::field_str(row, &descriptor.date_field),
            fallback_month,
        };
        let converted = convert_value(value, ctx, opts);
        if converted.degraded {
            degraded += 1;
        }
        out.insert(
            descriptor.field.clone(),
            serde_json::Value::from(converted.value),
        );
    }
    (out, degraded)
}

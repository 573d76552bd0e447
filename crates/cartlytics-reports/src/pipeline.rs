//! The shared report pipeline.
//!
//! Every report runs the same fixed sequence: resolve the logical site
//! selection, build the warehouse predicate, execute the query, normalize
//! driver date wrappers, convert monetary fields into the tenant base
//! currency, collapse rows spanning grouped sites, and reduce to a summary.

use std::collections::BTreeMap;

use serde_json::Value;

use cartlytics_core::aggregate::{aggregate_rows, AggregateSpec};
use cartlytics_core::config::Config;
use cartlytics_core::currency::convert_row_fields;
use cartlytics_core::error::ReportError;
use cartlytics_core::predicate::build_site_predicate;
use cartlytics_core::row::{normalize_date_fields, Row};
use cartlytics_metadata::{
    load_currency_context, resolve_sites, SiteResolution, SiteSelection, TenantStore,
};

use crate::executor::QueryExecutor;
use crate::report::{summarize, DataQuality, ReportResult, ReportSpec};

/// One inbound report request. Query parameters (date range etc.) are
/// caller-supplied; the pipeline adds `tenant_id` and the site predicate
/// bindings.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub tenant_id: String,
    pub selection: SiteSelection,
    pub params: BTreeMap<String, Value>,
    /// Rate month used when a row's date cannot be parsed; typically the
    /// requested range's end month.
    pub fallback_month: Option<String>,
}

impl ReportRequest {
    pub fn new(tenant_id: &str, selection: SiteSelection) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            selection,
            params: BTreeMap::new(),
            fallback_month: None,
        }
    }

    pub fn with_param(mut self, name: &str, value: Value) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }
}

/// Run one report end to end.
///
/// Error policy: a specific, non-sentinel site whose resolution fails
/// aborts the whole report; silently falling back to "no filter" would
/// return tenant-wide data for a request scoped to one site. Configuration
/// gaps (missing rates, unmapped currencies) degrade per value and are
/// surfaced in [`DataQuality`].
pub async fn run_report(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    spec: &ReportSpec,
    req: &ReportRequest,
) -> Result<ReportResult, ReportError> {
    // The two metadata reads are independent; issue them concurrently.
    let (resolution, ctx) = tokio::join!(
        resolve_sites(store, &req.tenant_id, &req.selection),
        load_currency_context(store, &req.tenant_id, &config.default_currency),
    );
    let resolution = resolution.map_err(ReportError::Store)?;
    let ctx = ctx.map_err(ReportError::Store)?;

    let ids = match &resolution {
        SiteResolution::NotFound => {
            return Err(ReportError::SiteNotFound(
                req.selection.site_id().unwrap_or("").to_string(),
            ));
        }
        SiteResolution::NoFilter => None,
        SiteResolution::Resolved(ids) if ids.is_empty() => {
            // Valid group, nothing resolvable yet: an empty report, never
            // an unfiltered one.
            tracing::debug!(report = spec.name, tenant_id = %req.tenant_id, "selection resolved to zero sites");
            return Ok(ReportResult {
                rows: Vec::new(),
                summary: summarize(&[], spec),
                data_quality: DataQuality::default(),
            });
        }
        SiteResolution::Resolved(ids) => Some(ids.as_slice()),
    };

    let predicate = build_site_predicate(&spec.site_field, ids);
    let query = spec.query.replace("{site_filter}", &predicate.and_fragment());

    let mut params = req.params.clone();
    params.insert("tenant_id".to_string(), Value::from(req.tenant_id.as_str()));
    params.extend(predicate.params);

    let mut rows = warehouse
        .execute(&query, &params)
        .await
        .map_err(ReportError::Warehouse)?;
    if rows.len() > config.max_report_rows {
        tracing::warn!(
            report = spec.name,
            returned = rows.len(),
            cap = config.max_report_rows,
            "warehouse returned more rows than the configured cap, truncating"
        );
        rows.truncate(config.max_report_rows);
    }

    let rows = normalize_date_fields(rows, &spec.date_fields());

    let mut unconverted_values = 0u64;
    let rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let (converted, degraded) = convert_row_fields(
                row,
                &spec.monetary_fields,
                ctx.as_ref(),
                req.fallback_month.as_deref(),
            );
            unconverted_values += degraded;
            converted
        })
        .collect();

    let rows = aggregate_rows(
        rows,
        &AggregateSpec {
            group_by: &spec.group_by,
            sum_fields: &spec.sum_fields,
            max_fields: &spec.max_fields,
            site_field: &spec.site_field,
        },
    );

    let summary = summarize(&rows, spec);
    tracing::debug!(
        report = spec.name,
        tenant_id = %req.tenant_id,
        rows = rows.len(),
        unconverted_values,
        "report pipeline complete"
    );
    Ok(ReportResult {
        rows,
        summary,
        data_quality: DataQuality { unconverted_values },
    })
}

//! Daily on-site behavior report.

use serde::Serialize;

use cartlytics_core::config::Config;
use cartlytics_core::error::ReportError;
use cartlytics_core::row::{numeric_or_zero, Row};
use cartlytics_metadata::TenantStore;

use crate::executor::QueryExecutor;
use crate::pipeline::{run_report, ReportRequest};
use crate::report::{DataQuality, RatioField, ReportSpec};

const QUERY: &str = "\
SELECT
    b.date AS date,
    b.store_id AS store_id,
    SUM(b.sessions) AS sessions,
    SUM(b.pageviews) AS pageviews,
    SUM(b.conversions) AS conversions,
    MAX(b.bounce_rate) AS bounce_rate
FROM site_behavior b
WHERE b.tenant_id = @tenant_id
  AND b.date BETWEEN @start_date AND @end_date{site_filter}
GROUP BY date, store_id
ORDER BY date";

pub fn spec() -> ReportSpec {
    ReportSpec {
        name: "behavior",
        query: QUERY.to_string(),
        site_field: "store_id".to_string(),
        date_field: "date".to_string(),
        group_by: vec!["date".to_string()],
        sum_fields: vec![
            "sessions".to_string(),
            "pageviews".to_string(),
            "conversions".to_string(),
        ],
        max_fields: vec!["bounce_rate".to_string()],
        monetary_fields: Vec::new(),
        ratios: vec![
            RatioField::new("conversion_rate", "conversions", "sessions"),
            RatioField::new("pages_per_session", "pageviews", "sessions"),
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorSummary {
    pub sessions: f64,
    pub pageviews: f64,
    pub conversions: f64,
    pub conversion_rate: f64,
    pub pages_per_session: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorReport {
    pub rows: Vec<Row>,
    pub summary: BehaviorSummary,
    pub data_quality: DataQuality,
}

pub async fn run(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<BehaviorReport, ReportError> {
    let result = run_report(store, warehouse, config, &spec(), req).await?;
    Ok(BehaviorReport {
        summary: BehaviorSummary {
            sessions: numeric_or_zero(&result.summary, "sessions"),
            pageviews: numeric_or_zero(&result.summary, "pageviews"),
            conversions: numeric_or_zero(&result.summary, "conversions"),
            conversion_rate: numeric_or_zero(&result.summary, "conversion_rate"),
            pages_per_session: numeric_or_zero(&result.summary, "pages_per_session"),
        },
        rows: result.rows,
        data_quality: result.data_quality,
    })
}

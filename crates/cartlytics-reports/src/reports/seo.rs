//! Daily organic search report. No monetary fields; clicks and impressions
//! are additive across grouped sites while position keeps the worst (max)
//! observed value.

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
    s.date AS date,
    s.store_id AS store_id,
    SUM(s.clicks) AS clicks,
    SUM(s.impressions) AS impressions,
    MAX(s.position) AS position
FROM search_performance s
WHERE s.tenant_id = @tenant_id
  AND s.date BETWEEN @start_date AND @end_date{site_filter}
GROUP BY date, store_id
ORDER BY date";

pub fn spec() -> ReportSpec {
    ReportSpec {
        name: "seo",
        query: QUERY.to_string(),
        site_field: "store_id".to_string(),
        date_field: "date".to_string(),
        group_by: vec!["date".to_string()],
        sum_fields: vec!["clicks".to_string(), "impressions".to_string()],
        max_fields: vec!["position".to_string()],
        monetary_fields: Vec::new(),
        ratios: vec![RatioField::new("click_through_rate", "clicks", "impressions")],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoSummary {
    pub clicks: f64,
    pub impressions: f64,
    pub click_through_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub rows: Vec<Row>,
    pub summary: SeoSummary,
    pub data_quality: DataQuality,
}

pub async fn run(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<SeoReport, ReportError> {
    let result = run_report(store, warehouse, config, &spec(), req).await?;
    Ok(SeoReport {
        summary: SeoSummary {
            clicks: numeric_or_zero(&result.summary, "clicks"),
            impressions: numeric_or_zero(&result.summary, "impressions"),
            click_through_rate: numeric_or_zero(&result.summary, "click_through_rate"),
        },
        rows: result.rows,
        data_quality: result.data_quality,
    })
}

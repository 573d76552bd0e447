//! Per-product sales report, grouped by date and product so a grouped site
//! selection combines the same product sold across stores.

use serde::Serialize;

use cartlytics_core::config::Config;
use cartlytics_core::currency::MonetaryField;
use cartlytics_core::error::ReportError;
use cartlytics_core::row::{numeric_or_zero, Row};
use cartlytics_metadata::TenantStore;

use crate::executor::QueryExecutor;
use crate::pipeline::{run_report, ReportRequest};
use crate::report::{DataQuality, RatioField, ReportSpec};

const QUERY: &str = "\
SELECT
    i.order_date AS date,
    i.store_id AS store_id,
    i.product_id AS product_id,
    ANY_VALUE(i.product_name) AS product_name,
    SUM(i.quantity) AS units,
    SUM(i.line_total) AS revenue
FROM order_items i
WHERE i.tenant_id = @tenant_id
  AND i.order_date BETWEEN @start_date AND @end_date{site_filter}
GROUP BY date, store_id, product_id
ORDER BY date";

pub fn spec() -> ReportSpec {
    ReportSpec {
        name: "products",
        query: QUERY.to_string(),
        site_field: "store_id".to_string(),
        date_field: "date".to_string(),
        group_by: vec!["date".to_string(), "product_id".to_string()],
        sum_fields: vec!["units".to_string(), "revenue".to_string()],
        max_fields: Vec::new(),
        monetary_fields: vec![MonetaryField::new("revenue", "store_id", "date")],
        ratios: vec![RatioField::new("revenue_per_unit", "revenue", "units")],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductsSummary {
    pub units: f64,
    pub revenue: f64,
    pub revenue_per_unit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductsReport {
    pub rows: Vec<Row>,
    pub summary: ProductsSummary,
    pub data_quality: DataQuality,
}

pub async fn run(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<ProductsReport, ReportError> {
    let result = run_report(store, warehouse, config, &spec(), req).await?;
    Ok(ProductsReport {
        summary: ProductsSummary {
            units: numeric_or_zero(&result.summary, "units"),
            revenue: numeric_or_zero(&result.summary, "revenue"),
            revenue_per_unit: numeric_or_zero(&result.summary, "revenue_per_unit"),
        },
        rows: result.rows,
        data_quality: result.data_quality,
    })
}

//! Daily sales report.
//!
//! One row per (date, store) from the warehouse, collapsed to one row per
//! date after conversion when the selection spans grouped sites.

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
    o.order_date AS date,
    o.store_id AS store_id,
    SUM(o.total) AS revenue,
    SUM(o.tax) AS tax,
    COUNT(*) AS orders,
    SUM(o.item_count) AS units
FROM orders o
WHERE o.tenant_id = @tenant_id
  AND o.order_date BETWEEN @start_date AND @end_date{site_filter}
GROUP BY date, store_id
ORDER BY date";

pub fn spec() -> ReportSpec {
    ReportSpec {
        name: "sales",
        query: QUERY.to_string(),
        site_field: "store_id".to_string(),
        date_field: "date".to_string(),
        group_by: vec!["date".to_string()],
        sum_fields: vec![
            "revenue".to_string(),
            "tax".to_string(),
            "orders".to_string(),
            "units".to_string(),
        ],
        max_fields: Vec::new(),
        monetary_fields: vec![
            MonetaryField::new("revenue", "store_id", "date"),
            MonetaryField::new("tax", "store_id", "date"),
        ],
        ratios: vec![
            RatioField::new("average_order_value", "revenue", "orders"),
            RatioField::new("units_per_order", "units", "orders"),
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub revenue: f64,
    pub tax: f64,
    pub orders: f64,
    pub units: f64,
    pub average_order_value: f64,
    pub units_per_order: f64,
}

impl SalesSummary {
    fn from_row(row: &Row) -> Self {
        Self {
            revenue: numeric_or_zero(row, "revenue"),
            tax: numeric_or_zero(row, "tax"),
            orders: numeric_or_zero(row, "orders"),
            units: numeric_or_zero(row, "units"),
            average_order_value: numeric_or_zero(row, "average_order_value"),
            units_per_order: numeric_or_zero(row, "units_per_order"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub rows: Vec<Row>,
    pub summary: SalesSummary,
    pub data_quality: DataQuality,
}

pub async fn run(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<SalesReport, ReportError> {
    let result = run_report(store, warehouse, config, &spec(), req).await?;
    Ok(SalesReport {
        summary: SalesSummary::from_row(&result.summary),
        rows: result.rows,
        data_quality: result.data_quality,
    })
}

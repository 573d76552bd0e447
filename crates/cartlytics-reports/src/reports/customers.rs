//! Daily customer acquisition report.

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
    c.first_order_date AS date,
    c.store_id AS store_id,
    COUNT(*) AS customers,
    COUNT(CASE WHEN c.order_count > 1 THEN 1 END) AS returning_customers,
    SUM(c.lifetime_value) AS revenue
FROM customers c
WHERE c.tenant_id = @tenant_id
  AND c.first_order_date BETWEEN @start_date AND @end_date{site_filter}
GROUP BY date, store_id
ORDER BY date";

pub fn spec() -> ReportSpec {
    ReportSpec {
        name: "customers",
        query: QUERY.to_string(),
        site_field: "store_id".to_string(),
        date_field: "date".to_string(),
        group_by: vec!["date".to_string()],
        sum_fields: vec![
            "customers".to_string(),
            "returning_customers".to_string(),
            "revenue".to_string(),
        ],
        max_fields: Vec::new(),
        monetary_fields: vec![MonetaryField::new("revenue", "store_id", "date")],
        ratios: vec![
            RatioField::new("repeat_rate", "returning_customers", "customers"),
            RatioField::new("revenue_per_customer", "revenue", "customers"),
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomersSummary {
    pub customers: f64,
    pub returning_customers: f64,
    pub revenue: f64,
    pub repeat_rate: f64,
    pub revenue_per_customer: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomersReport {
    pub rows: Vec<Row>,
    pub summary: CustomersSummary,
    pub data_quality: DataQuality,
}

pub async fn run(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<CustomersReport, ReportError> {
    let result = run_report(store, warehouse, config, &spec(), req).await?;
    Ok(CustomersReport {
        summary: CustomersSummary {
            customers: numeric_or_zero(&result.summary, "customers"),
            returning_customers: numeric_or_zero(&result.summary, "returning_customers"),
            revenue: numeric_or_zero(&result.summary, "revenue"),
            repeat_rate: numeric_or_zero(&result.summary, "repeat_rate"),
            revenue_per_customer: numeric_or_zero(&result.summary, "revenue_per_customer"),
        },
        rows: result.rows,
        data_quality: result.data_quality,
    })
}

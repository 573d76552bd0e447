//! AI-assistant context assembly.
//!
//! The assistant answers questions over the same normalized data the
//! dashboard renders. Its context is several report sections for one
//! tenant/selection/date-range; the sections have no ordering dependency on
//! each other, so they are fetched concurrently and joined.

use serde::Serialize;

use cartlytics_core::config::Config;
use cartlytics_core::error::ReportError;
use cartlytics_metadata::TenantStore;

use crate::executor::QueryExecutor;
use crate::pipeline::ReportRequest;
use crate::reports::{customers, products, sales};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardContext {
    pub sales: sales::SalesReport,
    pub products: products::ProductsReport,
    pub customers: customers::CustomersReport,
}

/// Fetch the assistant's data sections concurrently. Any section's fatal
/// error fails the whole build; partial contexts would let the assistant
/// answer from incomplete data without saying so.
pub async fn build_dashboard_context(
    store: &dyn TenantStore,
    warehouse: &dyn QueryExecutor,
    config: &Config,
    req: &ReportRequest,
) -> Result<DashboardContext, ReportError> {
    let (sales, products, customers) = tokio::try_join!(
        sales::run(store, warehouse, config, req),
        products::run(store, warehouse, config, req),
        customers::run(store, warehouse, config, req),
    )?;
    Ok(DashboardContext {
        sales,
        products,
        customers,
    })
}

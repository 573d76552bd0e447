use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cartlytics_core::currency::RateTable;

pub mod context;
pub mod resolver;

pub use context::load_currency_context;
pub use resolver::{resolve_sites, SiteResolution, SiteSelection};

/// A customer of the platform. Mutated only through tenant configuration;
/// never deleted while sites reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    /// Reporting currency all monetary figures normalize to. `None` falls
    /// back to the deployment default at context-load time.
    pub base_currency: Option<String>,
    /// currency code -> "YYYY-MM" -> rate, where 1 base unit = rate source
    /// units. Absence at any level is expected, not malformed data.
    #[serde(default)]
    pub monthly_rates: RateTable,
}

/// A physical storefront, or a virtual grouping of several.
///
/// A grouping site has no warehouse identifier of its own and is never a
/// member of another group; the resolver does not recurse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Key used to filter rows in the analytics warehouse. Always present
    /// on a configured non-grouping site.
    pub warehouse_id: Option<String>,
    /// Identifier on the upstream commerce API, when connected.
    pub commerce_id: Option<String>,
    /// Native transaction currency.
    pub currency: Option<String>,
    #[serde(default)]
    pub is_grouping: bool,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

/// Read-only view of the tenant metadata store.
///
/// The production implementation reads the platform's document store; tests
/// use an in-memory implementation. `Ok(None)` means the document does not
/// exist; `Err` means the read itself failed and is fatal for the enclosing
/// report request.
#[async_trait]
pub trait TenantStore: Send + Sync + 'static {
    async fn get_tenant(&self, tenant_id: &str) -> anyhow::Result<Option<Tenant>>;
    async fn list_sites(&self, tenant_id: &str) -> anyhow::Result<Vec<Site>>;
    async fn get_site(&self, tenant_id: &str, site_id: &str) -> anyhow::Result<Option<Site>>;
}

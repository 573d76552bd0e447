//! Tenant currency context loading.

use std::collections::HashMap;

use cartlytics_core::currency::{CurrencyContext, RateTable};

use crate::TenantStore;

/// Build a request-scoped [`CurrencyContext`] for one tenant.
///
/// Returns `Ok(None)` when the tenant document does not exist; callers skip
/// conversion and return values unconverted rather than failing the report.
/// A store read error is propagated and fatal.
///
/// The site-to-currency map is keyed by both the warehouse identifier and,
/// when present, the commerce identifier, so rows addressed under either
/// scheme resolve to the same currency.
pub async fn load_currency_context(
    store: &dyn TenantStore,
    tenant_id: &str,
    default_currency: &str,
) -> anyhow::Result<Option<CurrencyContext>> {
    let Some(tenant) = store.get_tenant(tenant_id).await? else {
        tracing::warn!(%tenant_id, "tenant not found, reports will render unconverted");
        return Ok(None);
    };

    let base_currency = tenant
        .base_currency
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(default_currency)
        .to_uppercase();

    let mut rates = RateTable::new();
    for (currency, months) in tenant.monthly_rates {
        rates.insert(currency.to_uppercase(), months);
    }

    let mut site_currencies = HashMap::new();
    for site in store.list_sites(tenant_id).await? {
        let Some(currency) = site.currency.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let currency = currency.to_uppercase();
        if let Some(warehouse_id) = &site.warehouse_id {
            site_currencies.insert(warehouse_id.clone(), currency.clone());
        }
        if let Some(commerce_id) = &site.commerce_id {
            site_currencies.insert(commerce_id.clone(), currency.clone());
        }
    }

    Ok(Some(CurrencyContext {
        base_currency,
        rates,
        site_currencies,
    }))
}

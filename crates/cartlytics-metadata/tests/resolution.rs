use std::collections::HashMap;

use async_trait::async_trait;
use cartlytics_metadata::{
    load_currency_context, resolve_sites, Site, SiteResolution, SiteSelection, Tenant, TenantStore,
};

#[derive(Default)]
struct MemoryStore {
    tenants: HashMap<String, Tenant>,
    sites: HashMap<String, Site>,
}

impl MemoryStore {
    fn with_tenant(mut self, tenant: Tenant) -> Self {
        self.tenants.insert(tenant.id.clone(), tenant);
        self
    }

    fn with_site(mut self, site: Site) -> Self {
        self.sites.insert(site.id.clone(), site);
        self
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn get_tenant(&self, tenant_id: &str) -> anyhow::Result<Option<Tenant>> {
        Ok(self.tenants.get(tenant_id).cloned())
    }

    async fn list_sites(&self, tenant_id: &str) -> anyhow::Result<Vec<Site>> {
        let mut sites: Vec<Site> = self
            .sites
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect();
        sites.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sites)
    }

    async fn get_site(&self, tenant_id: &str, site_id: &str) -> anyhow::Result<Option<Site>> {
        Ok(self
            .sites
            .get(site_id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }
}

fn site(id: &str, warehouse_id: Option<&str>, currency: Option<&str>) -> Site {
    Site {
        id: id.to_string(),
        tenant_id: "t1".to_string(),
        name: id.to_string(),
        warehouse_id: warehouse_id.map(str::to_string),
        commerce_id: None,
        currency: currency.map(str::to_string),
        is_grouping: false,
        member_ids: Vec::new(),
    }
}

fn group(id: &str, members: &[&str]) -> Site {
    Site {
        id: id.to_string(),
        tenant_id: "t1".to_string(),
        name: id.to_string(),
        warehouse_id: None,
        commerce_id: None,
        currency: None,
        is_grouping: true,
        member_ids: members.iter().map(|m| m.to_string()).collect(),
    }
}

fn tenant(base_currency: Option<&str>) -> Tenant {
    Tenant {
        id: "t1".to_string(),
        base_currency: base_currency.map(str::to_string),
        monthly_rates: HashMap::from([(
            "eur".to_string(),
            HashMap::from([("2024-05".to_string(), 1.17)]),
        )]),
    }
}

#[tokio::test]
async fn sentinel_selection_resolves_to_no_filter() {
    let store = MemoryStore::default();
    let resolution = resolve_sites(&store, "t1", &SiteSelection::AllSites)
        .await
        .expect("resolve");
    assert_eq!(resolution, SiteResolution::NoFilter);
}

#[tokio::test]
async fn physical_site_resolves_to_its_warehouse_id() {
    let store = MemoryStore::default().with_site(site("s-a", Some("wh-a"), Some("EUR")));
    let selection = SiteSelection::parse(Some("s-a"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(
        resolution,
        SiteResolution::Resolved(vec!["wh-a".to_string()])
    );
}

#[tokio::test]
async fn missing_site_is_not_found_not_no_filter() {
    let store = MemoryStore::default();
    let selection = SiteSelection::parse(Some("nope"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(resolution, SiteResolution::NotFound);
}

#[tokio::test]
async fn physical_site_without_warehouse_id_is_not_found() {
    let store = MemoryStore::default().with_site(site("s-a", None, Some("EUR")));
    let selection = SiteSelection::parse(Some("s-a"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(resolution, SiteResolution::NotFound);
}

#[tokio::test]
async fn group_collects_member_warehouse_ids_in_order() {
    let store = MemoryStore::default()
        .with_site(site("s-a", Some("wh-a"), Some("EUR")))
        .with_site(site("s-b", Some("wh-b"), Some("SEK")))
        .with_site(group("g", &["s-b", "s-a"]));
    let selection = SiteSelection::parse(Some("g"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(
        resolution,
        SiteResolution::Resolved(vec!["wh-b".to_string(), "wh-a".to_string()])
    );
}

#[tokio::test]
async fn group_skips_unresolvable_members() {
    let store = MemoryStore::default()
        .with_site(site("s-a", Some("wh-a"), Some("EUR")))
        .with_site(site("s-b", None, Some("SEK")))
        .with_site(group("g", &["s-a", "s-b", "s-missing"]));
    let selection = SiteSelection::parse(Some("g"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(
        resolution,
        SiteResolution::Resolved(vec!["wh-a".to_string()])
    );
}

#[tokio::test]
async fn group_with_no_resolvable_members_is_empty_not_missing() {
    let store = MemoryStore::default()
        .with_site(site("s-b", None, Some("SEK")))
        .with_site(group("g", &["s-b"]));
    let selection = SiteSelection::parse(Some("g"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(resolution, SiteResolution::Resolved(Vec::new()));
}

#[tokio::test]
async fn group_deduplicates_shared_warehouse_ids() {
    let store = MemoryStore::default()
        .with_site(site("s-a", Some("wh-a"), Some("EUR")))
        .with_site(site("s-a2", Some("wh-a"), Some("EUR")))
        .with_site(group("g", &["s-a", "s-a2"]));
    let selection = SiteSelection::parse(Some("g"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(
        resolution,
        SiteResolution::Resolved(vec!["wh-a".to_string()])
    );
}

#[tokio::test]
async fn nested_groups_are_skipped_not_recursed() {
    let store = MemoryStore::default()
        .with_site(site("s-a", Some("wh-a"), Some("EUR")))
        .with_site(group("inner", &["s-a"]))
        .with_site(group("outer", &["inner", "s-a"]));
    let selection = SiteSelection::parse(Some("outer"));
    let resolution = resolve_sites(&store, "t1", &selection).await.expect("resolve");
    assert_eq!(
        resolution,
        SiteResolution::Resolved(vec!["wh-a".to_string()])
    );
}

#[tokio::test]
async fn context_loader_returns_none_for_missing_tenant() {
    let store = MemoryStore::default();
    let ctx = load_currency_context(&store, "t1", "USD")
        .await
        .expect("load");
    assert!(ctx.is_none());
}

#[tokio::test]
async fn context_loader_applies_default_base_currency() {
    let store = MemoryStore::default().with_tenant(tenant(None));
    let ctx = load_currency_context(&store, "t1", "usd")
        .await
        .expect("load")
        .expect("context");
    assert_eq!(ctx.base_currency, "USD");
}

#[tokio::test]
async fn context_loader_uppercases_rate_table_keys() {
    let store = MemoryStore::default().with_tenant(tenant(Some("GBP")));
    let ctx = load_currency_context(&store, "t1", "USD")
        .await
        .expect("load")
        .expect("context");
    assert_eq!(ctx.rate_for("EUR", "2024-05"), Some(1.17));
    assert_eq!(ctx.rate_for("eur", "2024-05"), Some(1.17));
}

#[tokio::test]
async fn context_maps_both_warehouse_and_commerce_ids() {
    let mut shop = site("s-a", Some("wh-a"), Some("eur"));
    shop.commerce_id = Some("shop-a".to_string());
    let store = MemoryStore::default()
        .with_tenant(tenant(Some("GBP")))
        .with_site(shop)
        .with_site(site("s-b", Some("wh-b"), None));
    let ctx = load_currency_context(&store, "t1", "USD")
        .await
        .expect("load")
        .expect("context");
    assert_eq!(ctx.site_currency("wh-a"), Some("EUR"));
    assert_eq!(ctx.site_currency("shop-a"), Some("EUR"));
    // A site without a configured currency simply stays unmapped.
    assert_eq!(ctx.site_currency("wh-b"), None);
}

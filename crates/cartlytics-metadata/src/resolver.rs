//! Logical site selection resolution.
//!
//! A user-facing "site" selection is either the sentinel meaning "combine
//! all sites for this tenant" or a tenant-scoped site id, which may name a
//! grouping site standing for several physical sites. Resolution turns that
//! selection into the concrete warehouse identifiers to filter on.

use std::collections::HashSet;

use crate::TenantStore;

/// Sentinel selection value meaning "combine all sites".
pub const ALL_SITES: &str = "all";

/// Parsed logical site selection. Parsing happens once at the request edge
/// so the sentinel never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSelection {
    /// Combine all of the tenant's sites; no warehouse filter.
    AllSites,
    /// A specific site (physical or grouping), by document id.
    Site(String),
}

impl SiteSelection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some(ALL_SITES) => Self::AllSites,
            Some(id) => Self::Site(id.to_string()),
        }
    }

    pub fn site_id(&self) -> Option<&str> {
        match self {
            Self::AllSites => None,
            Self::Site(id) => Some(id),
        }
    }
}

/// Three-way resolution outcome.
///
/// `NoFilter` and `NotFound` are deliberately distinct variants: collapsing
/// them into one absent value is how a failed resolution silently turns
/// into an unfiltered, tenant-wide query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteResolution {
    /// The sentinel was selected; query without a site filter.
    NoFilter,
    /// A specific site was selected but does not exist or has no warehouse
    /// identifier. Fatal for the enclosing report.
    NotFound,
    /// Ordered, deduplicated warehouse identifiers. May be empty for a
    /// group none of whose members are resolvable yet.
    Resolved(Vec<String>),
}

impl SiteResolution {
    /// The identifier list to filter on, or `None` for no filter.
    ///
    /// Callers must handle `NotFound` before using this accessor.
    pub fn ids(&self) -> Option<&[String]> {
        match self {
            Self::NoFilter | Self::NotFound => None,
            Self::Resolved(ids) => Some(ids),
        }
    }
}

/// Resolve a selection into warehouse identifiers.
///
/// Group members that are missing, lack a warehouse identifier, or are
/// themselves groups are skipped with a warning rather than failing the
/// whole resolution.
pub async fn resolve_sites(
    store: &dyn TenantStore,
    tenant_id: &str,
    selection: &SiteSelection,
) -> anyhow::Result<SiteResolution> {
    let site_id = match selection {
        SiteSelection::AllSites => return Ok(SiteResolution::NoFilter),
        SiteSelection::Site(id) => id,
    };

    let Some(site) = store.get_site(tenant_id, site_id).await? else {
        return Ok(SiteResolution::NotFound);
    };

    if !site.is_grouping {
        return Ok(match site.warehouse_id {
            Some(id) => SiteResolution::Resolved(vec![id]),
            None => SiteResolution::NotFound,
        });
    }

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(site.member_ids.len());
    for member_id in &site.member_ids {
        let Some(member) = store.get_site(tenant_id, member_id).await? else {
            tracing::warn!(%tenant_id, group = %site.id, member = %member_id, "group member missing, skipping");
            continue;
        };
        if member.is_grouping {
            tracing::warn!(%tenant_id, group = %site.id, member = %member_id, "nested group member not supported, skipping");
            continue;
        }
        let Some(warehouse_id) = member.warehouse_id else {
            tracing::warn!(%tenant_id, group = %site.id, member = %member_id, "group member has no warehouse id, skipping");
            continue;
        };
        if seen.insert(warehouse_id.clone()) {
            ids.push(warehouse_id);
        }
    }
    Ok(SiteResolution::Resolved(ids))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_sentinel_absent_and_blank_to_all() {
        assert_eq!(SiteSelection::parse(None), SiteSelection::AllSites);
        assert_eq!(SiteSelection::parse(Some("")), SiteSelection::AllSites);
        assert_eq!(SiteSelection::parse(Some("  ")), SiteSelection::AllSites);
        assert_eq!(SiteSelection::parse(Some("all")), SiteSelection::AllSites);
    }

    #[test]
    fn parse_keeps_site_ids() {
        assert_eq!(
            SiteSelection::parse(Some("site-1")),
            SiteSelection::Site("site-1".to_string())
        );
        assert_eq!(
            SiteSelection::parse(Some(" site-1 ")),
            SiteSelection::Site("site-1".to_string())
        );
    }

    #[test]
    fn ids_accessor_distinguishes_variants() {
        assert_eq!(SiteResolution::NoFilter.ids(), None);
        assert_eq!(SiteResolution::NotFound.ids(), None);
        let resolved = SiteResolution::Resolved(vec!["wh-a".to_string()]);
        assert_eq!(resolved.ids().map(<[String]>::len), Some(1));
    }
}

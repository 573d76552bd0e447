use thiserror::Error;

/// Failures that abort a whole report request.
///
/// Configuration gaps (missing currency, missing rate, unresolvable group
/// member) are deliberately not represented here: they degrade locally with
/// a logged warning and a data-quality counter instead of failing the
/// report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A specific, non-sentinel site was requested but could not be
    /// resolved. Never silently treated as "no filter": that would return
    /// tenant-wide data for a request scoped to one site.
    #[error("site not found or misconfigured: {0}")]
    SiteNotFound(String),

    #[error("metadata store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("warehouse query failed: {0}")]
    Warehouse(#[source] anyhow::Error),
}

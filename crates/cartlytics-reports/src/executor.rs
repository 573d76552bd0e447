use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use cartlytics_core::row::Row;

/// The analytics warehouse boundary.
///
/// Accepts a query template plus a named-parameter map and returns
/// loosely-typed rows. Implementations own connection pooling and dialect;
/// this layer only guarantees that every identifier it binds arrives as a
/// distinctly-named parameter, never interpolated into the template.
///
/// Date columns may arrive as driver value-objects (`{"value": "..."}`);
/// the pipeline unwraps them before any date-keyed logic runs.
#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    async fn execute(
        &self,
        query: &str,
        params: &BTreeMap<String, Value>,
    ) -> anyhow::Result<Vec<Row>>;
}

//! Warehouse filter predicate construction.
//!
//! Turns a resolved site identifier set into a parameterized equality or
//! membership clause. Deterministic and side-effect-free so it is unit
//! testable without a warehouse.

use std::collections::BTreeMap;

use serde_json::Value;

/// A predicate fragment plus its bound named parameters.
///
/// The clause is bare (no leading `AND`); use [`SitePredicate::and_fragment`]
/// when appending to an existing `WHERE` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitePredicate {
    pub clause: String,
    pub params: BTreeMap<String, Value>,
}

impl SitePredicate {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// `" AND <clause>"`, or the empty string when there is no filter.
    pub fn and_fragment(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!(" AND {}", self.clause)
        }
    }
}

fn param_base(field: &str) -> String {
    field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Build the site filter for a resolved identifier set.
///
/// - `None` (no filter requested) yields an empty clause and no parameters.
/// - A single identifier yields an equality clause with one parameter.
/// - Multiple identifiers yield an `IN` clause with one distinctly-named
///   parameter per identifier.
/// - An empty set yields a contradiction clause so a resolved-but-empty
///   group can never fall through to an unfiltered query.
pub fn build_site_predicate(field: &str, ids: Option<&[String]>) -> SitePredicate {
    let Some(ids) = ids else {
        return SitePredicate::default();
    };
    let base = param_base(field);
    match ids {
        [] => SitePredicate {
            clause: "1 = 0".to_string(),
            params: BTreeMap::new(),
        },
        [only] => {
            let mut params = BTreeMap::new();
            params.insert(base.clone(), Value::from(only.as_str()));
            SitePredicate {
                clause: format!("{field} = @{base}"),
                params,
            }
        }
        many => {
            let mut params = BTreeMap::new();
            let mut names = Vec::with_capacity(many.len());
            for (i, id) in many.iter().enumerate() {
                let name = format!("{base}_{i}");
                names.push(format!("@{name}"));
                params.insert(name, Value::from(id.as_str()));
            }
            SitePredicate {
                clause: format!("{field} IN ({})", names.join(", ")),
                params,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_filter_yields_empty_clause_and_params() {
        let p = build_site_predicate("store_id", None);
        assert!(p.is_empty());
        assert_eq!(p.and_fragment(), "");
        assert!(p.params.is_empty());
    }

    #[test]
    fn single_id_yields_equality() {
        let set = ids(&["wh-a"]);
        let p = build_site_predicate("store_id", Some(&set));
        assert_eq!(p.clause, "store_id = @store_id");
        assert_eq!(p.and_fragment(), " AND store_id = @store_id");
        assert_eq!(p.params.len(), 1);
        assert_eq!(p.params.get("store_id"), Some(&json!("wh-a")));
    }

    #[test]
    fn many_ids_yield_membership_with_distinct_params() {
        let set = ids(&["wh-a", "wh-b", "wh-c"]);
        let p = build_site_predicate("store_id", Some(&set));
        assert_eq!(
            p.clause,
            "store_id IN (@store_id_0, @store_id_1, @store_id_2)"
        );
        assert_eq!(p.params.len(), 3);
        assert_eq!(p.params.get("store_id_1"), Some(&json!("wh-b")));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = ids(&[]);
        let p = build_site_predicate("store_id", Some(&set));
        assert_eq!(p.clause, "1 = 0");
        assert!(p.params.is_empty());
    }

    #[test]
    fn qualified_field_names_produce_clean_param_names() {
        let set = ids(&["wh-a", "wh-b"]);
        let p = build_site_predicate("o.store_id", Some(&set));
        assert_eq!(p.clause, "o.store_id IN (@o_store_id_0, @o_store_id_1)");
        assert!(p.params.contains_key("o_store_id_0"));
    }
}

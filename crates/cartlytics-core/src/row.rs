//! Loosely-typed analytic rows.
//!
//! Warehouse queries return rows as JSON objects whose field set varies per
//! report. Every pipeline stage consumes rows by value and produces new
//! rows; nothing mutates a row in place.

use serde_json::Value;

/// One analytic query result row: field name -> value.
pub type Row = serde_json::Map<String, Value>;

/// Numeric view of a row value. Warehouse drivers return numbers either as
/// JSON numbers or as decimal strings depending on column type.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numeric view of a named field, treating missing or non-numeric as zero.
pub fn numeric_or_zero(row: &Row, field: &str) -> f64 {
    row.get(field).and_then(numeric).unwrap_or(0.0)
}

/// Stable string key for a row value, used when partitioning rows into
/// groups. Missing values and nulls key as the empty string.
pub fn key_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// String view of a named field, if present and textual.
pub fn field_str<'a>(row: &'a Row, field: &str) -> Option<&'a str> {
    row.get(field).and_then(Value::as_str)
}

/// Unwrap a warehouse-native date value-object.
///
/// Some warehouse drivers wrap DATE columns as `{"value": "2024-05-14"}`
/// instead of returning the plain string. Date-keyed logic downstream
/// (month-key derivation, group-by date) expects the plain form.
pub fn unwrap_date_value(value: Value) -> Value {
    match value {
        Value::Object(ref obj) if obj.len() == 1 => match obj.get("value") {
            Some(inner) => inner.clone(),
            None => value,
        },
        other => other,
    }
}

/// Normalize the named date fields on every row, replacing wrapped
/// value-objects with their inner primitive.
pub fn normalize_date_fields(rows: Vec<Row>, fields: &[&str]) -> Vec<Row> {
    rows.into_iter()
        .map(|mut row| {
            for field in fields {
                if let Some(value) = row.remove(*field) {
                    row.insert((*field).to_string(), unwrap_date_value(value));
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn numeric_accepts_numbers_and_decimal_strings() {
        assert_eq!(numeric(&json!(12.5)), Some(12.5));
        assert_eq!(numeric(&json!("12.5")), Some(12.5));
        assert_eq!(numeric(&json!(" 7 ")), Some(7.0));
        assert_eq!(numeric(&json!("n/a")), None);
        assert_eq!(numeric(&json!(null)), None);
    }

    #[test]
    fn numeric_or_zero_defaults_missing_fields() {
        let r = row(json!({"revenue": "19.99"}));
        assert_eq!(numeric_or_zero(&r, "revenue"), 19.99);
        assert_eq!(numeric_or_zero(&r, "orders"), 0.0);
    }

    #[test]
    fn unwrap_date_value_handles_wrapped_and_plain() {
        assert_eq!(
            unwrap_date_value(json!({"value": "2024-05-14"})),
            json!("2024-05-14")
        );
        assert_eq!(unwrap_date_value(json!("2024-05-14")), json!("2024-05-14"));
        // Multi-key objects are not date wrappers.
        assert_eq!(
            unwrap_date_value(json!({"value": "x", "other": 1})),
            json!({"value": "x", "other": 1})
        );
    }

    #[test]
    fn normalize_date_fields_rewrites_only_named_fields() {
        let rows = vec![row(json!({
            "date": {"value": "2024-05-14"},
            "created": {"value": "2024-05-14"},
            "revenue": 10
        }))];
        let out = normalize_date_fields(rows, &["date"]);
        assert_eq!(out[0].get("date"), Some(&json!("2024-05-14")));
        assert_eq!(out[0].get("created"), Some(&json!({"value": "2024-05-14"})));
    }

    #[test]
    fn key_text_treats_missing_and_null_alike() {
        let r = row(json!({"a": null, "b": "x", "c": 3}));
        assert_eq!(key_text(r.get("a")), "");
        assert_eq!(key_text(r.get("missing")), "");
        assert_eq!(key_text(r.get("b")), "x");
        assert_eq!(key_text(r.get("c")), "3");
    }
}

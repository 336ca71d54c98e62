//! Bind values for dynamically shaped statements
//!
//! Imports and report queries don't know their parameter types at compile
//! time. Values are normalized into [`SqlValue`] and bound natively; nested
//! JSON is bound as its text.

use serde_json::Value;
use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::query_builder::Separated;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// CSV cell: trimmed, empty is NULL.
    pub fn from_csv_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            Self::Null
        } else {
            Self::Text(cell.to_owned())
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Bind every value onto a prepared query, in order.
pub fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value.clone() {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(b),
            SqlValue::Int(i) => query.bind(i),
            SqlValue::UInt(u) => query.bind(u),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
        };
    }
    query
}

/// Push one value as a placeholder inside a `push_values` row.
pub(crate) fn push_separated(row: &mut Separated<'_, '_, MySql, &'static str>, value: SqlValue) {
    match value {
        SqlValue::Null => row.push_bind(None::<String>),
        SqlValue::Bool(b) => row.push_bind(b),
        SqlValue::Int(i) => row.push_bind(i),
        SqlValue::UInt(u) => row.push_bind(u),
        SqlValue::Float(f) => row.push_bind(f),
        SqlValue::Text(s) => row.push_bind(s),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_map_to_native_binds() {
        assert_eq!(SqlValue::from_json(&json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!(true)), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json(&json!(-3)), SqlValue::Int(-3));
        assert_eq!(
            SqlValue::from_json(&json!(u64::MAX)),
            SqlValue::UInt(u64::MAX)
        );
        assert_eq!(SqlValue::from_json(&json!(2.5)), SqlValue::Float(2.5));
        assert_eq!(SqlValue::from_json(&json!("sql")), SqlValue::Text("sql".into()));
    }

    #[test]
    fn nested_json_is_bound_as_text() {
        let v = SqlValue::from_json(&json!({"a": [1, 2]}));
        assert_eq!(v, SqlValue::Text(r#"{"a":[1,2]}"#.into()));
    }

    #[test]
    fn csv_cells() {
        assert_eq!(SqlValue::from_csv_cell("  "), SqlValue::Null);
        assert_eq!(SqlValue::from_csv_cell(" 42 "), SqlValue::Text("42".into()));
    }
}

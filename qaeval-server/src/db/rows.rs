//! Decode arbitrary result rows into JSON objects
//!
//! Report and table-browse queries have no compile-time row type. Each
//! column is decoded by its MySQL type: integers as numbers, DECIMAL as a
//! string (exact), floats as numbers, temporal types as ISO strings, JSON as
//! JSON, binary as lossy UTF-8. NULL is `null` for every type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// One decoded row, keyed by column label
pub type JsonRow = Map<String, Value>;

pub fn row_to_json(row: &MySqlRow) -> JsonRow {
    let mut out = Map::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_owned(), column_value(row, idx));
    }
    out
}

pub fn rows_to_json(rows: &[MySqlRow]) -> Vec<JsonRow> {
    rows.iter().map(row_to_json).collect()
}

fn column_value(row: &MySqlRow, idx: usize) -> Value {
    let Ok(raw) = row.try_get_raw(idx) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();
    decode_by_type(row, idx, &type_name)
}

fn decode_by_type(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    match type_name {
        "BOOLEAN" => get::<bool>(row, idx).map(Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            get::<i64>(row, idx).map(|v| Value::Number(v.into()))
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => get::<u64>(row, idx).map(|v| Value::Number(v.into())),
        "FLOAT" => get::<f32>(row, idx).map(|v| float(v as f64)),
        "DOUBLE" => get::<f64>(row, idx).map(float),
        // Exact decimal text; the binary protocol sends DECIMAL as a string
        "DECIMAL" => row
            .try_get_unchecked::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(Value::String),
        "DATETIME" => get::<NaiveDateTime>(row, idx).map(|v| Value::String(v.to_string())),
        "TIMESTAMP" => get::<DateTime<Utc>>(row, idx).map(|v| Value::String(v.to_rfc3339())),
        "DATE" => get::<NaiveDate>(row, idx).map(|v| Value::String(v.to_string())),
        "TIME" => get::<NaiveTime>(row, idx).map(|v| Value::String(v.to_string())),
        "JSON" => get::<Value>(row, idx),
        _ => get::<String>(row, idx).map(Value::String).or_else(|| {
            get::<Vec<u8>>(row, idx).map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
        }),
    }
    .unwrap_or(Value::Null)
}

fn get<'r, T>(row: &'r MySqlRow, idx: usize) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get::<Option<T>, _>(idx).ok().flatten()
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

//! Import endpoints (manage_data)

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::post,
    Json, Router,
};
use qaeval_core::{Permission, ValidationError};
use serde::Deserialize;
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::import::{is_account_table, ImportReport, Importer, Payload, TableOutcome};

#[derive(Debug, Deserialize)]
pub struct CsvParams {
    #[serde(default = "default_true")]
    pub has_header: bool,
}

fn default_true() -> bool {
    true
}

/// Writing account tables needs `manage_users` on top of `manage_data`.
fn require_table_access<'a>(
    auth: &AuthUser,
    tables: impl IntoIterator<Item = &'a str>,
) -> Result<(), ApiError> {
    if tables.into_iter().any(is_account_table) {
        auth.require(Permission::ManageUsers)?;
    }
    Ok(())
}

fn multi_table(value: Value) -> Result<serde_json::Map<String, Value>, ApiError> {
    match Payload::detect(value)? {
        Payload::MultiTable(tables) => Ok(tables),
        Payload::SingleTable(_) => Err(ApiError::bad_request(
            "a list of records needs a target table: POST /import/tables/{table}/json",
        )),
    }
}

/// POST /import/json - `{ "table": [records...], ... }`
async fn import_json(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<Value>,
) -> Result<Json<ImportReport>, ApiError> {
    auth.require(Permission::ManageData)?;
    let tables = multi_table(payload)?;
    require_table_access(&auth, tables.keys().map(String::as_str))?;
    let report = Importer::new(&state.pool).import_batch(&tables).await?;
    state.sessions.invalidate_stats().await;
    Ok(Json(report))
}

/// POST /import/ordered - multi-table payload in dependency order
async fn import_ordered(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<Value>,
) -> Result<Json<ImportReport>, ApiError> {
    auth.require(Permission::ManageData)?;
    let tables = multi_table(payload)?;
    require_table_access(&auth, tables.keys().map(String::as_str))?;
    let report = Importer::new(&state.pool).import_ordered(&tables).await?;
    state.sessions.invalidate_stats().await;
    Ok(Json(report))
}

/// POST /import/tables/{table}/json - `[records...]`
async fn import_table_json(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(table): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<TableOutcome>, ApiError> {
    auth.require(Permission::ManageData)?;
    require_table_access(&auth, [table.as_str()])?;
    let records = match Payload::detect(payload)? {
        Payload::SingleTable(records) => records,
        Payload::MultiTable(_) => {
            return Err(ValidationError::InvalidFormat {
                field: "payload",
                reason: "expected a JSON array of records",
            }
            .into())
        }
    };
    let outcome = Importer::new(&state.pool).import_table(&table, &records).await?;
    state.sessions.invalidate_stats().await;
    Ok(Json(outcome))
}

/// POST /import/tables/{table}/csv?has_header=true - raw CSV body
async fn import_table_csv(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(table): Path<String>,
    Query(params): Query<CsvParams>,
    body: Bytes,
) -> Result<Json<TableOutcome>, ApiError> {
    auth.require(Permission::ManageData)?;
    require_table_access(&auth, [table.as_str()])?;
    if body.is_empty() {
        return Err(ValidationError::Empty { field: "csv body" }.into());
    }
    let outcome = Importer::new(&state.pool)
        .import_csv(&table, &body, params.has_header)
        .await?;
    state.sessions.invalidate_stats().await;
    Ok(Json(outcome))
}

/// Import routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/import/json", post(import_json))
        .route("/import/ordered", post(import_ordered))
        .route("/import/tables/{table}/json", post(import_table_json))
        .route("/import/tables/{table}/csv", post(import_table_csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multi_table_rejects_bare_list() {
        assert!(multi_table(json!({"tags": []})).is_ok());
        assert!(matches!(multi_table(json!([])), Err(ApiError::BadRequest { .. })));
        assert!(matches!(multi_table(json!(3)), Err(ApiError::Validation(_))));
    }
}

//! Schema and table browsing endpoints

use std::sync::Arc;

use axum::{extract::{Path, Query, State}, routing::{get, post}, Json, Router};
use qaeval_core::{Pagination, PaginationParams, Permission};
use serde::Serialize;

use crate::db::introspect::{foreign_keys, TableInfo};
use crate::db::repos::TableRepo;
use crate::db::schema::{create_tables, SchemaReport};
use crate::db::QueryPage;
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct ForeignKeyResponse {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub relation: String,
}

/// POST /db/init - create tables and constraints
async fn init(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<SchemaReport>, ApiError> {
    auth.require(Permission::ManageData)?;
    Ok(Json(create_tables(&state.pool).await))
}

/// GET /db/tables
async fn list_tables(State(state): State<Arc<AppState>>, auth: AuthUser) -> Result<Json<TablesResponse>, ApiError> {
    auth.require(Permission::ViewAll)?;
    let tables = TableRepo::new(&state.pool).list().await?;
    Ok(Json(TablesResponse { tables }))
}

/// GET /db/tables/{table}/rows
async fn table_rows(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(table): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<QueryPage>, ApiError> {
    auth.require(Permission::ViewAll)?;
    let page = TableRepo::new(&state.pool)
        .rows(&table, Pagination::from(params))
        .await?;
    Ok(Json(page.into()))
}

/// GET /db/tables/{table}/schema
async fn table_schema(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(table): Path<String>,
) -> Result<Json<TableInfo>, ApiError> {
    auth.require(Permission::ViewAll)?;
    Ok(Json(TableRepo::new(&state.pool).describe(&table).await?))
}

/// GET /db/foreign-keys
async fn list_foreign_keys(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<ForeignKeyResponse>>, ApiError> {
    auth.require(Permission::ViewAll)?;
    let keys = foreign_keys(&state.pool).await?;
    Ok(Json(
        keys.into_iter()
            .map(|fk| ForeignKeyResponse {
                relation: fk.to_string(),
                table: fk.table,
                column: fk.column,
                referenced_table: fk.referenced_table,
                referenced_column: fk.referenced_column,
            })
            .collect(),
    ))
}

/// Database routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/db/init", post(init))
        .route("/db/tables", get(list_tables))
        .route("/db/tables/{table}/rows", get(table_rows))
        .route("/db/tables/{table}/schema", get(table_schema))
        .route("/db/foreign-keys", get(list_foreign_keys))
}

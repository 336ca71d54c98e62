//! qaeval-server: MySQL persistence and HTTP API for the QA evaluation dataset
//!
//! Covers schema bootstrap and browsing, JSON/CSV import, annotation of raw
//! answers into the standard set, LLM scoring batches, the report catalog
//! and bcrypt/JWT authentication with server-side sessions.

pub mod auth;
pub mod db;
pub mod evaluation;
pub mod http;
pub mod import;
pub mod reports;

pub use auth::{AuthError, AuthService, SessionStore, TokenKeys};
pub use db::schema::{create_tables, SchemaReport};
pub use db::{create_lazy_pool, create_pool, DbError, SchemaCatalog};
pub use evaluation::{BatchEvaluator, BatchReport, EvaluationError};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use import::{ImportError, ImportReport, Importer, Payload};

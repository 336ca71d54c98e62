//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - One bounded pool, no connection per query
//! - Dynamic identifiers only through the introspected catalog
//! - Rely on DB constraints (UNIQUE) and map violations to conflicts
//! - Transactions for multi-step operations

pub mod builder;
pub mod error;
pub mod introspect;
pub mod paginate;
pub mod pool;
pub mod repos;
pub mod rows;
pub mod schema;
pub mod value;

pub use error::DbError;
pub use introspect::{ForeignKey, SchemaCatalog, TableInfo};
pub use paginate::{paginate, QueryPage};
pub use pool::{create_lazy_pool, create_pool, create_pool_with_options};
pub use rows::JsonRow;
pub use value::SqlValue;

pub use sqlx::MySqlPool;

//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod account;
pub mod ident;
pub mod pagination;
pub mod role;
pub mod status;
pub mod validation;

pub use ident::SqlIdent;
pub use pagination::{total_pages, Page, Pagination, PaginationParams};
pub use role::{Permission, Role};
pub use status::AnswerStatus;
pub use validation::ValidationError;

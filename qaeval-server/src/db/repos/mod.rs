//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Relies on UNIQUE keys for duplicates and maps violations to conflicts
//! - Uses transactions for multi-step operations

pub mod annotation;
pub mod evaluation;
pub mod raw;
pub mod tables;
pub mod users;

pub use annotation::{AnnotationRepo, AnnotationStats, PromoteAnswer, PromoteQuestion, Promoted, TagRef};
pub use evaluation::{EvaluationRepo, ModelStats, NewEvaluation, PairFilter, StandardPair};
pub use raw::{Annotator, RawAnswerRepo};
pub use tables::TableRepo;
pub use users::{NewUser, UserRecord, UserRepo, UserStats};

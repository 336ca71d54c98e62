pub mod config;
pub mod error;
pub mod models;
pub mod prompt;
pub mod scoring;

pub use config::{load_dotenv, QaEvalConfig};
pub use error::{CoreError, Result};
pub use models::{AnswerStatus, Page, Pagination, PaginationParams, Permission, Role, SqlIdent, ValidationError};
pub use prompt::{render_evaluation_prompt, DEFAULT_CRITERIA};
pub use scoring::{parse_evaluation, EvaluationScores, ParseMethod, ParsedEvaluation, ScoreField};

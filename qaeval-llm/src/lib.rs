//! qaeval-llm - LLM judges for question/answer pairs
//!
//! ```text
//! model name → ProviderRegistry → ModelSpec + ChatProvider
//!                                     ↓
//!           prompt (question, answer, criteria) → reply → ParsedEvaluation
//! ```

pub mod anthropic;
pub mod error;
pub mod evaluator;
pub mod openai;
pub mod provider;
pub mod registry;

pub use error::LlmError;
pub use evaluator::{Evaluator, PairEvaluation};
pub use provider::{ChatProvider, CompletionOptions, MockProvider, ProviderKind};
pub use registry::{Capability, ModelAvailability, ModelSpec, ProviderRegistry, BUILTIN_MODELS};

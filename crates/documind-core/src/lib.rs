//! Retrieval, prompt assembly and question answering over stored collections.

pub mod assistant;
pub mod config;
pub mod error;
pub mod prompt;
pub mod retriever;
pub mod secret;

pub use assistant::{Answer, Assistant, IndexOutcome};
pub use config::Config;
pub use error::AssistantError;
pub use prompt::{BuiltPrompt, ContextSource, PromptBuilder};
pub use retriever::Retriever;

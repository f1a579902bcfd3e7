//! Text-generation provider abstraction and backend implementations.

pub mod any;
pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
pub use provider::LlmProvider;

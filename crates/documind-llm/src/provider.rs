use std::future::Future;

use crate::error::LlmError;

pub trait LlmProvider: Send + Sync {
    /// Send a single prompt to `model` and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response is invalid.
    fn generate(
        &self,
        prompt: &str,
        model: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// List the model identifiers the backend exposes.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails.
    fn list_models(&self) -> impl Future<Output = Result<Vec<String>, LlmError>> + Send;

    fn name(&self) -> &str;
}

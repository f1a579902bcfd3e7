//! Test-only mock provider.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LlmError;
use crate::provider::LlmProvider;

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
    pub default_response: String,
    pub models: Vec<String>,
    pub fail_generate: bool,
    pub fail_list_models: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            models: vec!["models/mock-1".into()],
            fail_generate: false,
            fail_list_models: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    /// Every `(prompt, model)` pair received so far, oldest first.
    #[must_use]
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last_prompt(&self) -> Option<String> {
        self.recorded().pop().map(|(prompt, _)| prompt)
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((prompt.to_owned(), model.to_owned()));
        if self.fail_generate {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        if self.fail_list_models {
            return Err(LlmError::Other("mock list error".into()));
        }
        Ok(self.models.clone())
    }
}

use crate::error::LlmError;
use crate::gemini::GeminiProvider;
#[cfg(feature = "mock")]
use crate::mock::MockProvider;
use crate::provider::LlmProvider;

/// Generates a match over all `AnyProvider` variants, binding the inner provider
/// and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyProvider::Gemini($p) => $expr,
            #[cfg(feature = "mock")]
            AnyProvider::Mock($p) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyProvider {
    Gemini(GeminiProvider),
    #[cfg(feature = "mock")]
    Mock(MockProvider),
}

impl LlmProvider for AnyProvider {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, LlmError> {
        delegate_provider!(self, |p| p.generate(prompt, model).await)
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        delegate_provider!(self, |p| p.list_models().await)
    }

    fn name(&self) -> &str {
        delegate_provider!(self, |p| p.name())
    }
}

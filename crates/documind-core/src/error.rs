use documind_llm::LlmError;
use documind_memory::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("model backend is not configured")]
    BackendUnconfigured,

    /// Generation failed after the prompt was assembled. `sources_markdown` is the
    /// provenance note computed before the call so the response can still carry it.
    #[error("{source}")]
    Model {
        source: LlmError,
        sources_markdown: String,
        available_models: Option<Vec<String>>,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

//! Per-request orchestration: persist collections, and answer questions by
//! loading a collection, selecting chunks, building the prompt and calling the model.

use std::path::PathBuf;

use documind_llm::LlmProvider;
use documind_memory::{CollectionIndex, IndexStore};
use serde::Serialize;

use crate::error::AssistantError;
use crate::prompt::{BuiltPrompt, ContextSource, PromptBuilder};
use crate::retriever::Retriever;

/// Response body of a successful question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer_markdown: String,
    /// Reserved; always empty.
    pub math_expressions: Vec<String>,
    pub sources_markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Saved { path: PathBuf, chunks: usize },
    /// The data was received but could not be persisted.
    Unsaved { error: String },
}

pub struct Assistant<P> {
    store: IndexStore,
    retriever: Retriever,
    prompts: PromptBuilder,
    provider: Option<P>,
    default_model: String,
}

impl<P: LlmProvider> Assistant<P> {
    /// `provider` is `None` when no credentials are configured; questions then fail
    /// with [`AssistantError::BackendUnconfigured`] while indexing keeps working.
    #[must_use]
    pub fn new(
        store: IndexStore,
        retriever: Retriever,
        prompts: PromptBuilder,
        provider: Option<P>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            retriever,
            prompts,
            provider,
            default_model: default_model.into(),
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    #[must_use]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Replace the stored index for `collection`.
    ///
    /// A storage failure does not fail the call; it is reported as
    /// [`IndexOutcome::Unsaved`].
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Validation`] when `collection` is blank.
    pub async fn index(
        &self,
        collection: &str,
        index: CollectionIndex,
    ) -> Result<IndexOutcome, AssistantError> {
        let collection = collection.trim();
        if collection.is_empty() {
            return Err(AssistantError::Validation("Missing collection name"));
        }
        tracing::info!(
            collection,
            chunks = index.chunks.len(),
            "received chunks for collection"
        );

        match self.store.save(collection, &index).await {
            Ok(path) => Ok(IndexOutcome::Saved {
                path,
                chunks: index.chunks.len(),
            }),
            Err(e) => {
                tracing::warn!(collection, "failed to save index to disk: {e}");
                Ok(IndexOutcome::Unsaved {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Load `collection` (if any), select chunks and assemble the prompt, without
    /// calling the model.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing collection record cannot be read.
    pub async fn prepare(
        &self,
        question: &str,
        collection: Option<&str>,
    ) -> Result<BuiltPrompt, AssistantError> {
        let Some(name) = collection else {
            return Ok(self.prompts.build(question, &[], ContextSource::None));
        };

        let Some(stored) = self.store.load(name).await? else {
            tracing::debug!(collection = name, "collection not found");
            return Ok(self.prompts.build(question, &[], ContextSource::NotFound(name)));
        };

        let selected = self.retriever.select(&stored.chunks, question);
        tracing::debug!(
            collection = name,
            candidates = stored.chunks.len(),
            selected = selected.len(),
            "selected context chunks"
        );
        Ok(self
            .prompts
            .build(question, &selected, ContextSource::Collection(name)))
    }

    /// Answer `question`, grounding it in `collection` when one is given.
    ///
    /// `collection` and `model` are trimmed; blank values count as absent.
    ///
    /// # Errors
    ///
    /// - [`AssistantError::Validation`] for a blank question;
    /// - [`AssistantError::BackendUnconfigured`] without a provider;
    /// - [`AssistantError::Model`] when generation fails;
    /// - [`AssistantError::Storage`] when a stored collection cannot be read.
    pub async fn answer(
        &self,
        question: &str,
        collection: Option<&str>,
        model: Option<&str>,
    ) -> Result<Answer, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::Validation("No question provided"));
        }
        let Some(provider) = self.provider.as_ref() else {
            return Err(AssistantError::BackendUnconfigured);
        };

        let collection = non_blank(collection);
        let model = non_blank(model).unwrap_or(self.default_model.as_str());

        let built = self.prepare(question, collection).await?;
        if built.truncated {
            tracing::debug!(
                max_context_chars = self.prompts.max_context_chars(),
                "context truncated"
            );
        }
        tracing::debug!(
            model,
            prompt_chars = built.prompt.len(),
            "calling model"
        );

        match provider.generate(&built.prompt, model).await {
            Ok(answer_markdown) => Ok(Answer {
                answer_markdown,
                math_expressions: Vec::new(),
                sources_markdown: built.sources_markdown,
            }),
            Err(source) => {
                tracing::error!(model, "model generation failed: {source}");
                let available_models = provider.list_models().await.ok();
                Err(AssistantError::Model {
                    source,
                    sources_markdown: built.sources_markdown,
                    available_models,
                })
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AssistantError::BackendUnconfigured`] without a provider, or
    /// [`AssistantError::Model`] if the listing fails.
    pub async fn list_models(&self) -> Result<Vec<String>, AssistantError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(AssistantError::BackendUnconfigured)?;
        provider
            .list_models()
            .await
            .map_err(|source| AssistantError::Model {
                source,
                sources_markdown: String::new(),
                available_models: None,
            })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use documind_llm::mock::MockProvider;
    use documind_memory::Chunk;

    use super::*;
    use crate::prompt::DEFAULT_SYSTEM_INSTRUCTIONS;

    async fn assistant_with(
        dir: &tempfile::TempDir,
        provider: Option<MockProvider>,
    ) -> Assistant<MockProvider> {
        let store = IndexStore::open(dir.path()).await.unwrap();
        Assistant::new(
            store,
            Retriever::default(),
            PromptBuilder::default(),
            provider,
            "gemini-2.5-flash",
        )
    }

    fn physics() -> CollectionIndex {
        CollectionIndex::new(
            Some("physics.pdf".into()),
            vec![
                Chunk::new("Newton's first law of motion", Some(1)),
                Chunk::new("Thermodynamics overview", Some(5)),
            ],
            Some(12),
            None,
        )
    }

    #[tokio::test]
    async fn index_saves_collection() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, None).await;

        let outcome = assistant.index("physics101", physics()).await.unwrap();
        assert!(matches!(outcome, IndexOutcome::Saved { chunks: 2, .. }));
        assert_eq!(
            assistant.store().load("physics101").await.unwrap(),
            Some(physics())
        );
    }

    #[tokio::test]
    async fn index_rejects_blank_collection() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, None).await;
        let err = assistant.index("  ", physics()).await.unwrap_err();
        assert!(matches!(err, AssistantError::Validation("Missing collection name")));
    }

    #[tokio::test]
    async fn index_storage_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let store = IndexStore::open(&root).await.unwrap();
        std::fs::remove_dir(&root).unwrap();
        let assistant: Assistant<MockProvider> = Assistant::new(
            store,
            Retriever::default(),
            PromptBuilder::default(),
            None,
            "m",
        );

        let outcome = assistant.index("c", physics()).await.unwrap();
        let IndexOutcome::Unsaved { error } = outcome else {
            panic!("expected Unsaved outcome");
        };
        assert!(error.contains("failed to write"));
    }

    #[tokio::test]
    async fn answer_grounds_prompt_in_matching_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::with_responses(vec!["F = ma".into()]);
        let assistant = assistant_with(&dir, Some(mock.clone())).await;
        assistant.index("physics101", physics()).await.unwrap();

        let answer = assistant
            .answer("What is Newton's law?", Some("physics101"), None)
            .await
            .unwrap();
        assert_eq!(answer.answer_markdown, "F = ma");
        assert!(answer.math_expressions.is_empty());
        assert_eq!(answer.sources_markdown, "Source: Document 'physics101'");

        let (prompt, model) = mock.recorded().pop().unwrap();
        assert_eq!(model, "gemini-2.5-flash");
        assert!(prompt.contains("(page 1) Newton's first law of motion"));
        assert!(!prompt.contains("Thermodynamics"));
    }

    #[tokio::test]
    async fn answer_without_collection_uses_bare_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::default();
        let assistant = assistant_with(&dir, Some(mock.clone())).await;

        let answer = assistant.answer("  Why is the sky blue? ", None, None).await.unwrap();
        assert_eq!(answer.sources_markdown, "");
        assert_eq!(
            mock.last_prompt().unwrap(),
            format!(
                "{DEFAULT_SYSTEM_INSTRUCTIONS}\n\nQuestion: Why is the sky blue?\n\nAnswer in markdown."
            )
        );
    }

    #[tokio::test]
    async fn blank_collection_counts_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, Some(MockProvider::default())).await;
        let answer = assistant.answer("q", Some("   "), None).await.unwrap();
        assert_eq!(answer.sources_markdown, "");
    }

    #[tokio::test]
    async fn answer_for_unknown_collection_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::default();
        let assistant = assistant_with(&dir, Some(mock.clone())).await;

        let answer = assistant
            .answer("What is entropy?", Some("ghost"), None)
            .await
            .unwrap();
        assert_eq!(
            answer.sources_markdown,
            "Source: Document 'ghost' (not found on server)"
        );
        assert!(!mock.last_prompt().unwrap().contains("Context (from document)"));
    }

    #[tokio::test]
    async fn answer_without_overlap_reports_no_high_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, Some(MockProvider::default())).await;
        assistant.index("physics101", physics()).await.unwrap();

        let answer = assistant
            .answer("quantum chromodynamics", Some("physics101"), None)
            .await
            .unwrap();
        assert_eq!(
            answer.sources_markdown,
            "Source: Document 'physics101' (no high-overlap chunks found)"
        );
    }

    #[tokio::test]
    async fn answer_uses_requested_model() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::default();
        let assistant = assistant_with(&dir, Some(mock.clone())).await;
        assistant
            .answer("q", None, Some(" gemini-2.5-pro "))
            .await
            .unwrap();
        assert_eq!(mock.recorded()[0].1, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn blank_question_is_rejected_before_backend_check() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, None).await;
        let err = assistant.answer(" \n ", None, None).await.unwrap_err();
        assert!(matches!(err, AssistantError::Validation("No question provided")));
    }

    #[tokio::test]
    async fn unconfigured_backend_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, None).await;
        assert!(!assistant.is_configured());
        let err = assistant.answer("q", None, None).await.unwrap_err();
        assert!(matches!(err, AssistantError::BackendUnconfigured));
        let err = assistant.list_models().await.unwrap_err();
        assert!(matches!(err, AssistantError::BackendUnconfigured));
    }

    #[tokio::test]
    async fn model_failure_keeps_sources_and_lists_models() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, Some(MockProvider::failing())).await;
        assistant.index("physics101", physics()).await.unwrap();

        let err = assistant
            .answer("Newton?", Some("physics101"), None)
            .await
            .unwrap_err();
        let AssistantError::Model {
            source,
            sources_markdown,
            available_models,
        } = err
        else {
            panic!("expected model error");
        };
        assert_eq!(source.to_string(), "mock LLM error");
        assert_eq!(sources_markdown, "Source: Document 'physics101'");
        assert_eq!(available_models, Some(vec!["models/mock-1".to_owned()]));
    }

    #[tokio::test]
    async fn model_failure_without_listing_omits_models() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockProvider::failing();
        mock.fail_list_models = true;
        let assistant = assistant_with(&dir, Some(mock)).await;

        let err = assistant.answer("q", None, None).await.unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Model {
                available_models: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn prepare_does_not_call_model() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockProvider::default();
        let assistant = assistant_with(&dir, Some(mock.clone())).await;
        assistant.index("physics101", physics()).await.unwrap();

        let built = assistant
            .prepare("thermodynamics", Some("physics101"))
            .await
            .unwrap();
        assert!(built.prompt.contains("(page 5) Thermodynamics overview"));
        assert!(mock.recorded().is_empty());
    }

    #[tokio::test]
    async fn list_models_delegates() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant_with(&dir, Some(MockProvider::default())).await;
        assert_eq!(assistant.list_models().await.unwrap(), vec!["models/mock-1"]);
    }
}

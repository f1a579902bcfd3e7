use std::path::PathBuf;

use serde::Deserialize;

use crate::prompt::{DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_SYSTEM_INSTRUCTIONS, PromptBuilder};
use crate::retriever::{DEFAULT_TOP_K, Retriever};
use crate::secret::Secret;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<Secret>,
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_llm_timeout(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Replaces the built-in system instructions when set.
    #[serde(default)]
    pub system_instructions: Option<String>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
            system_instructions: None,
        }
    }
}

impl RetrievalConfig {
    #[must_use]
    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.top_k)
    }

    #[must_use]
    pub fn prompt_builder(&self) -> PromptBuilder {
        let instructions = self
            .system_instructions
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTIONS);
        PromptBuilder::new(instructions, self.max_context_chars)
    }
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
    #[serde(default)]
    pub clear_on_startup: bool,
    #[serde(default)]
    pub clear_on_shutdown: bool,
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./indexed")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            clear_on_startup: false,
            clear_on_shutdown: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_max_body() -> usize {
    32 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            max_body_size: default_gateway_max_body(),
            cors: true,
        }
    }
}

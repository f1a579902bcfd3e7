use crate::secret::Secret;

use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_service();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("GEMINI_API_KEY")
            && !v.trim().is_empty()
        {
            self.llm.api_key = Some(Secret::new(v));
        }
        if let Ok(v) = std::env::var("GEMINI_MODEL")
            && !v.trim().is_empty()
        {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("GEMINI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("DOCUMIND_LLM_TIMEOUT") {
            match v.parse::<u64>() {
                Ok(secs) => self.llm.timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring invalid DOCUMIND_LLM_TIMEOUT value: {v}"),
            }
        }
    }

    fn apply_env_overrides_service(&mut self) {
        if let Ok(v) = std::env::var("PORT") {
            match v.parse::<u16>() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!("ignoring invalid PORT value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("DOCUMIND_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("DOCUMIND_INDEX_DIR") {
            self.storage.index_dir = v.into();
        }
        if let Ok(v) = std::env::var("DOCUMIND_TOP_K") {
            match v.parse::<usize>() {
                Ok(n) => self.retrieval.top_k = n,
                Err(_) => tracing::warn!("ignoring invalid DOCUMIND_TOP_K value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("DOCUMIND_MAX_CONTEXT_CHARS") {
            match v.parse::<usize>() {
                Ok(n) => self.retrieval.max_context_chars = n,
                Err(_) => {
                    tracing::warn!("ignoring invalid DOCUMIND_MAX_CONTEXT_CHARS value: {v}");
                }
            }
        }
        if let Ok(v) = std::env::var("DOCUMIND_CLEAR_ON_STARTUP")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.storage.clear_on_startup = enabled;
        }
        if let Ok(v) = std::env::var("DOCUMIND_CLEAR_ON_SHUTDOWN")
            && let Ok(enabled) = v.parse::<bool>()
        {
            self.storage.clear_on_shutdown = enabled;
        }
    }
}

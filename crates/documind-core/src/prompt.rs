//! Grounded prompt assembly with a hard character bound on the embedded context.

use documind_memory::Chunk;

pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 18_000;
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";
pub const TRUNCATION_MARKER: &str = "\n\n...[truncated]\n";

pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = "You are an assistant that answers questions using \
provided context when available. Return a concise, helpful answer in markdown. If you use math, \
format it using LaTeX delimiters (\\(...\\) or \\[...\\]).";

/// Where the retrieved chunks came from, as far as the answer's provenance note is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource<'a> {
    /// The request did not name a collection.
    None,
    /// A collection was named but nothing is stored under it.
    NotFound(&'a str),
    /// The collection was loaded; chunks may still be empty if nothing overlapped.
    Collection(&'a str),
}

impl ContextSource<'_> {
    /// Provenance note shown next to the answer.
    #[must_use]
    pub fn sources_markdown(&self, has_context: bool) -> String {
        match *self {
            Self::None => String::new(),
            Self::NotFound(name) => format!("Source: Document '{name}' (not found on server)"),
            Self::Collection(name) if has_context => format!("Source: Document '{name}'"),
            Self::Collection(name) => {
                format!("Source: Document '{name}' (no high-overlap chunks found)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub prompt: String,
    pub sources_markdown: String,
    /// Character count of the embedded context, marker excluded.
    pub context_chars: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_instructions: String,
    max_context_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_INSTRUCTIONS, DEFAULT_MAX_CONTEXT_CHARS)
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn new(system_instructions: impl Into<String>, max_context_chars: usize) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            max_context_chars,
        }
    }

    #[must_use]
    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    #[must_use]
    pub fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }

    /// Compose the model prompt for `question` from already-selected chunks.
    ///
    /// With no chunks the prompt carries only the system instructions and the question.
    #[must_use]
    pub fn build(&self, question: &str, chunks: &[&Chunk], source: ContextSource<'_>) -> BuiltPrompt {
        let context = render_context(chunks);
        let sources_markdown = source.sources_markdown(!context.is_empty());
        let system = &self.system_instructions;

        if context.is_empty() {
            return BuiltPrompt {
                prompt: format!("{system}\n\nQuestion: {question}\n\nAnswer in markdown."),
                sources_markdown,
                context_chars: 0,
                truncated: false,
            };
        }

        let (context, truncated) = truncate_context(context, self.max_context_chars);
        let context_chars = if truncated {
            self.max_context_chars
        } else {
            context.chars().count()
        };
        let prompt = format!(
            "{system}\n\nContext (from document):\n{context}\n\nQuestion: {question}\n\n\
             Answer in markdown. Cite source pages from the provided context where appropriate."
        );

        BuiltPrompt {
            prompt,
            sources_markdown,
            context_chars,
            truncated,
        }
    }
}

/// `(page N) text` per chunk, joined by [`CHUNK_SEPARATOR`]. Page 0 counts as no page.
#[must_use]
pub fn render_context(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| match chunk.page {
            Some(page) if page > 0 => format!("(page {page}) {}", chunk.text),
            _ => chunk.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}

/// Cut `context` to `max_chars` characters and append [`TRUNCATION_MARKER`] when it is longer.
#[must_use]
pub fn truncate_context(mut context: String, max_chars: usize) -> (String, bool) {
    match context.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            context.truncate(byte_idx);
            context.push_str(TRUNCATION_MARKER);
            (context, true)
        }
        None => (context, false),
    }
}

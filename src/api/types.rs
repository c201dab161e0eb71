use serde::Serialize;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
    #[error("internal error: {msg}")]
    Internal { msg: String },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Suggestions for one query. `words[0]` is the typed word itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionResponse {
    pub words: Vec<String>,
    /// Whether `words[1]` is good enough to auto-correct to.
    pub has_correction: bool,
}

impl SuggestionResponse {
    /// The auto-correction target, if any.
    pub fn correction(&self) -> Option<&str> {
        if self.has_correction {
            self.words.get(1).map(String::as_str)
        } else {
            None
        }
    }
}

/// Result of an asynchronous query, tagged with the generation returned by
/// `submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsyncSuggestions {
    pub generation: u64,
    pub response: SuggestionResponse,
}

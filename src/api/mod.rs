//! Embedding layer for the keyboard: one [`SuggestEngine`] per input
//! session plus a few process-wide helpers.

mod engine;
mod resources;
mod types;

pub use engine::SuggestEngine;
pub use resources::{EngineResources, AUTO_WORDS_FILE, USER_BIGRAMS_FILE, USER_WORDS_FILE};
pub use types::{AsyncSuggestions, EngineError, SuggestionResponse};

use std::path::Path;

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Replace the default tuning. Must run before the first engine is built.
pub fn settings_load_config(path: &Path) -> Result<(), EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
        msg: format!("{}: {e}", path.display()),
    })?;
    suggest_core::settings::init_custom(content)
        .map_err(|e| EngineError::InvalidData { msg: e.to_string() })?;
    Ok(())
}

pub fn settings_default_config() -> String {
    suggest_core::settings::DEFAULT_SETTINGS_TOML.to_string()
}

pub fn trace_init(log_dir: &Path) {
    crate::trace_init::init_tracing(log_dir);
}

//! Structured error types for the renderer.
//!
//! Every failure is fatal to the render in progress: nothing is retried and
//! no partial result is recovered. Canvas failures pass through unchanged.

use thiserror::Error;

use crate::canvas::CanvasError;

/// The unified error type returned by all public rendering functions.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A named context is neither in the schema nor known to the context
    /// resolver.
    #[error("Context \"{0}\" was not found")]
    ContextNotFound(String),

    /// An element tag is not built in and no custom element parser took it.
    #[error("Element \"{0}\" can't be rendered: it is not text, image or table and no custom element parser accepted it")]
    UnsupportedElementType(String),

    /// A custom element kept being replaced by further custom elements.
    #[error("Element \"{tag}\" was still being substituted after {limit} replacements")]
    SubstitutionLimit { tag: String, limit: usize },

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// JSON input failed to parse as a schema.
    #[error("Failed to parse schema: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the schema format. Check element types and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        RenderError::Parse { source: e, hint }
    }
}

//! # pdf-schema
//!
//! Renders declarative document schemas onto a drawing canvas.
//!
//! A schema is plain JSON: pages of text, image and table elements, named
//! style contexts, named images and a page header. This crate interprets
//! it. It resolves symbolic positions and cascading style contexts, lays
//! out tables with measured rows and page breaks, and issues the resulting
//! drawing calls to a [`Canvas`]. Fonts, glyph metrics, image decoding and
//! the output format are the canvas's business.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]   : Schema: pages, elements, contexts, tables
//!       ↓
//!   [layout]  : Walk pages, dispatch elements, lay out tables
//!     ↙    ↘
//! [style]  [layout::position] : Contexts and coordinates
//!       ↓
//!   [canvas]  : Drawing calls; RecordingCanvas keeps them as data
//! ```

pub mod canvas;
pub mod error;
pub mod layout;
pub mod model;
pub mod options;
pub mod style;

pub use canvas::{Canvas, CanvasCommand, CanvasError, RecordingCanvas};
pub use error::RenderError;
pub use model::Schema;
pub use options::{RenderOptions, Substitution};

use layout::LayoutEngine;

/// Render a schema onto a canvas.
///
/// This is the primary entry point. The canvas is driven in order, one
/// call at a time; on error it holds whatever was drawn before the failure.
pub fn render(
    schema: &Schema,
    canvas: &mut dyn Canvas,
    options: RenderOptions<'_>,
) -> Result<(), RenderError> {
    LayoutEngine::new(schema, options).render(canvas)
}

/// Render a schema given as JSON onto a canvas.
pub fn render_json(
    json: &str,
    canvas: &mut dyn Canvas,
    options: RenderOptions<'_>,
) -> Result<(), RenderError> {
    let schema: Schema = serde_json::from_str(json)?;
    render(&schema, canvas, options)
}

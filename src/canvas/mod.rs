//! # Canvas Contract
//!
//! The renderer never produces bytes. It drives a [`Canvas`]: an external
//! drawing engine that owns fonts, text metrics, image decoding and the
//! final encoding. The canvas also owns the only mutable state of a render,
//! the cursor and the current style, which the renderer changes exclusively
//! through the calls below.
//!
//! [`RecordingCanvas`] implements the contract with simple deterministic
//! metrics and keeps a log of every call.

mod image_loader;
mod recording;

use std::error::Error;
use std::fmt;

use serde::Serialize;

use crate::model::{Context, Edges, Options};

pub use image_loader::load_image_dimensions;
pub use recording::{CanvasCommand, PageSize, RecordingCanvas};

/// A position on the current page, in points from the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured size of a piece of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

/// Size and margins of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageBounds {
    pub width: f64,
    pub height: f64,
    pub margins: Edges,
}

impl PageBounds {
    pub fn content_width(&self) -> f64 {
        self.width - self.margins.horizontal()
    }

    /// Lowest y coordinate content may reach.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margins.bottom
    }
}

/// Identifies an image the canvas has opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageHandle(pub String);

/// An opened image with its intrinsic size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedImage {
    pub handle: ImageHandle,
    pub width: f64,
    pub height: f64,
}

impl OpenedImage {
    pub fn extent(&self) -> Extent {
        Extent {
            width: self.width,
            height: self.height,
        }
    }
}

/// A failure reported by the canvas. Passed through the renderer unchanged.
#[derive(Debug)]
pub struct CanvasError(Box<dyn Error + Send + Sync>);

impl CanvasError {
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        CanvasError(error.into())
    }
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for CanvasError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// The drawing engine a schema is rendered onto.
///
/// Coordinates are in points with the origin at the top-left corner of the
/// page. Calls arrive strictly in schema order and each one may depend on
/// the cursor and style left behind by the previous one.
pub trait Canvas {
    /// Receives the schema's canvas construction options before anything
    /// else is called.
    fn configure(&mut self, _options: &Options) -> Result<(), CanvasError> {
        Ok(())
    }

    /// Start a new page, with page-specific options if given.
    fn new_page(&mut self, options: Option<&Options>) -> Result<(), CanvasError>;

    fn page_bounds(&self) -> PageBounds;

    fn cursor(&self) -> Point;

    /// Move the cursor. `None` leaves that coordinate unchanged.
    fn move_to(&mut self, x: Option<f64>, y: Option<f64>);

    /// Move the cursor down by `lines` lines of the current font (up when
    /// negative).
    fn move_lines(&mut self, lines: f64);

    fn set_font(&mut self, font: &str) -> Result<(), CanvasError>;

    fn set_font_size(&mut self, size: f64) -> Result<(), CanvasError>;

    fn set_fill_color(&mut self, color: &str) -> Result<(), CanvasError>;

    /// The font, size and fill color currently in effect.
    fn current_style(&self) -> Context;

    /// Size `text` would take when drawn with `options` in the current style.
    fn measure_text(&mut self, text: &str, options: &Options) -> Result<Extent, CanvasError>;

    /// Draw text at the given position, or at the cursor for unset coordinates.
    fn draw_text(
        &mut self,
        text: &str,
        x: Option<f64>,
        y: Option<f64>,
        options: &Options,
    ) -> Result<(), CanvasError>;

    fn open_image(&mut self, src: &str) -> Result<OpenedImage, CanvasError>;

    /// Draw a previously opened image at the cursor.
    fn draw_image(&mut self, image: &ImageHandle, options: &Options) -> Result<(), CanvasError>;

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: &str,
    ) -> Result<(), CanvasError>;

    /// Stroke a straight line.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CanvasError>;
}

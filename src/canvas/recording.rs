//! A canvas that records every call instead of drawing.
//!
//! Metrics are fixed and exact: every
//! character is half the font size wide and a line is 1.25 times the font
//! size tall. Text with a `width` option wraps onto as many lines as that
//! width requires. Page size and margins are read from the same options a
//! pdfkit document takes (`size`, `margin`, `margins`).

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::{Canvas, CanvasError, Extent, ImageHandle, OpenedImage, PageBounds, Point};
use crate::model::{Context, Edges, Options};

const CHAR_WIDTH_FACTOR: f64 = 0.5;
const LINE_HEIGHT_FACTOR: f64 = 1.25;
const DEFAULT_FONT: &str = "Helvetica";
const DEFAULT_FONT_SIZE: f64 = 12.0;
const DEFAULT_FILL: &str = "black";
const DEFAULT_MARGIN: f64 = 72.0;

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }

    /// Parse a `size` option: a paper name or a `[width, height]` pair.
    pub fn from_option(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => match name.to_ascii_uppercase().as_str() {
                "A4" => Some(PageSize::A4),
                "A3" => Some(PageSize::A3),
                "A5" => Some(PageSize::A5),
                "LETTER" => Some(PageSize::Letter),
                "LEGAL" => Some(PageSize::Legal),
                "TABLOID" => Some(PageSize::Tabloid),
                _ => None,
            },
            Value::Array(pair) => match pair.as_slice() {
                [w, h] => Some(PageSize::Custom {
                    width: w.as_f64()?,
                    height: h.as_f64()?,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum CanvasCommand {
    NewPage {
        options: Option<Options>,
    },
    MoveTo {
        x: Option<f64>,
        y: Option<f64>,
    },
    MoveLines {
        lines: f64,
    },
    SetFont {
        font: String,
    },
    SetFontSize {
        size: f64,
    },
    SetFillColor {
        color: String,
    },
    /// Text drawn with its top-left corner at `at`.
    DrawText {
        text: String,
        at: Point,
        options: Options,
    },
    OpenImage {
        src: String,
    },
    DrawImage {
        handle: ImageHandle,
        at: Point,
        options: Options,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

/// Records every call made against it, in order.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: PageSize,
    margins: Edges,
    page_size: PageSize,
    page_margins: Edges,
    style: Context,
    cursor: Point,
    commands: Vec<CanvasCommand>,
    /// Sources with a known size that need no loading.
    sources: HashMap<String, Extent>,
    opened: HashMap<ImageHandle, Extent>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    /// An A4 canvas with one-inch margins and 12pt Helvetica in black.
    pub fn new() -> Self {
        Self::with_page(PageSize::A4, Edges::uniform(DEFAULT_MARGIN))
    }

    pub fn with_page(size: PageSize, margins: Edges) -> Self {
        Self {
            size,
            margins,
            page_size: size,
            page_margins: margins,
            style: Context {
                font: Some(DEFAULT_FONT.to_string()),
                font_size: Some(DEFAULT_FONT_SIZE),
                fill_color: Some(DEFAULT_FILL.to_string()),
            },
            cursor: Point::new(margins.left, margins.top),
            commands: Vec::new(),
            sources: HashMap::new(),
            opened: HashMap::new(),
        }
    }

    /// Make `src` openable with the given size, without reading it.
    pub fn register_image(&mut self, src: &str, width: f64, height: f64) {
        self.sources
            .insert(src.to_string(), Extent { width, height });
    }

    pub fn commands(&self) -> &[CanvasCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<CanvasCommand> {
        std::mem::take(&mut self.commands)
    }

    /// The current style: what the last font, size and fill calls left.
    pub fn style(&self) -> &Context {
        &self.style
    }

    pub fn page_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, CanvasCommand::NewPage { .. }))
            .count()
    }

    /// Commands grouped by page, each group starting after its `NewPage`.
    pub fn pages(&self) -> Vec<&[CanvasCommand]> {
        let starts: Vec<usize> = self
            .commands
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, CanvasCommand::NewPage { .. }))
            .map(|(i, _)| i + 1)
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let end = starts
                    .get(n + 1)
                    .map(|next| next - 1)
                    .unwrap_or(self.commands.len());
                &self.commands[start..end]
            })
            .collect()
    }

    /// Every piece of text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                CanvasCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn font_size(&self) -> f64 {
        self.style.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    fn line_height(&self) -> f64 {
        self.font_size() * LINE_HEIGHT_FACTOR
    }

    fn layout_from(options: &Options, size: &mut PageSize, margins: &mut Edges) {
        if let Some(parsed) = options.get("size").and_then(PageSize::from_option) {
            *size = parsed;
        }
        if let Some(margin) = options.number("margin") {
            *margins = Edges::uniform(margin);
        }
        if let Some(parsed) = options
            .get("margins")
            .and_then(|v| serde_json::from_value::<Edges>(v.clone()).ok())
        {
            *margins = parsed;
        }
    }
}

impl Canvas for RecordingCanvas {
    fn configure(&mut self, options: &Options) -> Result<(), CanvasError> {
        Self::layout_from(options, &mut self.size, &mut self.margins);
        self.page_size = self.size;
        self.page_margins = self.margins;
        Ok(())
    }

    fn new_page(&mut self, options: Option<&Options>) -> Result<(), CanvasError> {
        self.page_size = self.size;
        self.page_margins = self.margins;
        if let Some(options) = options {
            Self::layout_from(options, &mut self.page_size, &mut self.page_margins);
        }
        self.cursor = Point::new(self.page_margins.left, self.page_margins.top);
        self.commands.push(CanvasCommand::NewPage {
            options: options.cloned(),
        });
        Ok(())
    }

    fn page_bounds(&self) -> PageBounds {
        let (width, height) = self.page_size.dimensions();
        PageBounds {
            width,
            height,
            margins: self.page_margins,
        }
    }

    fn cursor(&self) -> Point {
        self.cursor
    }

    fn move_to(&mut self, x: Option<f64>, y: Option<f64>) {
        if let Some(x) = x {
            self.cursor.x = x;
        }
        if let Some(y) = y {
            self.cursor.y = y;
        }
        self.commands.push(CanvasCommand::MoveTo { x, y });
    }

    fn move_lines(&mut self, lines: f64) {
        self.cursor.y += lines * self.line_height();
        self.commands.push(CanvasCommand::MoveLines { lines });
    }

    fn set_font(&mut self, font: &str) -> Result<(), CanvasError> {
        self.style.font = Some(font.to_string());
        self.commands.push(CanvasCommand::SetFont {
            font: font.to_string(),
        });
        Ok(())
    }

    fn set_font_size(&mut self, size: f64) -> Result<(), CanvasError> {
        if size.is_nan() || size <= 0.0 {
            return Err(CanvasError::new(format!("invalid font size {}", size)));
        }
        self.style.font_size = Some(size);
        self.commands.push(CanvasCommand::SetFontSize { size });
        Ok(())
    }

    fn set_fill_color(&mut self, color: &str) -> Result<(), CanvasError> {
        self.style.fill_color = Some(color.to_string());
        self.commands.push(CanvasCommand::SetFillColor {
            color: color.to_string(),
        });
        Ok(())
    }

    fn current_style(&self) -> Context {
        self.style.clone()
    }

    fn measure_text(&mut self, text: &str, options: &Options) -> Result<Extent, CanvasError> {
        let char_width = self.font_size() * CHAR_WIDTH_FACTOR;
        let wrap_width = options.number("width").filter(|w| *w > 0.0);

        let mut widest: f64 = 0.0;
        let mut lines = 0.0;
        for line in text.split('\n') {
            let natural = line.chars().count() as f64 * char_width;
            match wrap_width {
                Some(w) => {
                    lines += (natural / w).ceil().max(1.0);
                    widest = widest.max(natural.min(w));
                }
                None => {
                    lines += 1.0;
                    widest = widest.max(natural);
                }
            }
        }

        Ok(Extent {
            width: widest,
            height: lines * self.line_height(),
        })
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: Option<f64>,
        y: Option<f64>,
        options: &Options,
    ) -> Result<(), CanvasError> {
        let at = Point::new(x.unwrap_or(self.cursor.x), y.unwrap_or(self.cursor.y));
        let extent = self.measure_text(text, options)?;
        self.commands.push(CanvasCommand::DrawText {
            text: text.to_string(),
            at,
            options: options.clone(),
        });
        // Like pdfkit, the cursor ends up below what was drawn.
        self.cursor = Point::new(at.x, at.y + extent.height);
        Ok(())
    }

    fn open_image(&mut self, src: &str) -> Result<OpenedImage, CanvasError> {
        let extent = match self.sources.get(src) {
            Some(extent) => *extent,
            None => {
                let (w, h) = super::load_image_dimensions(src).map_err(CanvasError::new)?;
                Extent {
                    width: w as f64,
                    height: h as f64,
                }
            }
        };

        let handle = ImageHandle(format!("I{}", self.opened.len() + 1));
        self.opened.insert(handle.clone(), extent);
        self.commands.push(CanvasCommand::OpenImage {
            src: src.to_string(),
        });

        Ok(OpenedImage {
            handle,
            width: extent.width,
            height: extent.height,
        })
    }

    fn draw_image(&mut self, image: &ImageHandle, options: &Options) -> Result<(), CanvasError> {
        let extent = *self
            .opened
            .get(image)
            .ok_or_else(|| CanvasError::new(format!("unknown image handle {}", image.0)))?;
        let at = self.cursor;
        self.commands.push(CanvasCommand::DrawImage {
            handle: image.clone(),
            at,
            options: options.clone(),
        });
        self.cursor.y += options.number("height").unwrap_or(extent.height);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: &str,
    ) -> Result<(), CanvasError> {
        self.commands.push(CanvasCommand::FillRect {
            x,
            y,
            width,
            height,
            color: color.to_string(),
        });
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CanvasError> {
        self.commands.push(CanvasCommand::Line { x1, y1, x2, y2 });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Options {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn new_page_starts_at_top_left_margin() {
        let mut canvas = RecordingCanvas::new();
        canvas.new_page(None).unwrap();
        assert_eq!(canvas.cursor(), Point::new(72.0, 72.0));
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn configure_reads_pdfkit_size_and_margin() {
        let mut canvas = RecordingCanvas::new();
        canvas
            .configure(&options(json!({ "size": [400, 300], "margin": 20 })))
            .unwrap();
        canvas.new_page(None).unwrap();
        let bounds = canvas.page_bounds();
        assert_eq!((bounds.width, bounds.height), (400.0, 300.0));
        assert_eq!(bounds.content_width(), 360.0);
        assert_eq!(bounds.content_bottom(), 280.0);
        assert_eq!(canvas.cursor(), Point::new(20.0, 20.0));
    }

    #[test]
    fn page_options_override_only_that_page() {
        let mut canvas = RecordingCanvas::new();
        canvas
            .new_page(Some(&options(json!({ "size": "letter" }))))
            .unwrap();
        assert_eq!(canvas.page_bounds().width, 612.0);
        canvas.new_page(None).unwrap();
        assert_eq!(canvas.page_bounds().width, 595.28);
    }

    #[test]
    fn measure_wraps_to_width() {
        let mut canvas = RecordingCanvas::new();
        // 12pt: 6pt per char, 15pt per line
        let single = canvas.measure_text("abcd", &Options::new()).unwrap();
        assert_eq!(single, Extent { width: 24.0, height: 15.0 });

        let wrapped = canvas
            .measure_text("abcdefghij", &Options::new().with("width", 30.0))
            .unwrap();
        assert_eq!(wrapped, Extent { width: 30.0, height: 30.0 });

        let multi = canvas.measure_text("ab\ncd\nef", &Options::new()).unwrap();
        assert_eq!(multi.height, 45.0);
    }

    #[test]
    fn move_lines_uses_current_font_size() {
        let mut canvas = RecordingCanvas::new();
        canvas.new_page(None).unwrap();
        canvas.set_font_size(20.0).unwrap();
        canvas.move_lines(1.0);
        assert_eq!(canvas.cursor().y, 97.0);
        canvas.move_lines(-2.0);
        assert_eq!(canvas.cursor().y, 47.0);
    }

    #[test]
    fn draw_text_advances_cursor() {
        let mut canvas = RecordingCanvas::new();
        canvas.new_page(None).unwrap();
        canvas
            .draw_text("hello", None, None, &Options::new())
            .unwrap();
        assert_eq!(canvas.cursor(), Point::new(72.0, 87.0));
        assert_eq!(canvas.texts(), vec!["hello"]);
    }

    #[test]
    fn rejects_non_positive_font_size() {
        let mut canvas = RecordingCanvas::new();
        assert!(canvas.set_font_size(0.0).is_err());
        assert_eq!(canvas.style().font_size, Some(12.0));
    }

    #[test]
    fn unknown_image_handle_is_an_error() {
        let mut canvas = RecordingCanvas::new();
        let result = canvas.draw_image(&ImageHandle("I9".into()), &Options::new());
        assert!(result.is_err());
    }

    #[test]
    fn commands_serialize_tagged_by_op() {
        let mut canvas = RecordingCanvas::new();
        canvas.new_page(None).unwrap();
        canvas
            .draw_text("hi", Some(10.0), Some(20.0), &Options::new().with("width", 50.0))
            .unwrap();
        canvas.move_to(None, Some(40.0));

        let value = serde_json::to_value(canvas.commands()).unwrap();
        assert_eq!(
            value,
            json!([
                { "op": "newPage", "options": null },
                {
                    "op": "drawText",
                    "text": "hi",
                    "at": { "x": 10.0, "y": 20.0 },
                    "options": { "width": 50.0 }
                },
                { "op": "moveTo", "x": null, "y": 40.0 }
            ])
        );
    }

    #[test]
    fn pages_groups_commands() {
        let mut canvas = RecordingCanvas::new();
        canvas.new_page(None).unwrap();
        canvas.line(0.0, 0.0, 1.0, 1.0).unwrap();
        canvas.new_page(None).unwrap();
        let pages = canvas.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 1);
        assert!(pages[1].is_empty());
    }
}

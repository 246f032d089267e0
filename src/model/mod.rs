//! # Schema Model
//!
//! The input representation for the renderer. A schema is a list of pages,
//! each holding an ordered list of elements, plus the shared pieces every
//! page can refer to: named style contexts, named images and a page header.
//!
//! Everything here deserializes straight from the JSON schema format.
//! Stringly-typed values in that format (`"50%"`, `"auto"`, `"next-line"`)
//! are parsed into tagged values once, at deserialization time, so the
//! layout code never looks at strings again.

use std::collections::{BTreeMap, HashMap};

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete document schema ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Canvas construction options. Opaque to the renderer, handed to
    /// [`Canvas::configure`](crate::canvas::Canvas::configure).
    #[serde(default)]
    pub options: Options,

    /// Context applied before every page and every element.
    #[serde(default)]
    pub main_context: Option<ContextRef>,

    /// Named contexts that elements, rows and columns can refer to by key.
    #[serde(default)]
    pub global_contexts: HashMap<String, Context>,

    /// Named images, opened once before the first page.
    #[serde(default)]
    pub images: BTreeMap<String, String>,

    #[serde(default)]
    pub pages: Vec<Page>,

    /// Elements replayed at the start of every page.
    #[serde(default)]
    pub page_header: Vec<Element>,

    /// Whether numeric lengths in the schema are millimetres instead of points.
    #[serde(default)]
    pub mm: bool,
}

impl Schema {
    /// The unit system numeric lengths in this schema are written in.
    pub fn units(&self) -> Units {
        if self.mm {
            Units::MILLIMETRES
        } else {
            Units::POINTS
        }
    }
}

/// One page of the schema.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Page construction options, passed through to the canvas.
    #[serde(default)]
    pub options: Option<Options>,

    /// Context applied after the main context, before each element.
    #[serde(default)]
    pub context: Option<ContextRef>,
}

// ── Contexts ─────────────────────────────────────────────────────

/// A set of style directives. Unset fields leave the canvas state alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

/// A context given inline or by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContextRef {
    /// Key into `globalContexts`, or into the runtime context resolver.
    Named(String),
    Inline(Context),
}

impl From<&str> for ContextRef {
    fn from(key: &str) -> Self {
        ContextRef::Named(key.to_string())
    }
}

impl From<Context> for ContextRef {
    fn from(context: Context) -> Self {
        ContextRef::Inline(context)
    }
}

// ── Pass-through options ─────────────────────────────────────────

/// A JSON object forwarded to the canvas untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a numeric option.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Builder form of [`Options::insert`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Options(map)
    }
}

// ── Positions ────────────────────────────────────────────────────

/// Horizontal placement of an element.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum XPosition {
    /// Absolute x coordinate.
    At(f64),
    Anchor(XAnchor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XAnchor {
    Left,
    Center,
    Right,
}

/// Vertical placement of an element.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YPosition {
    /// Absolute y coordinate.
    At(f64),
    Anchor(YAnchor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YAnchor {
    Top,
    Center,
    Bottom,
    /// Advance the cursor by one line.
    NextLine,
    /// Move the cursor back by one line.
    PreviousLine,
}

// ── Elements ─────────────────────────────────────────────────────

/// A drawable item on a page.
///
/// In JSON an element is a flat object whose `type` field selects the kind.
/// `text`, `image` and `table` are built in; any other tag becomes a
/// [`CustomElement`] carrying its remaining fields verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Element {
    pub x: Option<XPosition>,
    pub y: Option<YPosition>,
    pub context: Option<ContextRef>,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Text(TextElement),
    Image(ImageElement),
    Table(TableElement),
    Custom(CustomElement),
}

impl Element {
    /// An unpositioned element without context.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            x: None,
            y: None,
            context: None,
            kind,
        }
    }

    /// An unpositioned text element.
    pub fn text(text: &str) -> Self {
        Self::new(ElementKind::Text(TextElement {
            text: text.to_string(),
            options: Options::default(),
        }))
    }

    /// The `type` tag this element was written with.
    pub fn tag(&self) -> &str {
        match &self.kind {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Table(_) => "table",
            ElementKind::Custom(custom) => &custom.tag,
        }
    }
}

impl TryFrom<Map<String, Value>> for Element {
    type Error = serde_json::Error;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let tag = match fields.remove("type") {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(serde_json::Error::custom(format!(
                    "element \"type\" must be a string, found {}",
                    other
                )))
            }
            None => return Err(serde_json::Error::missing_field("type")),
        };

        let x = take_field(&mut fields, "x")?;
        let y = take_field(&mut fields, "y")?;
        let context = take_field(&mut fields, "context")?;

        let kind = if tag == "text" {
            ElementKind::Text(serde_json::from_value(Value::Object(fields))?)
        } else if tag == "image" {
            ElementKind::Image(serde_json::from_value(Value::Object(fields))?)
        } else if tag == "table" {
            ElementKind::Table(serde_json::from_value(Value::Object(fields))?)
        } else {
            ElementKind::Custom(CustomElement { tag, fields })
        };

        Ok(Element { x, y, context, kind })
    }
}

fn take_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, serde_json::Error> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextElement {
    pub text: String,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageElement {
    /// Image source, or a key into the schema's named images.
    pub image: String,
    #[serde(default)]
    pub options: Options,
}

/// An element with a tag the renderer does not know. Handed to the
/// custom element parser.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomElement {
    pub tag: String,
    /// Every field except `type`, `x`, `y` and `context`.
    pub fields: Map<String, Value>,
}

// ── Tables ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableElement {
    /// Table width. Percentages refer to the page content width; absent
    /// means the full content width.
    #[serde(default)]
    pub width: Option<Dimension>,

    #[serde(default)]
    pub rows: Vec<Row>,

    /// Index of the row rendered first, as the header.
    #[serde(default)]
    pub header_index: Option<usize>,

    /// Replay the header on every page the table continues on.
    #[serde(default)]
    pub auto_header: bool,

    /// Continue on new pages when rows overflow. Without it, rows that do
    /// not fit are dropped.
    #[serde(default)]
    pub auto_page: bool,

    #[serde(default)]
    pub grid: GridMode,

    /// Height for rows without an explicit height.
    #[serde(default)]
    pub row_height: Option<f64>,

    #[serde(default)]
    pub padding: Option<Padding>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub height: Option<RowHeight>,
    #[serde(default)]
    pub context: Option<ContextRef>,
    #[serde(default)]
    pub padding: Option<Padding>,
    #[serde(default)]
    pub background_color: Option<String>,
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Options,
    /// Absent and `"auto"` both share the width left over by explicit columns.
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub context: Option<ContextRef>,
    #[serde(default)]
    pub padding: Option<Padding>,
    #[serde(default)]
    pub background_color: Option<String>,
}

/// Which grid lines a table draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    #[default]
    None,
    Vertical,
    Horizontal,
    Both,
    /// Vertical lines plus a single rule under the header row.
    #[serde(rename = "T")]
    Tee,
}

impl GridMode {
    /// Lines at the left edge of every cell.
    pub fn vertical_lines(self) -> bool {
        matches!(self, GridMode::Vertical | GridMode::Both | GridMode::Tee)
    }

    /// A rule under the header row.
    pub fn header_rule(self) -> bool {
        matches!(self, GridMode::Horizontal | GridMode::Both | GridMode::Tee)
    }

    /// A rule under every body row.
    pub fn row_rules(self) -> bool {
        matches!(self, GridMode::Horizontal | GridMode::Both)
    }
}

// ── Lengths ──────────────────────────────────────────────────────

/// How numeric lengths written in the schema map to points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    points_per_unit: f64,
}

impl Units {
    pub const POINTS: Units = Units {
        points_per_unit: 1.0,
    };
    pub const MILLIMETRES: Units = Units {
        points_per_unit: 72.0 / 25.4,
    };

    pub fn to_pt(self, value: f64) -> f64 {
        value * self.points_per_unit
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::POINTS
    }
}

/// A width: fixed, percentage of a reference width, or auto.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub enum Dimension {
    Fixed(f64),
    Percent(f64),
    Auto,
}

impl Dimension {
    /// Resolve against a reference width in points. `None` for Auto.
    pub fn resolve(&self, reference: f64, units: Units) -> Option<f64> {
        match self {
            Dimension::Fixed(v) => Some(units.to_pt(*v)),
            Dimension::Percent(p) => Some(reference * p / 100.0),
            Dimension::Auto => None,
        }
    }
}

/// A row height: fixed, or measured from the row's content.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub enum RowHeight {
    Fixed(f64),
    Auto,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<LengthRepr> for Dimension {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(n) => Ok(Dimension::Fixed(n)),
            LengthRepr::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("auto") {
                    return Ok(Dimension::Auto);
                }
                // Strings are percentages, with or without the sign.
                text.trim_end_matches('%')
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .map(Dimension::Percent)
                    .ok_or_else(|| {
                        format!(
                            "invalid width \"{}\": expected a number, a percentage or \"auto\"",
                            text
                        )
                    })
            }
        }
    }
}

impl TryFrom<LengthRepr> for RowHeight {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(n) => Ok(RowHeight::Fixed(n)),
            LengthRepr::Text(text) if text.trim().eq_ignore_ascii_case("auto") => {
                Ok(RowHeight::Auto)
            }
            LengthRepr::Text(text) => Err(format!(
                "invalid row height \"{}\": expected a number or \"auto\"",
                text
            )),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    fn to_pt(self, units: Units) -> Self {
        Self {
            top: units.to_pt(self.top),
            right: units.to_pt(self.right),
            bottom: units.to_pt(self.bottom),
            left: units.to_pt(self.left),
        }
    }
}

/// Cell padding: one number for every side, or an array of
/// `[all]`, `[vertical, horizontal]` or `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "PaddingRepr")]
pub struct Padding(pub Edges);

impl Padding {
    /// Padding in points.
    pub fn resolve(&self, units: Units) -> Edges {
        self.0.to_pt(units)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    Uniform(f64),
    Sides(Vec<f64>),
}

impl TryFrom<PaddingRepr> for Padding {
    type Error = String;

    fn try_from(repr: PaddingRepr) -> Result<Self, Self::Error> {
        let edges = match repr {
            PaddingRepr::Uniform(v) => Edges::uniform(v),
            PaddingRepr::Sides(sides) => match sides.as_slice() {
                [all] => Edges::uniform(*all),
                [vertical, horizontal] => Edges::symmetric(*vertical, *horizontal),
                [top, right, bottom, left] => Edges {
                    top: *top,
                    right: *right,
                    bottom: *bottom,
                    left: *left,
                },
                other => {
                    return Err(format!(
                        "padding takes 1, 2 or 4 values, got {}",
                        other.len()
                    ))
                }
            },
        };
        Ok(Padding(edges))
    }
}

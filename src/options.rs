//! # Render Options
//!
//! The two extension points a caller can plug into a render: a parser for
//! element tags the renderer does not know, and a resolver for context keys
//! missing from the schema.

use std::fmt;

use crate::canvas::Canvas;
use crate::model::{Context, Element, Schema};

/// Maximum number of times a custom element may be replaced in a row
/// before the render fails.
pub const DEFAULT_MAX_SUBSTITUTION_DEPTH: usize = 16;

/// What a custom element parser did with an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    /// Render this element in its place.
    Replace(Element),
    /// The parser drew the element itself through the canvas.
    Rendered,
    /// The parser does not handle this tag.
    Declined,
}

/// Parser for custom element tags.
pub type ElementParser<'a> = dyn FnMut(&mut dyn Canvas, &Schema, &Element) -> Substitution + 'a;

/// Resolver for context keys missing from `globalContexts`.
pub type ContextResolver<'a> = dyn FnMut(&mut dyn Canvas, &Schema, &str) -> Option<Context> + 'a;

pub struct RenderOptions<'a> {
    pub(crate) element_parser: Option<Box<ElementParser<'a>>>,
    pub(crate) context_resolver: Option<Box<ContextResolver<'a>>>,
    pub(crate) max_substitution_depth: usize,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            element_parser: None,
            context_resolver: None,
            max_substitution_depth: DEFAULT_MAX_SUBSTITUTION_DEPTH,
        }
    }
}

impl<'a> RenderOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle element tags other than text, image and table.
    pub fn with_element_parser<F>(mut self, parser: F) -> Self
    where
        F: FnMut(&mut dyn Canvas, &Schema, &Element) -> Substitution + 'a,
    {
        self.element_parser = Some(Box::new(parser));
        self
    }

    /// Resolve context keys that are not in the schema.
    pub fn with_context_resolver<F>(mut self, resolver: F) -> Self
    where
        F: FnMut(&mut dyn Canvas, &Schema, &str) -> Option<Context> + 'a,
    {
        self.context_resolver = Some(Box::new(resolver));
        self
    }

    pub fn with_max_substitution_depth(mut self, depth: usize) -> Self {
        self.max_substitution_depth = depth;
        self
    }
}

impl fmt::Debug for RenderOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("element_parser", &self.element_parser.is_some())
            .field("context_resolver", &self.context_resolver.is_some())
            .field("max_substitution_depth", &self.max_substitution_depth)
            .finish()
    }
}

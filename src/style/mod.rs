//! # Context Resolution
//!
//! Contexts are the schema's style directives: font, font size and fill
//! color. They cascade by mutation. Each applied context overwrites the
//! canvas style fields it sets and leaves the others as a broader context
//! left them, so applying the main context, then the page context, then an
//! element's own context yields the narrowest value for every field.
//!
//! Fields are always applied in the same order (font, size, fill) so a
//! canvas with order-dependent style handling sees reproducible calls.

use std::borrow::Cow;

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::model::{Context, ContextRef, Schema};
use crate::options::ContextResolver;

/// Turn a context reference into a concrete context.
///
/// Named contexts are looked up in the schema's `globalContexts` first, then
/// handed to `resolver`.
pub fn resolve<'c>(
    schema: &'c Schema,
    reference: &'c ContextRef,
    canvas: &mut dyn Canvas,
    resolver: Option<&mut ContextResolver<'_>>,
) -> Result<Cow<'c, Context>, RenderError> {
    match reference {
        ContextRef::Inline(context) => Ok(Cow::Borrowed(context)),
        ContextRef::Named(key) => {
            if let Some(context) = schema.global_contexts.get(key) {
                return Ok(Cow::Borrowed(context));
            }
            resolver
                .and_then(|resolver| resolver(canvas, schema, key.as_str()))
                .map(Cow::Owned)
                .ok_or_else(|| RenderError::ContextNotFound(key.clone()))
        }
    }
}

/// Apply every field `context` sets to the canvas style.
pub fn apply(canvas: &mut dyn Canvas, context: &Context) -> Result<(), RenderError> {
    if let Some(font) = &context.font {
        canvas.set_font(font)?;
    }
    if let Some(size) = context.font_size {
        canvas.set_font_size(size)?;
    }
    if let Some(color) = &context.fill_color {
        canvas.set_fill_color(color)?;
    }
    Ok(())
}

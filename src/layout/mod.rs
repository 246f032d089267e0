//! # Layout Engine
//!
//! Walks the schema page by page and turns every element into canvas calls.
//!
//! The engine keeps no copy of the cursor or of the current style. Both
//! live in the canvas, and every step here reads them back or changes them
//! through it. That makes order load-bearing:
//!
//! 1. Before each page: main context, then `new_page`, then the page header
//! 2. Before each element: main context, then page context
//! 3. The element: its own context, measurement, placement, drawing
//!
//! Tables run their own layout (see [`table`]) and re-enter the context
//! and coordinate resolution for every cell.
//!
//! Elements with an unknown tag go to the caller's custom element parser,
//! which may replace them with another element. Replacements are rendered
//! recursively, up to a fixed depth.

pub mod position;
pub mod table;

use std::collections::HashMap;

use log::{debug, trace};

use crate::canvas::{Canvas, OpenedImage};
use crate::error::RenderError;
use crate::model::*;
use crate::options::{RenderOptions, Substitution};
use crate::style;

/// Renders one schema onto a canvas.
pub struct LayoutEngine<'a> {
    schema: &'a Schema,
    options: RenderOptions<'a>,
    units: Units,
    /// Named images, opened once per render.
    images: HashMap<String, OpenedImage>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(schema: &'a Schema, options: RenderOptions<'a>) -> Self {
        Self {
            schema,
            options,
            units: schema.units(),
            images: HashMap::new(),
        }
    }

    /// Main entry point: render every page of the schema.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        let schema = self.schema;
        canvas.configure(&schema.options)?;
        self.open_images(canvas)?;

        for (index, page) in schema.pages.iter().enumerate() {
            debug!(
                "Rendering page {} of {} ({} elements)",
                index + 1,
                schema.pages.len(),
                page.elements.len()
            );
            self.apply_main_context(canvas)?;
            canvas.new_page(page.options.as_ref())?;

            for element in &schema.page_header {
                self.render_element(canvas, element)?;
            }

            for element in &page.elements {
                self.apply_main_context(canvas)?;
                if let Some(context) = &page.context {
                    self.apply_context(canvas, context)?;
                }
                self.render_element(canvas, element)?;
            }
        }

        Ok(())
    }

    /// Render a single element at the canvas's current state.
    pub fn render_element(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
    ) -> Result<(), RenderError> {
        self.dispatch(canvas, element, 0)
    }

    fn open_images(&mut self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        self.images.clear();
        for (key, src) in &self.schema.images {
            debug!("Opening named image \"{}\"", key);
            let opened = canvas.open_image(src)?;
            self.images.insert(key.clone(), opened);
        }
        Ok(())
    }

    fn apply_main_context(&mut self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        match &self.schema.main_context {
            Some(context) => self.apply_context(canvas, context),
            None => Ok(()),
        }
    }

    /// Resolve a context reference and apply it to the canvas style.
    fn apply_context(
        &mut self,
        canvas: &mut dyn Canvas,
        reference: &ContextRef,
    ) -> Result<(), RenderError> {
        let schema = self.schema;
        let context = style::resolve(
            schema,
            reference,
            canvas,
            self.options.context_resolver.as_deref_mut(),
        )?;
        style::apply(canvas, &context)
    }

    fn dispatch(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
        depth: usize,
    ) -> Result<(), RenderError> {
        trace!("Rendering {} element", element.tag());
        match &element.kind {
            ElementKind::Text(text) => self.render_text(canvas, element, text),
            ElementKind::Image(image) => self.render_image(canvas, element, image),
            ElementKind::Table(table) => self.render_table(canvas, element, table),
            ElementKind::Custom(custom) => self.render_custom(canvas, element, custom, depth),
        }
    }

    fn render_text(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
        text: &TextElement,
    ) -> Result<(), RenderError> {
        if let Some(context) = &element.context {
            self.apply_context(canvas, context)?;
        }

        let extent = canvas.measure_text(&text.text, &text.options)?;
        position::place(
            canvas,
            element.x.as_ref(),
            element.y.as_ref(),
            extent,
            self.units,
        );

        canvas.draw_text(&text.text, None, None, &text.options)?;
        Ok(())
    }

    fn render_image(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
        image: &ImageElement,
    ) -> Result<(), RenderError> {
        if let Some(context) = &element.context {
            self.apply_context(canvas, context)?;
        }

        let opened = match self.images.get(&image.image) {
            Some(opened) => opened.clone(),
            None => canvas.open_image(&image.image)?,
        };

        position::place(
            canvas,
            element.x.as_ref(),
            element.y.as_ref(),
            opened.extent(),
            self.units,
        );

        canvas.draw_image(&opened.handle, &image.options)?;
        Ok(())
    }

    fn render_custom(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
        custom: &CustomElement,
        depth: usize,
    ) -> Result<(), RenderError> {
        let schema = self.schema;
        let outcome = match self.options.element_parser.as_deref_mut() {
            Some(parser) => parser(canvas, schema, element),
            None => Substitution::Declined,
        };

        match outcome {
            Substitution::Replace(replacement) => {
                if depth >= self.options.max_substitution_depth {
                    return Err(RenderError::SubstitutionLimit {
                        tag: custom.tag.clone(),
                        limit: self.options.max_substitution_depth,
                    });
                }
                debug!(
                    "Custom element \"{}\" replaced by \"{}\"",
                    custom.tag,
                    replacement.tag()
                );
                self.dispatch(canvas, &replacement, depth + 1)
            }
            Substitution::Rendered => Ok(()),
            Substitution::Declined => Err(RenderError::UnsupportedElementType(custom.tag.clone())),
        }
    }
}

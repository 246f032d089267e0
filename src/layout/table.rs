//! # Table Layout
//!
//! Tables are laid out in two passes. The first plans every row up front:
//! column widths, cell paddings and the row height, which may come from
//! measuring cell text through the canvas. The second places the table and
//! draws it row by row, breaking pages as needed.
//!
//! Column widths are resolved per row. Explicit widths (points or a
//! percentage of the table width) are taken first and the auto columns
//! share what is left evenly. A row without auto columns leaves any
//! remainder empty.
//!
//! Cell padding comes from the column, else the row, else the table, else
//! [`DEFAULT_PADDING`] on every side. Row height is the row's own height,
//! else the table's `rowHeight`, else [`DEFAULT_ROW_HEIGHT`]. An `auto`
//! row is as tall as its tallest measured cell. Each cell is measured in
//! the style it will be drawn with (row context, then column context), and
//! the canvas style is put back afterwards.

use log::{debug, trace, warn};

use crate::canvas::{Canvas, Extent};
use crate::error::RenderError;
use crate::model::{Column, Dimension, Edges, Element, Row, RowHeight, TableElement, Units};

use super::{position, LayoutEngine};
use crate::style;

/// Row height when neither the row nor the table sets one, in points.
pub const DEFAULT_ROW_HEIGHT: f64 = 30.0;

/// Cell padding on every side when nothing sets one, in points.
pub const DEFAULT_PADDING: f64 = 5.0;

/// Resolved geometry of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CellPlan {
    width: f64,
    padding: Edges,
}

/// Resolved geometry of one row.
#[derive(Debug, Clone, PartialEq)]
struct RowPlan {
    cells: Vec<CellPlan>,
    height: f64,
}

/// Where the next row goes, and how wide rows are.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
}

/// Resolve the width of every column in `row`.
pub fn column_widths(row: &Row, table_width: f64, units: Units) -> Vec<f64> {
    let explicit: Vec<Option<f64>> = row
        .columns
        .iter()
        .map(|column| {
            column
                .width
                .and_then(|width| width.resolve(table_width, units))
        })
        .collect();

    let taken: f64 = explicit.iter().flatten().sum();
    let auto_count = explicit.iter().filter(|w| w.is_none()).count();
    let auto_width = if auto_count > 0 {
        ((table_width - taken) / auto_count as f64).max(0.0)
    } else {
        0.0
    };

    explicit
        .into_iter()
        .map(|width| width.unwrap_or(auto_width))
        .collect()
}

/// Resolve a cell's padding in points.
pub fn resolve_padding(table: &TableElement, row: &Row, column: &Column, units: Units) -> Edges {
    column
        .padding
        .or(row.padding)
        .or(table.padding)
        .map(|padding| padding.resolve(units))
        .unwrap_or_else(|| Edges::uniform(DEFAULT_PADDING))
}

fn table_width(table: &TableElement, content_width: f64, units: Units) -> f64 {
    let width = match table.width {
        Some(Dimension::Fixed(w)) => units.to_pt(w),
        Some(Dimension::Percent(p)) => content_width * p / 100.0,
        Some(Dimension::Auto) | None => content_width,
    };
    width.clamp(0.0, content_width.max(0.0))
}

impl LayoutEngine<'_> {
    pub(super) fn render_table(
        &mut self,
        canvas: &mut dyn Canvas,
        element: &Element,
        table: &TableElement,
    ) -> Result<(), RenderError> {
        if let Some(context) = &element.context {
            self.apply_context(canvas, context)?;
        }

        let units = self.units;
        let width = table_width(table, canvas.page_bounds().content_width(), units);

        let mut plans = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            plans.push(self.plan_row(canvas, table, row, width)?);
        }
        let total_height: f64 = plans.iter().map(|plan| plan.height).sum();

        let origin = position::place(
            canvas,
            element.x.as_ref(),
            element.y.as_ref(),
            Extent {
                width,
                height: total_height,
            },
            units,
        );
        let mut frame = Frame {
            x: origin.x,
            y: origin.y,
            width,
        };

        let header = match table.header_index {
            Some(index) if index < table.rows.len() => Some(index),
            Some(index) => {
                warn!(
                    "Table header index {} is out of range ({} rows), rendering without a header",
                    index,
                    table.rows.len()
                );
                None
            }
            None => None,
        };

        debug!(
            "Laying out table: {} rows, width {:.2}, height {:.2} at ({:.2}, {:.2})",
            table.rows.len(),
            width,
            total_height,
            frame.x,
            frame.y
        );

        if let Some(index) = header {
            self.render_header(canvas, table, index, &plans[index], &mut frame)?;
        }

        for (index, (row, plan)) in table.rows.iter().zip(&plans).enumerate() {
            if Some(index) == header {
                continue;
            }

            if frame.y + plan.height > canvas.page_bounds().content_bottom() {
                if !table.auto_page {
                    debug!(
                        "Table truncated: row {} of height {:.2} does not fit below y {:.2}",
                        index, plan.height, frame.y
                    );
                    break;
                }

                debug!("Table continues on a new page at row {}", index);
                canvas.new_page(None)?;
                frame.y = canvas.page_bounds().margins.top;

                match header {
                    Some(header) if table.auto_header => {
                        self.render_header(canvas, table, header, &plans[header], &mut frame)?;
                    }
                    _ => {}
                }
            }

            canvas.move_to(Some(frame.x), Some(frame.y));
            self.render_row(canvas, table, row, plan, &frame)?;
            frame.y += plan.height;

            if table.grid.row_rules() {
                canvas.line(frame.x, frame.y, frame.x + frame.width, frame.y)?;
            }
        }

        canvas.move_to(Some(frame.x), Some(frame.y));
        Ok(())
    }

    fn plan_row(
        &mut self,
        canvas: &mut dyn Canvas,
        table: &TableElement,
        row: &Row,
        table_width: f64,
    ) -> Result<RowPlan, RenderError> {
        let units = self.units;
        let cells: Vec<CellPlan> = column_widths(row, table_width, units)
            .into_iter()
            .zip(&row.columns)
            .map(|(width, column)| CellPlan {
                width,
                padding: resolve_padding(table, row, column, units),
            })
            .collect();

        let height = match row.height {
            Some(RowHeight::Fixed(h)) => units.to_pt(h),
            Some(RowHeight::Auto) => self.measure_row(canvas, row, &cells)?,
            None => table
                .row_height
                .map(|h| units.to_pt(h))
                .unwrap_or(DEFAULT_ROW_HEIGHT),
        };

        Ok(RowPlan { cells, height })
    }

    /// Height of the tallest cell in `row`, measured at its text width.
    fn measure_row(
        &mut self,
        canvas: &mut dyn Canvas,
        row: &Row,
        cells: &[CellPlan],
    ) -> Result<f64, RenderError> {
        let styled = row.context.is_some() || row.columns.iter().any(|c| c.context.is_some());
        let saved = styled.then(|| canvas.current_style());

        let mut tallest: f64 = 0.0;
        for (cell, column) in cells.iter().zip(&row.columns) {
            if let Some(context) = &row.context {
                self.apply_context(canvas, context)?;
            }
            if let Some(context) = &column.context {
                self.apply_context(canvas, context)?;
            }

            let text_width = (cell.width - cell.padding.horizontal()).max(0.0);
            let options = column.options.clone().with("width", text_width);
            let extent = canvas.measure_text(&column.text, &options)?;
            tallest = tallest.max(extent.height);
        }

        if let Some(saved) = saved {
            style::apply(canvas, &saved)?;
        }
        Ok(tallest)
    }

    fn render_header(
        &mut self,
        canvas: &mut dyn Canvas,
        table: &TableElement,
        index: usize,
        plan: &RowPlan,
        frame: &mut Frame,
    ) -> Result<(), RenderError> {
        canvas.move_to(Some(frame.x), Some(frame.y));
        self.render_row(canvas, table, &table.rows[index], plan, frame)?;
        frame.y += plan.height;

        if table.grid.header_rule() {
            canvas.line(frame.x, frame.y, frame.x + frame.width, frame.y)?;
        }
        Ok(())
    }

    fn render_row(
        &mut self,
        canvas: &mut dyn Canvas,
        table: &TableElement,
        row: &Row,
        plan: &RowPlan,
        frame: &Frame,
    ) -> Result<(), RenderError> {
        trace!(
            "Row at ({:.2}, {:.2}), {} columns, height {:.2}",
            frame.x,
            frame.y,
            row.columns.len(),
            plan.height
        );

        if let Some(color) = &row.background_color {
            canvas.fill_rect(frame.x, frame.y, frame.width, plan.height, color)?;
        }

        let mut x = frame.x;
        for (column, cell) in row.columns.iter().zip(&plan.cells) {
            if let Some(context) = &row.context {
                self.apply_context(canvas, context)?;
            }
            if let Some(context) = &column.context {
                self.apply_context(canvas, context)?;
            }

            if let Some(color) = &column.background_color {
                canvas.fill_rect(x, frame.y, cell.width, plan.height, color)?;
            }

            if table.grid.vertical_lines() {
                canvas.line(x, frame.y, x, frame.y + plan.height)?;
            }

            let padding = cell.padding;
            let options = column
                .options
                .clone()
                .with("width", (cell.width - padding.horizontal()).max(0.0))
                .with("height", (plan.height - padding.vertical()).max(0.0));
            canvas.draw_text(
                &column.text,
                Some(x + padding.left),
                Some(frame.y + padding.top),
                &options,
            )?;

            x += cell.width;
        }

        Ok(())
    }
}

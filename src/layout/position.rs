//! # Coordinate Resolution
//!
//! Turns an element's `x`/`y` into cursor moves. Symbolic anchors are
//! resolved against the page bounds and the element's measured extent;
//! `next-line` and `previous-line` become relative moves so the canvas can
//! apply its own line height.

use crate::canvas::{Canvas, Extent, PageBounds, Point};
use crate::model::{Units, XAnchor, XPosition, YAnchor, YPosition};

enum VerticalMove {
    Absolute(f64),
    Lines(f64),
}

/// Move the canvas cursor to where an element of size `extent` belongs.
/// Unset coordinates leave the cursor where it is. Returns the cursor
/// after the move.
pub fn place(
    canvas: &mut dyn Canvas,
    x: Option<&XPosition>,
    y: Option<&YPosition>,
    extent: Extent,
    units: Units,
) -> Point {
    let bounds = canvas.page_bounds();
    let target_x = x.map(|x| resolve_x(x, &bounds, extent, units));

    match y.map(|y| resolve_y(y, &bounds, extent, units)) {
        Some(VerticalMove::Absolute(target_y)) => canvas.move_to(target_x, Some(target_y)),
        Some(VerticalMove::Lines(lines)) => {
            if target_x.is_some() {
                canvas.move_to(target_x, None);
            }
            canvas.move_lines(lines);
        }
        None => {
            if target_x.is_some() {
                canvas.move_to(target_x, None);
            }
        }
    }

    canvas.cursor()
}

fn resolve_x(x: &XPosition, bounds: &PageBounds, extent: Extent, units: Units) -> f64 {
    match x {
        XPosition::At(v) => units.to_pt(*v),
        XPosition::Anchor(XAnchor::Left) => bounds.margins.left,
        XPosition::Anchor(XAnchor::Center) => (bounds.width - extent.width) / 2.0,
        XPosition::Anchor(XAnchor::Right) => bounds.width - extent.width,
    }
}

fn resolve_y(y: &YPosition, bounds: &PageBounds, extent: Extent, units: Units) -> VerticalMove {
    match y {
        YPosition::At(v) => VerticalMove::Absolute(units.to_pt(*v)),
        YPosition::Anchor(YAnchor::Top) => VerticalMove::Absolute(0.0),
        YPosition::Anchor(YAnchor::Center) => {
            VerticalMove::Absolute((bounds.height - extent.height) / 2.0)
        }
        YPosition::Anchor(YAnchor::Bottom) => VerticalMove::Absolute(bounds.height - extent.height),
        YPosition::Anchor(YAnchor::NextLine) => VerticalMove::Lines(1.0),
        YPosition::Anchor(YAnchor::PreviousLine) => VerticalMove::Lines(-1.0),
    }
}

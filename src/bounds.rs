//! Window bounding box derivation.
//!
//! The window must be large enough to hold every positioned element. Each
//! section contributes its right edge (`x + w`) and bottom edge (`y + h`);
//! the window is the maximum over all sections, optionally padded by a fixed
//! margin so glyph overhang and anti-aliasing are not clipped.

use crate::document::{ConfigDocument, Section};

/// Padding added to each axis by [`window_size_padded`].
pub const WINDOW_MARGIN: f64 = 10.0;

/// Exact window size: the maximal right and bottom edge over all sections.
/// Sections without usable position or extent contribute nothing.
pub fn window_size(doc: &ConfigDocument) -> (f64, f64) {
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    for (_, section) in &doc.sections {
        width = width.max(right_edge(section));
        height = height.max(bottom_edge(section));
    }
    (width, height)
}

/// Window size with [`WINDOW_MARGIN`] added to each axis.
pub fn window_size_padded(doc: &ConfigDocument) -> (f64, f64) {
    let (w, h) = window_size(doc);
    (w + WINDOW_MARGIN, h + WINDOW_MARGIN)
}

fn right_edge(section: &Section) -> f64 {
    let x = section.num("x").unwrap_or(0.0);
    let w = section
        .num("w")
        .or_else(|| section.num("width"))
        .unwrap_or(0.0);
    x + w
}

fn bottom_edge(section: &Section) -> f64 {
    let y = section.num("y").unwrap_or(0.0);
    let h = section
        .num("h")
        .or_else(|| section.num("height"))
        .unwrap_or(0.0);
    y + h
}

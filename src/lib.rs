//! A compiler from INI-style widget skin text to a resolved widget model.
//!
//! The pipeline, in order:
//!
//! 1. [`imports`] — resolve the `@import` tree into one merged raw document
//! 2. [`normalize`] — canonical keys, case mirrors, `style=` inheritance
//! 3. [`shape`] — compile `element=shape` sections through the clause grammar
//! 4. [`variables`] — substitute `#Name#` placeholders
//! 5. image backfill — measure images to fill missing `w`/`h`
//! 6. [`bounds`] — derive the window size from the positioned elements
//!
//! Only import cycles and I/O failures abort compilation; everything else
//! degrades to a [`diag::Warning`] on the returned [`diag::Diagnostics`].
//!
//! ```no_run
//! use skinc::{compile_source, NoopMeasure};
//!
//! let text = "[Box]\nelement=shape\nshape=rectangle 0,0,40,20 | fill 255,0,0\n";
//! let out = compile_source(text, std::path::Path::new("."), &NoopMeasure)?;
//! let section = out.model.document.section("Box").unwrap();
//! assert_eq!(section.get("fillcolor"), Some("#FF0000"));
//! # Ok::<(), skinc::CompileError>(())
//! ```

use std::path::Path;

use pest_derive::Parser;

pub mod bounds;
pub mod diag;
pub mod document;
pub mod errors;
pub mod extend;
pub mod imports;
pub mod log;
pub mod normalize;
mod params;
pub mod shape;
pub mod stroke;
pub mod transform;
pub mod variables;

pub use diag::{Diagnostics, Warning};
pub use document::{ConfigDocument, Section};
pub use errors::CompileError;
pub use shape::{Shape, ShapeElement};

#[cfg(feature = "tracing")]
use crate::log::debug;

#[derive(Parser)]
#[grammar = "skin.pest"]
pub(crate) struct SkinParser;

/// Intrinsic pixel size of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Measures image files so `element=image` sections without explicit extents
/// can be backfilled. Implementations return `None` when a file cannot be
/// measured.
pub trait ImageMeasure {
    fn measure(&self, path: &Path) -> Option<ImageSize>;
}

/// An [`ImageMeasure`] that measures nothing. Every image section without
/// explicit extents gets a measurement warning.
pub struct NoopMeasure;

impl ImageMeasure for NoopMeasure {
    fn measure(&self, _path: &Path) -> Option<ImageSize> {
        None
    }
}

/// The fully resolved widget model.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetModel {
    /// Sections in z-order, keys normalized, shapes compiled.
    pub document: ConfigDocument,
    /// Exact window size, `(width, height)`.
    pub window: (f64, f64),
    /// Window size padded by [`bounds::WINDOW_MARGIN`] per axis.
    pub window_padded: (f64, f64),
}

/// A compiled model together with the warnings produced along the way.
#[derive(Debug)]
pub struct CompileOutput {
    pub model: WidgetModel,
    pub diagnostics: Diagnostics,
}

/// Compile a skin file and its whole import tree.
pub fn compile_file(
    path: &Path,
    measure: &dyn ImageMeasure,
) -> Result<CompileOutput, CompileError> {
    let raw = imports::merge_file(path)?;
    Ok(compile_raw(raw, measure))
}

/// Compile in-memory skin text; imports and image paths resolve relative to
/// `base_dir`.
pub fn compile_source(
    text: &str,
    base_dir: &Path,
    measure: &dyn ImageMeasure,
) -> Result<CompileOutput, CompileError> {
    let raw = imports::merge_source(text, base_dir)?;
    Ok(compile_raw(raw, measure))
}

fn compile_raw(raw: imports::RawDocument, measure: &dyn ImageMeasure) -> CompileOutput {
    let mut doc = ConfigDocument {
        sections: raw
            .sections
            .into_iter()
            .map(|(name, values)| (name, Section::from_values(values)))
            .collect(),
        base_dir: raw.base_dir,
    };
    let mut diags = Diagnostics::new();

    normalize::normalize(&mut doc, &mut diags);
    shape::compile_document(&mut doc, &mut diags);
    variables::substitute(&mut doc);
    measure_images(&mut doc, measure, &mut diags);

    let window = bounds::window_size(&doc);
    let window_padded = bounds::window_size_padded(&doc);
    debug!(
        "compiled {} section(s), window {}x{}",
        doc.sections.len(),
        window.0,
        window.1
    );

    CompileOutput {
        model: WidgetModel {
            document: doc,
            window,
            window_padded,
        },
        diagnostics: diags,
    }
}

/// Backfill `w`/`h` on `element=image` sections from the image file itself.
/// Explicit extents always win; measurement only fills what is missing.
fn measure_images(doc: &mut ConfigDocument, measure: &dyn ImageMeasure, diags: &mut Diagnostics) {
    let base_dir = doc.base_dir.clone();
    for (name, section) in doc.sections.iter_mut() {
        let is_image = section
            .get("element")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("image"));
        if !is_image {
            continue;
        }
        let needs_w = section.num("w").is_none();
        let needs_h = section.num("h").is_none();
        if !needs_w && !needs_h {
            continue;
        }
        let Some(path) = section
            .get_ci("imagename")
            .or_else(|| section.get_ci("source"))
            .map(str::to_string)
        else {
            continue;
        };
        let full = if Path::new(&path).is_absolute() {
            path.clone().into()
        } else {
            base_dir.join(&path)
        };
        match measure.measure(&full) {
            Some(size) => {
                if needs_w {
                    section.set("w", size.width.to_string());
                    section.set("W", size.width.to_string());
                }
                if needs_h {
                    section.set("h", size.height.to_string());
                    section.set("H", size.height.to_string());
                }
            }
            None => diags.warn(Warning::ImageMeasurementFailure {
                section: name.clone(),
                path,
            }),
        }
    }
}

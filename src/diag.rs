//! Recoverable-anomaly reporting.
//!
//! Shape, style, and extend anomalies never abort a compilation; they skip
//! the offending unit and keep processing siblings. Each one is recorded
//! here as a typed [`Warning`] so callers (and tests) can observe exactly
//! what degraded, instead of scraping a process-wide log.

use std::fmt;

use crate::log::warn;

/// One recoverable anomaly encountered during compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Unsupported shape type or unparsable coordinate clause; the shape was
    /// dropped and the element continued with its remaining shapes.
    MalformedShapeDefinition { section: String, detail: String },
    /// Unrecognized key or value in a shape style clause; the token was ignored.
    UnknownStyleToken { section: String, token: String },
    /// `style=` referenced a section that does not exist; inheritance skipped.
    MissingStyleReference { section: String, reference: String },
    /// An `Extend` clause referenced a property that does not exist on the
    /// owning section; the splice was skipped.
    MissingExtendReference { section: String, reference: String },
    /// A shape element had no shape definition that parsed; the element was
    /// dropped from the document.
    EmptyShapeElement { section: String },
    /// An image element is missing `w`/`h` and the measurement collaborator
    /// could not supply them; the element keeps its authored dimensions.
    ImageMeasurementFailure { section: String, path: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MalformedShapeDefinition { section, detail } => {
                write!(f, "[{section}] malformed shape definition: {detail}")
            }
            Warning::UnknownStyleToken { section, token } => {
                write!(f, "[{section}] unknown style token: {token}")
            }
            Warning::MissingStyleReference { section, reference } => {
                write!(f, "[{section}] style references missing section {reference}")
            }
            Warning::MissingExtendReference { section, reference } => {
                write!(f, "[{section}] extend references missing property {reference}")
            }
            Warning::EmptyShapeElement { section } => {
                write!(f, "[{section}] no shape definition parsed; element dropped")
            }
            Warning::ImageMeasurementFailure { section, path } => {
                write!(f, "[{section}] could not measure image {path}")
            }
        }
    }
}

/// Ordered collection of warnings produced by one compilation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning (and emit it via `tracing` when enabled).
    pub fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}

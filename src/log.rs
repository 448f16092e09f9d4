//! Logging shims for the compile pipeline.
//!
//! The pipeline logs at exactly two levels: `debug!` traces progress
//! (import resolution, shape counts, window size) and `warn!` mirrors every
//! warning recorded on [`crate::diag::Diagnostics`]. With the `tracing`
//! feature on, both forward to the `tracing` macros; off, they compile to
//! nothing, so the default build carries no logging dependency.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, warn};

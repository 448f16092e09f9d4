//! Fatal error types with rich diagnostics using miette
//!
//! Only two things abort a compilation: import cycles and I/O failures.
//! Everything else degrades gracefully and is reported through
//! [`crate::diag::Diagnostics`].

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors that abort the whole compilation.
#[derive(Error, Diagnostic, Debug)]
pub enum CompileError {
    /// An `@import` chain came back around to a file already being resolved.
    ///
    /// The span points at the `@import` line that closes the cycle, inside
    /// the file that declared it.
    #[error("circular import of {path}")]
    #[diagnostic(
        code(skinc::import::circular),
        help("remove the @import line that closes the cycle")
    )]
    CircularImport {
        /// Canonical path of the re-imported file
        path: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this import closes a cycle")]
        span: SourceSpan,
    },

    /// A skin file or one of its imports could not be read.
    #[error("failed to read skin file {path}")]
    #[diagnostic(code(skinc::import::read))]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

//! Error taxonomy shared by all components
//!
//! Component errors stay local (`TemplateError`, `ConvertError`, ...) and
//! classify themselves into an [`ErrorKind`], which the HTTP layer and the CLI
//! map onto status codes and exit codes.

use std::fmt;

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing request fields, bad file extension
    InvalidInput,
    /// Manifest, template, user template or referenced file missing
    NotFound,
    /// Converter binary absent or cannot be made executable
    ExternalToolUnavailable,
    /// Converter process failed
    ConversionFailed,
    /// Unexpected I/O or parse failure
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::NotFound => "not found",
            ErrorKind::ExternalToolUnavailable => "external tool unavailable",
            ErrorKind::ConversionFailed => "conversion failed",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

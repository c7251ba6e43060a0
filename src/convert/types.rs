//! Common types for the convert module

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::error::ErrorKind;

/// MIME type of the produced Word document
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Target format passed to the converter
pub const TARGET_FORMAT: &str = "docx";

/// Source format passed to the converter
pub const SOURCE_FORMAT: &str = "markdown";

// ============================================================
// Error Types
// ============================================================

/// Conversion error types
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Converter not available at {path}: {reason}")]
    ToolUnavailable { path: PathBuf, reason: String },

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConvertError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::ToolUnavailable { .. } => ErrorKind::ExternalToolUnavailable,
            ConvertError::ConversionFailed(_) | ConvertError::Timeout(_) => {
                ErrorKind::ConversionFailed
            }
            ConvertError::IoError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

// ============================================================
// Probe
// ============================================================

/// Converter availability as reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub executable: bool,
}

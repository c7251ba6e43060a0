//! Common types for the templates module

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::ErrorKind;

// ============================================================
// Constants
// ============================================================

/// Manifest file name inside the templates directory
pub const MANIFEST_FILE: &str = "index.json";

/// Template identifier that selects the uploaded user template
pub const CUSTOM_TEMPLATE_ID: &str = "__custom__";

/// Description reported for the uploaded user template
pub const CUSTOM_TEMPLATE_DESCRIPTION: &str = "Custom Template";

/// Accepted reference document extensions (lowercase, without dot)
pub const ACCEPTED_EXTENSIONS: &[&str] = &["docx", "doc"];

// ============================================================
// Error Types
// ============================================================

/// Template lookup and storage error types
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Templates not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid template manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    #[error("Template not found: {0}")]
    UnknownTemplate(String),

    #[error("Template file missing: {0}")]
    FileMissing(PathBuf),

    #[error("No custom template found")]
    NoUserTemplate,

    #[error("No file selected")]
    MissingFile,

    #[error("Only .docx and .doc files are allowed, got {0:?}")]
    InvalidExtension(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TemplateError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::ManifestNotFound(_)
            | TemplateError::UnknownTemplate(_)
            | TemplateError::FileMissing(_)
            | TemplateError::NoUserTemplate => ErrorKind::NotFound,
            TemplateError::MissingFile | TemplateError::InvalidExtension(_) => {
                ErrorKind::InvalidInput
            }
            TemplateError::ManifestParse(_) | TemplateError::IoError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;

// ============================================================
// Core Data Structures
// ============================================================

/// One entry of the manifest as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub description: String,
}

/// Built-in template as exposed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    /// Filename without extension
    pub id: String,
    pub filename: String,
    pub description: String,
}

impl From<ManifestEntry> for TemplateDescriptor {
    fn from(entry: ManifestEntry) -> Self {
        Self {
            id: template_id(&entry.filename),
            filename: entry.filename,
            description: entry.description,
        }
    }
}

/// A template resolved to a reference document on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Absolute path of the reference document
    pub path: PathBuf,
    /// Human-readable label, also used as the download name
    pub description: String,
}

/// Derive a template id from a manifest filename
pub fn template_id(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension if it is an accepted reference document type
pub fn accepted_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

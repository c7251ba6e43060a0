//! Conversion module
//!
//! Runs the external Markdown-to-Word converter for one request at a time.
//! Each call allocates a [`ConversionJob`] with unique temp paths; the job
//! removes its files when dropped.

mod invoker;
mod job;
mod types;

// Re-export public API
pub use invoker::Converter;
pub use job::{ConversionJob, JobState};
pub use types::{ConvertError, ConverterStatus, DOCX_MIME, SOURCE_FORMAT, TARGET_FORMAT};

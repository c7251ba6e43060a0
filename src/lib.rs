//! md2docx - Markdown to Word conversion service
//!
//! Accepts Markdown over HTTP, runs an external converter (pandoc) with a
//! template as the reference document and returns the produced `.docx`.
//!
//! # Modules
//!
//! - [`templates`] - built-in template manifest and the uploaded user template
//! - [`convert`] - converter invocation with per-request temp file cleanup
//! - [`web`] - REST API and static frontend server
//! - [`config`] - defaults, config file and CLI overrides
//!
//! # Example
//!
//! ```no_run
//! use md2docx::{Config, CliOverrides, WebServer};
//!
//! # async fn run() -> Result<(), md2docx::ServerError> {
//! let settings = Config::load().unwrap_or_default().merge_with_cli(&CliOverrides::new());
//! WebServer::new(&settings).run().await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod templates;
pub mod web;

pub use cli::{exit_codes, Cli, Commands, ConvertArgs, FrontendArgs, PathArgs, ServeArgs};
pub use config::{CliOverrides, Config, ConfigError, Settings};
pub use convert::{ConversionJob, ConvertError, Converter, ConverterStatus, JobState, DOCX_MIME};
pub use error::ErrorKind;
pub use templates::{
    ResolvedTemplate, TemplateDescriptor, TemplateError, TemplateRegistry, UserTemplateStore,
    CUSTOM_TEMPLATE_ID,
};
pub use web::{
    build_router, AppState, CorsConfig, FrontendConfig, FrontendServer, ServerConfig, ServerError,
    WebServer,
};

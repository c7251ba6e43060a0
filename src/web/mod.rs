//! Web server module for md2docx
//!
//! Provides the REST API for Markdown conversion and a static server for the
//! browser frontend.
//!
//! # Endpoints
//!
//! - `GET  /api/health` - status and converter probe
//! - `GET  /api/templates` - built-in templates from the manifest
//! - `POST /api/upload-template` - replace the user template (multipart field `template`)
//! - `POST /api/convert` - `{markdown, template_id}` to a `.docx` attachment
//!
//! # Usage
//!
//! ```bash
//! md2docx serve --port 8081
//! md2docx frontend --dir frontend --port 5500
//! ```

mod cors;
mod error;
mod frontend;
mod routes;
mod server;
mod shutdown;

pub use cors::CorsConfig;
pub use error::AppError;
pub use frontend::{FrontendConfig, FrontendServer};
pub use routes::{
    api_routes, content_disposition, AppState, ConvertRequest, HealthResponse, UploadResponse,
    UPLOAD_FIELD,
};
pub use server::{build_router, ServerConfig, ServerError, WebServer};
pub use shutdown::wait_for_shutdown_signal;

/// Default API server port
pub const DEFAULT_PORT: u16 = 8081;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default request body limit in bytes (25 MiB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

/// Default frontend server port
pub const DEFAULT_FRONTEND_PORT: u16 = 5500;

/// Default frontend directory
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";

//! Web server implementation
//!
//! Provides the API server struct and configuration.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::cors::CorsConfig;
use super::routes::{api_routes, AppState};
use super::shutdown::wait_for_shutdown_signal;
use super::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_UPLOAD_LIMIT};
use crate::config::Settings;

/// Server startup/runtime error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    #[error("Frontend directory not found: {0}")]
    FrontendDirMissing(std::path::PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind to
    pub bind: String,
    /// Maximum request body size in bytes
    pub upload_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new server config with the given bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Create a new server config with the given upload limit
    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Build the full application router
///
/// Oversized bodies are rejected by the limit layer with 413 before any
/// handler runs.
pub fn build_router(state: Arc<AppState>, upload_limit: usize, cors: CorsConfig) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .layer(cors.into_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API server instance
pub struct WebServer {
    config: ServerConfig,
    cors: CorsConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a server from resolved settings
    pub fn new(settings: &Settings) -> Self {
        Self {
            config: settings.server.clone(),
            cors: settings.cors.clone(),
            state: Arc::new(AppState::from_settings(settings)),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared handler state
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        build_router(
            self.state.clone(),
            self.config.upload_limit,
            self.cors.clone(),
        )
    }

    /// Run the server until SIGINT/SIGTERM
    pub async fn run(&self) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let router = self.build_router();

        let probe = self.state.converter.probe();
        if !probe.executable {
            tracing::warn!(
                converter = %probe.path.display(),
                exists = probe.exists,
                "converter is not ready; conversions will fail until it is installed"
            );
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "API server listening");
        tracing::info!("  GET  /api/health           - Health check");
        tracing::info!("  GET  /api/templates        - List templates");
        tracing::info!("  POST /api/upload-template  - Upload custom template");
        tracing::info!("  POST /api/convert          - Convert Markdown to DOCX");

        axum::serve(listener, router)
            .with_graceful_shutdown(wait_for_shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8081);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.upload_limit, 25 * 1024 * 1024);
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default()
            .with_port(3000)
            .with_bind("0.0.0.0")
            .with_upload_limit(10 * 1024 * 1024);

        assert_eq!(config.port, 3000);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.upload_limit, 10 * 1024 * 1024);
    }

    #[test]
    fn test_server_config_socket_addr() {
        let config = ServerConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8081);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn test_server_config_bad_addr() {
        let config = ServerConfig::default().with_bind("not an address");
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_web_server_new() {
        let settings = Settings::default();
        let server = WebServer::new(&settings);
        assert_eq!(server.config().port, 8081);
        assert!(!server.state().version.is_empty());
    }
}

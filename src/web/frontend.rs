//! Static file server for the browser frontend
//!
//! Serves a directory tree verbatim on its own port. It has no knowledge of
//! the API beyond being a separate origin.

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::server::ServerError;
use super::shutdown::wait_for_shutdown_signal;
use super::{DEFAULT_BIND, DEFAULT_FRONTEND_DIR, DEFAULT_FRONTEND_PORT};

/// Frontend server configuration
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Directory to serve
    pub dir: PathBuf,
    /// Address to bind to
    pub bind: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_FRONTEND_PORT,
        }
    }
}

impl FrontendConfig {
    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Static frontend server
#[derive(Debug)]
pub struct FrontendServer {
    config: FrontendConfig,
}

impl FrontendServer {
    /// Create the server; fails if the directory does not exist
    pub fn new(config: FrontendConfig) -> Result<Self, ServerError> {
        if !config.dir.is_dir() {
            return Err(ServerError::FrontendDirMissing(config.dir));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Router serving the directory, with `index.html` for directories
    pub fn build_router(&self) -> Router {
        Router::new()
            .fallback_service(ServeDir::new(&self.config.dir).append_index_html_on_directories(true))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until SIGINT/SIGTERM
    pub async fn run(&self) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            %addr,
            dir = %self.config.dir.display(),
            "frontend server listening"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(wait_for_shutdown_signal())
            .await?;

        tracing::info!("frontend server stopped");
        Ok(())
    }
}

//! Configuration file support
//!
//! Settings come from three layers, lowest precedence first: built-in
//! defaults, a TOML config file, then command-line flags / environment
//! variables. The merged [`Settings`] is built once at startup and handed to
//! every component.
//!
//! # Config file search order
//!
//! 1. `--config <path>` (errors are fatal)
//! 2. `./md2docx.toml`
//! 3. `<user config dir>/md2docx/config.toml`
//!
//! # Example
//!
//! ```toml
//! templates_dir = "templates"
//! user_templates_dir = "user-templates"
//! converter = "pandoc/pandoc"
//! convert_timeout_secs = 300
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 8081
//! upload_limit_mb = 25
//!
//! [frontend]
//! dir = "frontend"
//! port = 5500
//!
//! [cors]
//! allowed_origins = ["http://localhost:5500"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::web::{CorsConfig, FrontendConfig, ServerConfig};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "md2docx.toml";

/// Default templates directory
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Default user template directory
pub const DEFAULT_USER_TEMPLATES_DIR: &str = "user-templates";

/// Default converter subprocess timeout in seconds
pub const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 300;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// `[server]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upload_limit_mb: Option<usize>,
}

/// `[frontend]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendSection {
    pub dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// `[cors]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    /// Empty or absent allows any origin
    pub allowed_origins: Option<Vec<String>>,
}

/// Contents of a config file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub templates_dir: Option<PathBuf>,
    pub user_templates_dir: Option<PathBuf>,
    pub converter: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    /// 0 disables the timeout
    pub convert_timeout_secs: Option<u64>,
    pub server: ServerSection,
    pub frontend: FrontendSection,
    pub cors: CorsSection,
}

impl Config {
    /// Candidate config file locations, in search order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("md2docx").join("config.toml"));
        }
        paths
    }

    /// Load the first config file found, or defaults if there is none
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading config file");
                return Self::load_from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load a config file from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merge with CLI overrides (CLI takes precedence) into final settings
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> Settings {
        let server_defaults = ServerConfig::default();
        let frontend_defaults = FrontendConfig::default();

        let timeout_secs = cli
            .convert_timeout_secs
            .or(self.convert_timeout_secs)
            .unwrap_or(DEFAULT_CONVERT_TIMEOUT_SECS);

        let converter = cli
            .converter
            .clone()
            .or_else(|| self.converter.clone())
            .unwrap_or_else(default_converter_path);

        let server = ServerConfig::default()
            .with_bind(
                cli.bind
                    .clone()
                    .or_else(|| self.server.bind.clone())
                    .unwrap_or(server_defaults.bind),
            )
            .with_port(cli.port.or(self.server.port).unwrap_or(server_defaults.port))
            .with_upload_limit(
                cli.upload_limit_mb
                    .or(self.server.upload_limit_mb)
                    .map(|mb| mb.saturating_mul(1024 * 1024))
                    .unwrap_or(server_defaults.upload_limit),
            );

        let frontend = FrontendConfig {
            dir: cli
                .frontend_dir
                .clone()
                .or_else(|| self.frontend.dir.clone())
                .unwrap_or(frontend_defaults.dir),
            bind: cli
                .frontend_bind
                .clone()
                .or_else(|| self.frontend.bind.clone())
                .unwrap_or(frontend_defaults.bind),
            port: cli
                .frontend_port
                .or(self.frontend.port)
                .unwrap_or(frontend_defaults.port),
        };

        let origins = if cli.cors_origins.is_empty() {
            self.cors.allowed_origins.clone().unwrap_or_default()
        } else {
            cli.cors_origins.clone()
        };
        let cors = if origins.is_empty() {
            CorsConfig::default()
        } else {
            CorsConfig::strict(origins)
        };

        Settings {
            templates_dir: cli
                .templates_dir
                .clone()
                .or_else(|| self.templates_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_DIR)),
            user_templates_dir: cli
                .user_templates_dir
                .clone()
                .or_else(|| self.user_templates_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_USER_TEMPLATES_DIR)),
            converter_path: resolve_converter(converter),
            temp_dir: cli
                .temp_dir
                .clone()
                .or_else(|| self.temp_dir.clone())
                .unwrap_or_else(std::env::temp_dir),
            convert_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            server,
            frontend,
            cors,
        }
    }
}

/// Values given on the command line; `None` defers to the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub templates_dir: Option<PathBuf>,
    pub user_templates_dir: Option<PathBuf>,
    pub converter: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub convert_timeout_secs: Option<u64>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upload_limit_mb: Option<usize>,
    pub frontend_dir: Option<PathBuf>,
    pub frontend_bind: Option<String>,
    pub frontend_port: Option<u16>,
    pub cors_origins: Vec<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `index.json` and the built-in templates
    pub templates_dir: PathBuf,
    /// Directory holding the uploaded user template
    pub user_templates_dir: PathBuf,
    /// Converter executable
    pub converter_path: PathBuf,
    /// Directory for per-request conversion artifacts
    pub temp_dir: PathBuf,
    /// Converter timeout; `None` waits indefinitely
    pub convert_timeout: Option<Duration>,
    pub server: ServerConfig,
    pub frontend: FrontendConfig,
    pub cors: CorsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().merge_with_cli(&CliOverrides::default())
    }
}

/// `pandoc/pandoc` relative to the working directory
pub fn default_converter_path() -> PathBuf {
    let binary = if cfg!(windows) { "pandoc.exe" } else { "pandoc" };
    PathBuf::from("pandoc").join(binary)
}

/// Look up bare command names on `PATH`; paths are kept as given
fn resolve_converter(path: PathBuf) -> PathBuf {
    let is_bare_name = path.components().count() == 1 && !path.exists();
    if !is_bare_name {
        return path;
    }
    match which::which(&path) {
        Ok(found) => {
            tracing::debug!(converter = %found.display(), "resolved converter on PATH");
            found
        }
        Err(_) => path,
    }
}

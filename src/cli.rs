//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::logging::LogFormat;

/// Process exit codes
pub mod exit_codes {
    use crate::error::ErrorKind;

    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
    pub const CONVERTER_UNAVAILABLE: i32 = 4;

    /// Exit code for a classified failure
    pub fn for_kind(kind: ErrorKind) -> i32 {
        match kind {
            ErrorKind::InvalidInput => INVALID_ARGS,
            ErrorKind::NotFound => INPUT_NOT_FOUND,
            ErrorKind::ExternalToolUnavailable => CONVERTER_UNAVAILABLE,
            ErrorKind::ConversionFailed | ErrorKind::Internal => GENERAL_ERROR,
        }
    }
}

/// Markdown to Word conversion service
#[derive(Debug, Parser)]
#[command(name = "md2docx", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Config file (default: ./md2docx.toml, then the user config dir)
    #[arg(short, long, global = true, env = "MD2DOCX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the conversion API server
    Serve(ServeArgs),
    /// Serve the static frontend directory
    Frontend(FrontendArgs),
    /// Convert a Markdown file locally
    Convert(ConvertArgs),
    /// List built-in templates
    Templates(PathArgs),
    /// Show resolved configuration and converter status
    Info(PathArgs),
}

/// Filesystem and converter locations shared by several subcommands
#[derive(Debug, Clone, Default, Args)]
pub struct PathArgs {
    /// Directory containing index.json and the built-in templates
    #[arg(long, env = "MD2DOCX_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Directory holding the uploaded user template
    #[arg(long, env = "MD2DOCX_USER_TEMPLATES_DIR")]
    pub user_templates_dir: Option<PathBuf>,

    /// Converter executable (path, or a command name looked up on PATH)
    #[arg(long, env = "MD2DOCX_CONVERTER")]
    pub converter: Option<PathBuf>,

    /// Directory for temporary conversion files
    #[arg(long, env = "MD2DOCX_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Converter timeout in seconds (0 = no timeout)
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl PathArgs {
    fn apply(&self, overrides: &mut CliOverrides) {
        overrides.templates_dir = self.templates_dir.clone();
        overrides.user_templates_dir = self.user_templates_dir.clone();
        overrides.converter = self.converter.clone();
        overrides.temp_dir = self.temp_dir.clone();
        overrides.convert_timeout_secs = self.timeout;
    }

    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides::new();
        self.apply(&mut overrides);
        overrides
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Address to bind to
    #[arg(long, env = "MD2DOCX_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MD2DOCX_PORT")]
    pub port: Option<u16>,

    /// Maximum request body size in MiB
    #[arg(long)]
    pub upload_limit: Option<usize>,

    /// Allowed CORS origin (repeatable; default allows any origin)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl ServeArgs {
    pub fn overrides(&self) -> CliOverrides {
        let mut overrides = self.paths.overrides();
        overrides.bind = self.bind.clone();
        overrides.port = self.port;
        overrides.upload_limit_mb = self.upload_limit;
        overrides.cors_origins = self.cors_origins.clone();
        overrides
    }
}

#[derive(Debug, Clone, Args)]
pub struct FrontendArgs {
    /// Directory to serve
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl FrontendArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            frontend_dir: self.dir.clone(),
            frontend_bind: self.bind.clone(),
            frontend_port: self.port,
            ..CliOverrides::new()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Markdown input file
    pub input: PathBuf,

    /// Template id from the manifest (or __custom__ for the uploaded template)
    #[arg(short, long, required_unless_present = "reference", conflicts_with = "reference")]
    pub template: Option<String>,

    /// Use this reference document directly instead of a template id
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Output file (default: input with .docx extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub paths: PathArgs,
}

impl ConvertArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("docx"))
    }
}

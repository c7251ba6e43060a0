//! md2docx - Markdown to Word conversion service
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use md2docx::{
    exit_codes, logging, templates, CliOverrides, Cli, Commands, Config, ConvertArgs,
    ConvertError, Converter, ErrorKind, FrontendServer, PathArgs, Settings,
    TemplateError, TemplateRegistry, UserTemplateStore, WebServer,
};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_format) {
        eprintln!("Warning: {}", e);
    }

    let result = match &cli.command {
        Commands::Serve(args) => run_serve(&cli, args.overrides()),
        Commands::Frontend(args) => run_frontend(&cli, args.overrides()),
        Commands::Convert(args) => run_convert(&cli, args),
        Commands::Templates(args) => run_templates(&cli, args),
        Commands::Info(args) => run_info(&cli, args),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error_kind(&e).map_or(exit_codes::GENERAL_ERROR, exit_codes::for_kind)
        }
    });
}

fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<TemplateError>() {
        return Some(e.kind());
    }
    if let Some(e) = err.downcast_ref::<ConvertError>() {
        return Some(e.kind());
    }
    None
}

/// Merge the config file with CLI overrides
///
/// An explicit `--config` must load; otherwise a broken config file only
/// produces a warning.
fn load_settings(cli: &Cli, overrides: &CliOverrides) -> anyhow::Result<Settings> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config file, using defaults");
            Config::default()
        }),
    };
    Ok(config.merge_with_cli(overrides))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

// ============ Serve Command ============

fn run_serve(cli: &Cli, overrides: CliOverrides) -> anyhow::Result<()> {
    let settings = load_settings(cli, &overrides)?;
    tracing::info!(
        templates_dir = %settings.templates_dir.display(),
        user_templates_dir = %settings.user_templates_dir.display(),
        converter = %settings.converter_path.display(),
        timeout_secs = settings.convert_timeout.map(|t| t.as_secs()),
        "starting API server"
    );

    runtime()?.block_on(async {
        let server = WebServer::new(&settings);
        server.run().await
    })?;
    Ok(())
}

// ============ Frontend Command ============

fn run_frontend(cli: &Cli, overrides: CliOverrides) -> anyhow::Result<()> {
    let settings = load_settings(cli, &overrides)?;
    let server = FrontendServer::new(settings.frontend)?;

    runtime()?.block_on(async { server.run().await })?;
    Ok(())
}

// ============ Convert Command ============

fn run_convert(cli: &Cli, args: &ConvertArgs) -> anyhow::Result<()> {
    let settings = load_settings(cli, &args.paths.overrides())?;

    if !args.input.is_file() {
        eprintln!("Error: Input file does not exist: {}", args.input.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }
    let markdown = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    if markdown.is_empty() {
        eprintln!("Error: Input file is empty: {}", args.input.display());
        std::process::exit(exit_codes::INVALID_ARGS);
    }

    let reference = match (&args.reference, &args.template) {
        (Some(path), _) => {
            if !path.is_file() {
                return Err(TemplateError::FileMissing(path.clone()).into());
            }
            path.clone()
        }
        (None, Some(id)) => {
            let registry = TemplateRegistry::new(&settings.templates_dir);
            let store = UserTemplateStore::new(&settings.user_templates_dir);
            templates::resolve(&registry, &store, id)?.path
        }
        (None, None) => anyhow::bail!("either --template or --reference is required"),
    };

    let converter = Converter::new(&settings.converter_path, &settings.temp_dir)
        .with_timeout(settings.convert_timeout);
    let output = args.output_path();

    runtime()?.block_on(async {
        let mut job = converter.convert(&markdown, &reference).await?;
        let copied = tokio::fs::copy(job.output_path(), &output).await;
        job.cleanup_async().await;
        copied.with_context(|| format!("failed to write {}", output.display()))?;
        anyhow::Ok(())
    })?;

    println!("Wrote {}", output.display());
    Ok(())
}

// ============ Templates Command ============

fn run_templates(cli: &Cli, args: &PathArgs) -> anyhow::Result<()> {
    let settings = load_settings(cli, &args.overrides())?;
    let registry = TemplateRegistry::new(&settings.templates_dir);
    let templates = registry.list()?;

    if templates.is_empty() {
        println!("No templates in {}", registry.manifest_path().display());
        return Ok(());
    }

    let width = templates.iter().map(|t| t.id.len()).max().unwrap_or(0);
    for template in templates {
        println!(
            "{:width$}  {}  ({})",
            template.id,
            template.description,
            template.filename,
            width = width
        );
    }
    Ok(())
}

// ============ Info Command ============

fn run_info(cli: &Cli, args: &PathArgs) -> anyhow::Result<()> {
    let settings = load_settings(cli, &args.overrides())?;

    println!("md2docx v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Converter:");
    let converter = Converter::new(&settings.converter_path, &settings.temp_dir);
    let status = converter.probe();
    println!("  Path:       {}", status.path.display());
    println!("  Exists:     {}", if status.exists { "yes" } else { "no" });
    println!("  Executable: {}", if status.executable { "yes" } else { "no" });
    match settings.convert_timeout {
        Some(timeout) => println!("  Timeout:    {}s", timeout.as_secs()),
        None => println!("  Timeout:    none"),
    }

    println!();
    println!("Templates:");
    let registry = TemplateRegistry::new(&settings.templates_dir);
    println!("  Manifest:   {}", registry.manifest_path().display());
    match registry.list() {
        Ok(templates) => println!("  Entries:    {}", templates.len()),
        Err(e) => println!("  Entries:    unavailable ({})", e),
    }
    let store = UserTemplateStore::new(&settings.user_templates_dir);
    match store.resolve_custom() {
        Ok(custom) => println!("  Custom:     {}", custom.path.display()),
        Err(_) => println!("  Custom:     none ({})", store.dir().display()),
    }

    println!();
    println!("Servers:");
    println!("  API:        http://{}:{}", settings.server.bind, settings.server.port);
    println!(
        "  Frontend:   http://{}:{} ({})",
        settings.frontend.bind,
        settings.frontend.port,
        settings.frontend.dir.display()
    );
    println!("  Temp dir:   {}", settings.temp_dir.display());

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        let marker = if path.is_file() { " (found)" } else { "" };
        println!("  {}{}", path.display(), marker);
    }

    Ok(())
}

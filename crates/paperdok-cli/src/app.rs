//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paperdok_core::{GenerationError, Generator, OutputFormat, PaperdokConfig, CONFIG_FILE};
use paperdok_model::{DocumentBuilder, LAYOUT};
use paperdok_service::{ConversionClient, ServiceConfig};

#[derive(Parser)]
#[command(name = "paperdok")]
#[command(author, version, about = "Two-column papers from JSON", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON paper request
    Render {
        /// Input JSON file
        input: PathBuf,

        /// Output file (defaults to the input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: docx, html or pdf (defaults to the output extension, then docx)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Query the PDF conversion service
    Health {
        /// Service URL (defaults to PDF_SERVICE_URL or the configured URL)
        #[arg(long)]
        url: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the layout table as JSON
    Layout,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            output,
            format,
            config,
        } => {
            render_command(&input, output.as_deref(), format, config.as_deref())?;
        }
        Commands::Health { url, config } => {
            health_command(url.as_deref(), config.as_deref())?;
        }
        Commands::Layout => {
            layout_command()?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `log` records from the library crates are bridged into it. Calling this
/// twice is harmless.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print an error and, for generation failures, what to do about it
pub fn report_error(error: &anyhow::Error) {
    eprintln!("Error: {:#}", error);
    if let Some(generation) = error.downcast_ref::<GenerationError>() {
        eprintln!("  Hint: {}", generation.suggestion());
    }
}

/// Load settings for a command
///
/// An explicit path must exist. Otherwise `paperdok.toml` beside `near` is
/// used when present. Environment overrides are applied last.
pub fn resolve_config(explicit: Option<&Path>, near: Option<&Path>) -> Result<PaperdokConfig> {
    let config = match explicit {
        Some(path) => PaperdokConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let candidate = near
                .and_then(Path::parent)
                .unwrap_or(Path::new("."))
                .join(CONFIG_FILE);
            if candidate.exists() {
                PaperdokConfig::load(&candidate)
                    .with_context(|| format!("Failed to load config: {}", candidate.display()))?
            } else {
                PaperdokConfig::default()
            }
        }
    };
    Ok(config.with_env())
}

/// Execute the render command, returning the written path
pub fn render_command(
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    config: Option<&Path>,
) -> Result<PathBuf> {
    println!("paperdok v{}", paperdok_core::VERSION);
    println!("Rendering: {}", input.display());

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let format = match (format, output) {
        (Some(format), _) => format,
        (None, Some(path)) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or(OutputFormat::Docx),
        (None, None) => OutputFormat::Docx,
    };
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(format.extension()),
    };

    let settings = resolve_config(config, Some(input))?;

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let doc = DocumentBuilder::from_json_str(&source)
        .map_err(GenerationError::from)
        .with_context(|| format!("Invalid paper request: {}", input.display()))?;
    println!("  {} sections, {} references", doc.sections.len(), doc.references.len());

    let generator = Generator::new(&settings);
    let file = generator
        .generate_document(&doc, format)
        .with_context(|| format!("Failed to generate {}", format))?;
    tracing::info!(method = %file.conversion_method, "generated {}", format);

    fs::write(&output_path, &file.file_data)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!();
    println!("Render complete!");
    println!("  Output: {}", output_path.display());
    println!("  Size: {} bytes", file.file_size);
    println!("  Method: {}", file.conversion_method);
    println!("  Estimated pages: {}", file.report.estimated_pages);
    for label in file.report.synthesized_tables() {
        println!("  Note: table {} was filled with placeholder content", label);
    }
    for label in file.report.image_placeholders() {
        println!("  Note: figure {} was replaced by placeholder text", label);
    }

    Ok(output_path)
}

/// Execute the health command
pub fn health_command(url: Option<&str>, config: Option<&Path>) -> Result<()> {
    let mut service: ServiceConfig = resolve_config(config, None)?.service;
    if let Some(url) = url {
        service.url = url.to_string();
    }

    let client = ConversionClient::from_config(&service)
        .context("Failed to create PDF service client")?;
    println!("Checking: {}", client.base_url());

    let status = client
        .health()
        .with_context(|| format!("PDF service at {} is not healthy", client.base_url()))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&status).context("Failed to format health status")?
    );
    Ok(())
}

/// The layout table as pretty JSON
pub fn layout_json() -> Result<String> {
    serde_json::to_string_pretty(&LAYOUT).context("Failed to serialize layout")
}

/// Execute the layout command
pub fn layout_command() -> Result<()> {
    println!("{}", layout_json()?);
    Ok(())
}

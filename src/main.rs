use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use startrack_circuit::{
    circuit_loader::CircuitLoader,
    config::EngineConfig,
    templates::{get_template, load_templates},
    CircuitEngine,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "StarTrack circuit geometry tool", long_about = None)]
struct Args {
    /// Path to startrack.toml configuration file
    #[arg(short, long, default_value = "./startrack.toml")]
    config: String,

    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Output format for printed results
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Closure, segments, render curve and validation report for a circuit file
    Analyze {
        file: PathBuf,
        /// Leave the dense render curve out of the output
        #[arg(long)]
        no_spline: bool,
    },
    /// Simulator payload: circuit name and segment list
    Segments { file: PathBuf },
    /// Re-write a circuit document with freshly computed segments
    Export {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Similarity score (0-100) of a drawn circuit against a reference circuit
    Score {
        file: PathBuf,
        #[arg(short, long)]
        reference: PathBuf,
    },
    /// List the built-in reference circuits, or print one as a simulator payload
    Template { name: Option<String> },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn print_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = EngineConfig::load_or_default(&args.config);

    // Initialize tracing
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("Configuration loaded from: {}", args.config);

    let engine = CircuitEngine::new(config);

    match args.command {
        Command::Analyze { file, no_spline } => {
            let loaded = CircuitLoader::load_from_file(&file)
                .with_context(|| format!("Failed to load circuit from {}", file.display()))?;
            let mut analysis = engine.analyze(&loaded.circuit)?;

            info!(
                "{}: {} points, {} segments, closed={}, valid={}",
                analysis.name,
                loaded.circuit.points.len(),
                analysis.segments.len(),
                analysis.closed,
                analysis.report.is_valid
            );
            for issue in &analysis.report.issues {
                warn!("{:?}: {}", issue.severity, issue.message);
            }

            if no_spline {
                analysis.spline.clear();
            }
            print_output(&analysis, args.format)?;
        }
        Command::Segments { file } => {
            let loaded = CircuitLoader::load_from_file(&file)
                .with_context(|| format!("Failed to load circuit from {}", file.display()))?;
            let payload = engine.simulation_payload(&loaded.circuit)?;
            info!(
                "{}: {} segments, {:.2} km",
                payload.name,
                payload.segments.len(),
                payload.total_length() / 1000.0
            );
            print_output(&payload, args.format)?;
        }
        Command::Export { file, output } => {
            let loaded = CircuitLoader::load_from_file(&file)
                .with_context(|| format!("Failed to load circuit from {}", file.display()))?;
            let segments = engine.segments(&loaded.circuit)?;
            let document = CircuitLoader::to_document(&loaded.circuit, Some(loaded.id), segments);
            CircuitLoader::save_to_file(&output, &document)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Exported {} to {}", loaded.circuit.name, output.display());
        }
        Command::Score { file, reference } => {
            let drawn = CircuitLoader::load_from_file(&file)
                .with_context(|| format!("Failed to load circuit from {}", file.display()))?;
            let reference = CircuitLoader::load_from_file(&reference)
                .with_context(|| format!("Failed to load reference from {}", reference.display()))?;
            let score = engine.score(&drawn.circuit, &reference.circuit)?;
            println!("{:.1}", score);
        }
        Command::Template { name: None } => {
            let templates = load_templates();
            let mut names: Vec<_> = templates.keys().collect();
            names.sort();
            for key in names {
                let template = &templates[key];
                println!(
                    "{:<12} {:<20} {:.3} km, {} segments",
                    key,
                    template.name,
                    template.length_km,
                    template.segments.len()
                );
            }
        }
        Command::Template { name: Some(name) } => {
            let Some(template) = get_template(&name) else {
                bail!("Unknown template: {}", name);
            };
            print_output(&template.to_simulation(), args.format)?;
        }
    }

    Ok(())
}

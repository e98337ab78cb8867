use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mljobs_core::config::AppConfig;
use mljobs_core::{load_raw, read_csv_as_is, report, summary, validation};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "ML job postings statistics and charts", long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: PathArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct PathArgs {
    /// TOML file with chart and validation settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Job postings CSV (overrides the config file)
    #[arg(long, global = true)]
    input: Option<PathBuf>,
    /// Directory the charts are written to (overrides the config file)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the five charts (default)
    Report,
    /// Print shape, columns, first rows and missing-value counts
    Summary,
    /// Run dataset sanity checks
    Validate,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.paths)?;

    match cli.command.unwrap_or(Command::Report) {
        Command::Report => handle_report(&config),
        Command::Summary => handle_summary(&config),
        Command::Validate => handle_validate(&config),
    }
}

fn resolve_config(args: &PathArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_path(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(input) = &args.input {
        config.input_path = input.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }

    Ok(config)
}

fn handle_report(config: &AppConfig) -> Result<()> {
    let summary = report::run_report(config).with_context(|| {
        format!(
            "failed to build report from '{}'",
            config.input_path.display()
        )
    })?;

    info!(rows = summary.rows, "report finished");
    println!(
        "Charts saved to '{}' ({} postings after cleaning):",
        config.output_dir.display(),
        summary.rows
    );
    for path in summary.charts.all() {
        println!("  {}", path.display());
    }
    Ok(())
}

fn handle_summary(config: &AppConfig) -> Result<()> {
    let df = read_csv_as_is(&config.input_path)
        .with_context(|| format!("failed to read '{}'", config.input_path.display()))?;
    println!("{}", summary::summarize(&df, config.summary_rows));
    Ok(())
}

fn handle_validate(config: &AppConfig) -> Result<()> {
    let table = load_raw(&config.input_path)
        .with_context(|| format!("failed to load '{}'", config.input_path.display()))?;
    let report = validation::validate_dataset(&table, &config.validation)
        .context("validation pass could not run")?;

    println!("{report}");

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} validation check(s) failed");
    }
    println!("All {} validation checks passed.", report.checks.len());
    Ok(())
}

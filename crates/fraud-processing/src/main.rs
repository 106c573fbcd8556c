//! CLI entry point for the fraud dialogue cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use fraud_processing::config::DEFAULT_CONFIG_PATH;
use fraud_processing::{
    DatasetReport, Pipeline, PipelineConfig, ProjectConfig, ReportGenerator, RunReport,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fraud dialogue dataset cleaner",
    long_about = "Cleans the train and test datasets named in the project configuration \
                  and writes train_cleaned.csv and test_cleaned.csv to <processed>/cleaned.\n\n\
                  EXAMPLES:\n  \
                  # Clean with config/config.toml under the current directory\n  \
                  fraud-processing\n\n  \
                  # Use another project root\n  \
                  fraud-processing --root /srv/fraud --emit-report\n\n  \
                  # Inspect without writing anything\n  \
                  fraud-processing --dry-run"
)]
struct Args {
    /// Path to the project configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Project root that relative data paths are resolved against
    ///
    /// Defaults to the directory above the one holding the config file
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Output the run report as JSON to stdout instead of the text summary
    ///
    /// Disables all logs so stdout carries only the JSON.
    #[arg(long)]
    json: bool,

    /// Write cleaning_report.json next to the cleaned datasets
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Load, analyze and clean in memory without writing any file
    #[arg(long)]
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let root = args
        .root
        .clone()
        .unwrap_or_else(|| ProjectConfig::default_root_for(&args.config));
    info!("Loading configuration from: {}", args.config.display());
    let project = ProjectConfig::load(&args.config)?;
    let paths = project.resolve(&root);

    let config = PipelineConfig::builder()
        .paths(paths)
        .save_to_disk(!args.dry_run)
        .emit_report(args.emit_report && !args.dry_run)
        .build()?;

    let pipeline = Pipeline::builder().config(config).build()?;

    let outcome = match pipeline.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed [{}]: {}", e.error_code(), e));
        }
    };

    let report = ReportGenerator::build_report(&outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(path) = &outcome.report_path {
        info!("Report written to: {}", path.display());
    }

    print_human_readable_summary(&report, args.dry_run);

    Ok(())
}

/// Print the per-dataset diagnostics and the cleaning summary.
///
/// Uses `println!` on purpose: this is the primary output of the tool and
/// must not depend on the log level.
fn print_human_readable_summary(report: &RunReport, dry_run: bool) {
    println!();
    println!("{}", "=".repeat(80));
    if dry_run {
        println!("DRY RUN - nothing was written");
    } else {
        println!("CLEANING COMPLETE");
    }
    println!("{}", "=".repeat(80));

    for (name, section) in [("train", &report.train), ("test", &report.test)] {
        print_dataset_section(name, section);
    }

    println!();
    print!("{}", ReportGenerator::render_summary(report));
    println!();
    println!("Duration: {}ms", report.duration_ms);
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}

fn print_dataset_section(name: &str, section: &DatasetReport) {
    println!();
    println!("{}", name.to_uppercase());
    println!("{}", "-".repeat(40));
    if let Some(input) = &section.input_file {
        let encoding = section.input_encoding.map(|e| e.label()).unwrap_or("?");
        println!("  File: {} ({})", input, encoding);
    }
    println!("  Rows: {}", section.quality.row_count);

    let labels = &section.labels;
    println!(
        "  Labels: {} fraud, {} not fraud",
        labels.positive, labels.negative
    );
    if labels.coerced() > 0 {
        println!(
            "  ! {} labels coerced to 0 ({} missing, {} unrecognised)",
            labels.coerced(),
            labels.coerced_missing,
            labels.coerced_unparseable
        );
    }

    println!("  Nulls:");
    for stats in &section.quality.columns {
        println!(
            "    {:<30} {:>8} ({:.2}%)",
            stats.column, stats.null_count, stats.null_percentage
        );
    }

    println!("  is_fraud distribution: {:?}", section.distribution.counts);
    if let Some(ratio) = section.distribution.balance_ratio {
        println!("  Balance ratio: {:.3}", ratio);
    }
}

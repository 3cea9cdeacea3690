//! `lipd-qc` command line

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use lipd_qc::config::DEFAULT_DATA_DIR;
use lipd_qc::report::Outcome;
use lipd_qc::{RunConfig, Runner};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Check the Temp12k LiPD collection and write a review workbook.
#[derive(Debug, Parser)]
#[command(name = "lipd-qc", version, about)]
struct Cli {
    /// Directory holding the .lpd files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data: PathBuf,

    /// Report path [default: <DATA>/results.xlsx]
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Accepted-failures file, one invocation id per line
    #[arg(long)]
    accepted: Option<PathBuf>,

    /// Snapshot file of the loaded collection (.json, .json.zst, .json.lz4)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Country bounding boxes (CSV: name,min_lat,max_lat,min_lon,max_lon)
    #[arg(long)]
    countries: Option<PathBuf>,

    /// Report malformed files as failed lipd_validity instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> RunConfig {
        let mut builder = RunConfig::builder(&self.data).skip_invalid(self.skip_invalid);
        if let Some(path) = &self.output {
            builder = builder.output(path);
        }
        if let Some(path) = &self.accepted {
            builder = builder.accepted(path);
        }
        if let Some(path) = &self.cache {
            builder = builder.cache(path);
        }
        if let Some(path) = &self.countries {
            builder = builder.countries(path);
        }
        builder.build()
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();
    let mut runner = Runner::new(&config)
        .with_context(|| format!("Failed to prepare run over {}", config.data_dir().display()))?;
    let report = runner
        .run()
        .with_context(|| format!("Failed to produce {}", runner.output().display()))?;

    let summary = report.summary();
    println!(
        "{}: {} rows, {} passed, {} failed, {} skipped",
        runner.output().display(),
        report.results().len(),
        summary.outcome_total(Outcome::Passed),
        summary.outcome_total(Outcome::Failed),
        summary.outcome_total(Outcome::Skipped),
    );
    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use hyper_config::ConfigLayering;
use hyper_frft::{
    analyze, analyze_threads, frft, AnalysisConfig, ComplexSample, Signal, SignalBatch,
    ThreadRecord,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fractional Fourier analysis of scored thread batches and named signals"
)]
struct Cli {
    /// Analysis config file (TOML, `[frft]` section); defaults to the discovered layers
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Destination for the JSON output; STDOUT when omitted
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Run every stage on the calling thread
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse a JSON array of thread records
    Threads(ThreadsArgs),

    /// Analyse a JSON object of named complex signals
    Signals(InputArgs),

    /// Run a single fractional transform over a JSON array of samples
    Transform(TransformArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input JSON file
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args)]
struct ThreadsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Fixed signal length; defaults to the next power of two of the record count
    #[arg(long)]
    length: Option<usize>,
}

#[derive(Args)]
struct TransformArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Transform order; 1 is the standard forward transform
    #[arg(long, allow_negative_numbers = true)]
    alpha: f64,
}

fn main() -> Result<()> {
    hyper_config::tracing::init_tracing_once();
    let cli = Cli::parse();
    let result = run(&cli);
    hyper_config::tracing::flush_chrome_trace();
    result
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Threads(args) => {
            let mut config = load_config(cli)?;
            if args.length.is_some() {
                config.extraction.length = args.length;
            }
            let records: Vec<ThreadRecord> = read_json(&args.input.input)?;
            let report = analyze_threads(&records, &config)
                .with_context(|| format!("failed to analyse {}", args.input.input.display()))?;
            write_output(cli, &report)
        }
        Command::Signals(args) => {
            let config = load_config(cli)?;
            let signals: BTreeMap<String, Signal> = read_json(&args.input)?;
            let batch = SignalBatch::from_signals(signals)
                .with_context(|| format!("invalid signal batch in {}", args.input.display()))?;
            let report = analyze(&batch, &config)
                .with_context(|| format!("failed to analyse {}", args.input.display()))?;
            write_output(cli, &report)
        }
        Command::Transform(args) => {
            let signal: Vec<ComplexSample> = read_json(&args.input.input)?;
            let transformed = frft(&signal, args.alpha).with_context(|| {
                format!(
                    "failed to transform {} at order {}",
                    args.input.input.display(),
                    args.alpha
                )
            })?;
            write_output(cli, &transformed)
        }
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let layering = match &cli.config {
        Some(path) => ConfigLayering::default().with_base(path),
        None => ConfigLayering::discover(),
    };
    let mut config = AnalysisConfig::load(layering).context("failed to load analysis config")?;
    if cli.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_output<T: Serialize>(cli: &Cli, value: &T) -> Result<()> {
    let payload = if cli.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match &cli.output {
        Some(path) => {
            ensure_parent_dir(path)?;
            fs::write(path, payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(target: "hyper::cli", path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{payload}")?;
        }
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

//! VIP Scoring Pipeline - Batch Driver
//!
//! Loads the trained artifacts once, then scores flat string-keyed records
//! from a JSONL stream, emitting one decision (or structured failure) per
//! line on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::time::Instant;
use tracing::{error, info, warn};
use vip_scoring_pipeline::{
    cli::Args, config::AppConfig, localization, metrics::PipelineMetrics,
    pipeline::InferencePipeline, types::RawRecord,
};

fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_from_path(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    init_tracing(&config);
    info!(config = %args.config, "Configuration loaded");

    // Fatal on any missing or corrupt artifact: never serve partially loaded
    let pipeline = InferencePipeline::load(&config)?;

    if args.list_categories {
        for label in pipeline.list_categories() {
            println!("{label}");
        }
        return Ok(());
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open input {path}"))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let metrics = PipelineMetrics::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: RawRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "Skipping malformed record");
                metrics.record_rejected();
                println!(
                    "{}",
                    json!({ "error": { "kind": "malformed_record", "message": e.to_string() } })
                );
                continue;
            }
        };
        let record = localization::normalize(record);

        let start = Instant::now();
        match pipeline.classify(&record) {
            Ok(decision) => {
                metrics.record_decision(start.elapsed(), &decision);
                println!("{}", serde_json::to_string(&decision)?);
            }
            Err(e) if e.is_recoverable() => {
                warn!(line = line_no + 1, error = %e, "Record rejected");
                metrics.record_rejected();
                println!(
                    "{}",
                    json!({ "error": { "kind": e.kind(), "message": e.to_string() } })
                );
            }
            Err(e) => {
                error!(error = %e, "Fatal pipeline fault");
                return Err(e.into());
            }
        }
    }

    metrics.print_summary();
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "vip_scoring_pipeline={}",
            config.logging.level
        ))
    });

    // Decisions go to stdout; logs stay on stderr
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

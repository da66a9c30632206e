// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Activity Recompute CLI
//!
//! Reads activity records from JSON files, runs the metrics pipeline over
//! each of them with an optional athlete profile, and writes one metrics
//! document per activity. Log output goes to stderr so stdout stays clean
//! for piped metrics.

use anyhow::{Context, Result};
use clap::Parser;
use paceline::config::MetricsConfig;
use paceline::models::{ActivityRecord, AthleteProfile};
use paceline::pipeline::MetricsEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "paceline-recompute")]
#[command(about = "Recompute derived metrics for recorded activities")]
pub struct Args {
    /// Activity record files (JSON), one activity per file
    #[arg(required = true)]
    activities: Vec<PathBuf>,

    /// Athlete profile file (JSON); heart-rate metrics are omitted without one
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Directory for `<activity>.metrics.json` outputs; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, default_value = "false")]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    paceline::logging::init_from_env()?;

    let args = Args::parse();

    let config = MetricsConfig::load(args.config.clone())?;
    let engine = Arc::new(MetricsEngine::new(config));

    let profile = match &args.profile {
        Some(path) => load_profile(path)?,
        None => AthleteProfile::default(),
    };

    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    info!(
        activities = args.activities.len(),
        with_profile = args.profile.is_some(),
        "Starting metrics recompute"
    );

    let mut tasks = Vec::with_capacity(args.activities.len());
    for path in &args.activities {
        let engine = Arc::clone(&engine);
        let profile = profile.clone();
        let task_path = path.clone();
        let output = args.output.clone();
        let pretty = args.pretty;
        let handle = tokio::task::spawn_blocking(move || {
            process_activity(&engine, &task_path, &profile, output.as_deref(), pretty)
        });
        tasks.push((path.clone(), handle));
    }

    let mut failures = 0usize;
    for (path, handle) in tasks {
        let outcome = handle.await.context("Recompute worker panicked")?;
        if let Err(err) = outcome {
            error!(activity = %path.display(), error = %err, "Recompute failed");
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} activities failed to recompute", args.activities.len());
    }
    Ok(())
}

/// Read, recompute and emit metrics for a single activity file
fn process_activity(
    engine: &MetricsEngine,
    path: &Path,
    profile: &AthleteProfile,
    output_dir: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read activity file: {}", path.display()))?;
    let record: ActivityRecord = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse activity file: {}", path.display()))?;

    let metrics = engine.recompute(&record, profile)?;

    let json = if pretty {
        serde_json::to_string_pretty(&metrics)?
    } else {
        serde_json::to_string(&metrics)?
    };

    match output_dir {
        Some(dir) => {
            let stem = path
                .file_stem()
                .map_or_else(|| "activity".to_string(), |s| s.to_string_lossy().into_owned());
            let target = dir.join(format!("{stem}.metrics.json"));
            std::fs::write(&target, json)
                .with_context(|| format!("Failed to write metrics file: {}", target.display()))?;
            info!(activity_id = %metrics.activity_id, output = %target.display(), "Metrics written");
        }
        None => {
            println!("{json}");
            info!(activity_id = %metrics.activity_id, "Metrics written to stdout");
        }
    }
    Ok(())
}

/// Load an athlete profile from a JSON file
fn load_profile(path: &Path) -> Result<AthleteProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read athlete profile: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse athlete profile: {}", path.display()))
}

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use fit_recover::{
    coverage, decode_records, extract_samples, render_gpx, GpxOptions, RecoverError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recover GPS and sensor data from a FIT file into GPX", long_about = None)]
struct Cli {
    /// FIT file to convert
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output GPX path
    #[arg(default_value = "recovered_ride.gpx", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Track name embedded in the GPX output
    #[arg(long, default_value = "Bike Ride")]
    track_name: String,

    /// Activity type embedded in the GPX output
    #[arg(long, default_value = "cycling")]
    activity_type: String,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    handle_convert(cli)
}

fn handle_convert(args: Cli) -> Result<()> {
    if !args.input.exists() {
        return Err(anyhow!("input file not found: {}", args.input.display()));
    }

    info!("Reading FIT file: {}", args.input.display());
    let data = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let records = decode_records(&data)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    info!("Found {} data records", records.len());

    let samples = extract_samples(&records);
    info!("Extracted {} GPS points", samples.len());

    if samples.is_empty() {
        return Err(RecoverError::NoGpsData)
            .with_context(|| format!("no GPS data found in {}", args.input.display()));
    }

    let stats = coverage(&samples);
    info!("Power data: {:.1}% coverage", stats.power_pct);
    info!("Heart rate: {:.1}% coverage", stats.heart_rate_pct);

    let options = GpxOptions {
        track_name: args.track_name,
        activity_type: args.activity_type,
    };
    let gpx = render_gpx(&samples, &options)?;

    fs::write(&args.output, &gpx)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "Wrote GPX: {} ({} points, {} bytes)",
        args.output.display(),
        samples.len(),
        gpx.len()
    );
    Ok(())
}

//! `slots` CLI — generate bookable slots from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slots from explicit availability ranges (stdin → stdout)
//! cat request.json | slots generate
//!
//! # Pin "now" for reproducible output
//! slots generate -i request.json --now 2024-06-01T00:00:00Z
//!
//! # Slots from a weekly schedule minus busy time, written to a file
//! slots availability -i schedule.json -o slots.json
//!
//! # Fallback start-mark interval from the environment
//! SLOT_DEFAULT_INTERVAL=5 slots generate -i request.json
//! ```
//!
//! Logs go to stderr and are controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=slot_engine=debug`).

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use slot_engine::{AvailabilityRequest, SlotCandidate, SlotRequest};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Bookable slot generator for calendar availability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate slots from a SlotRequest JSON document
    Generate(CommonArgs),
    /// Expand a schedule, subtract busy time, and generate slots
    Availability(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
    /// Treat this RFC 3339 instant as the current time
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
    /// Start-mark interval in minutes when no standard interval fits the frequency
    #[arg(long, env = "SLOT_DEFAULT_INTERVAL")]
    default_interval: Option<i64>,
    /// Reject negative durations instead of clamping them
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            let json = read_input(args.input.as_deref())?;
            let mut request: SlotRequest =
                serde_json::from_str(&json).context("Failed to parse slot request JSON")?;
            apply_overrides(&mut request, &args)?;

            let now = args.now.unwrap_or_else(Utc::now);
            let slots = slot_engine::generate_slots(&request, now);
            tracing::info!(count = slots.len(), "generated slots");
            write_slots(args.output.as_deref(), &slots)?;
        }
        Commands::Availability(args) => {
            let json = read_input(args.input.as_deref())?;
            let mut request: AvailabilityRequest =
                serde_json::from_str(&json).context("Failed to parse availability request JSON")?;
            apply_overrides(&mut request.slots, &args)?;

            let now = args.now.unwrap_or_else(Utc::now);
            let slots = slot_engine::available_slots(&request, now)
                .context("Failed to compute available slots")?;
            tracing::info!(count = slots.len(), "computed available slots");
            write_slots(args.output.as_deref(), &slots)?;
        }
    }

    Ok(())
}

/// Apply command-line settings on top of the request read from input.
fn apply_overrides(request: &mut SlotRequest, args: &CommonArgs) -> Result<()> {
    if let Some(interval) = args.default_interval {
        request.default_interval = interval;
    }
    if args.strict {
        request.validate().context("Invalid slot request")?;
    }
    Ok(())
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid --now value: {}", raw))
}

fn write_slots(path: Option<&str>, slots: &[SlotCandidate]) -> Result<()> {
    let json = serde_json::to_string_pretty(slots).context("Failed to serialize slots")?;
    write_output(path, &json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

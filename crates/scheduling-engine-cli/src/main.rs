use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use scheduling_engine::{
    already_ended, format_duration, is_end_before_start, is_end_date_before_start_date,
    ChangedField, ScheduleMode, SchedulingDefaults, TemporalValues,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keep event start, end and duration consistent.
#[derive(Parser)]
#[command(name = "schedule", version, about)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute the derived fields after an edit and print the result
    Reconcile {
        /// Field the user edited: start, end or duration
        #[arg(short, long)]
        changed: String,

        /// Recurring schedule: never change the end date
        #[arg(short, long)]
        multiple: bool,

        /// Input JSON file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print the default schedule for a new event
    Defaults {
        /// Reference instant (RFC 3339)
        #[arg(long)]
        now: String,

        /// IANA timezone the slots are laid out in
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// TOML file with scheduling defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Report whether a schedule has already ended or ends before it starts,
    /// by time of day and by date
    Check {
        /// Reference instant (RFC 3339)
        #[arg(long)]
        now: String,

        /// IANA timezone of the schedule
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// Input JSON file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Reconcile {
            changed,
            multiple,
            input,
        } => {
            let changed: ChangedField = changed.parse()?;
            let mode = if multiple {
                ScheduleMode::Multiple
            } else {
                ScheduleMode::Single
            };
            tracing::debug!(field = %changed, ?mode, "reconciling");
            let mut values = read_values(input.as_ref())?;
            values.apply_change(changed, mode)?;
            println!("{}", values.to_json()?);
        }
        Command::Defaults {
            now,
            timezone,
            config,
        } => {
            let defaults = match config {
                Some(path) => SchedulingDefaults::from_file(&path)
                    .with_context(|| format!("loading defaults from {}", path.display()))?,
                None => SchedulingDefaults::default(),
            };
            let values = defaults.default_schedule_in(parse_now(&now)?, &timezone)?;
            println!("{}", values.to_json()?);
        }
        Command::Check {
            now,
            timezone,
            input,
        } => {
            let values = read_values(input.as_ref())?;
            let now = parse_now(&now)?;
            let report = serde_json::json!({
                "already_ended": already_ended(&values.start, &values.duration, &timezone, now)?,
                "end_before_start": is_end_before_start(&values)?,
                "end_date_before_start": is_end_date_before_start_date(&values),
                "duration": format_duration(&values.duration),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn read_values(input: Option<&PathBuf>) -> Result<TemporalValues> {
    let json = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    Ok(TemporalValues::from_json(&json)?)
}

fn parse_now(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid datetime: '{s}'"))
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "scheduling_engine=debug,scheduling_engine_cli=debug,info"
    } else {
        "scheduling_engine=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

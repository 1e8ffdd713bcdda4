//! `wtime` CLI — inspect and watch derived clock, calendar, season and DST values.
//!
//! ## Usage
//!
//! ```sh
//! # Every derived value for now, in a zone
//! wtime --timezone Europe/Berlin snapshot
//!
//! # Values for a fixed instant
//! wtime snapshot --at 2024-12-01T15:04:05Z
//!
//! # Stream change notifications (one JSON object per line) for 10 seconds
//! wtime --timezone America/New_York watch --seconds 10
//!
//! # DST schedule, season outlook and month details
//! wtime --timezone America/New_York dst
//! wtime --hemisphere south season
//! wtime month --at 2024-02-10T00:00:00Z
//!
//! # Load settings (timezone, hemisphere, weekday start, locale) from JSON
//! wtime --config wtime.json snapshot
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use wtime_engine::{
    derive, dst_schedule, season_outlook, ClockSource, DerivedSnapshot, EngineConfig, Hemisphere,
    ManualClock, SystemClock, WeekdayStart,
};

#[derive(Parser)]
#[command(
    name = "wtime",
    version,
    about = "Derived clock, calendar, season and DST values"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// IANA timezone (overrides the configuration file)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// North or South (overrides the configuration file)
    #[arg(long, global = true)]
    hemisphere: Option<Hemisphere>,

    /// Monday or Sunday (overrides the configuration file)
    #[arg(long, global = true)]
    weekday_start: Option<WeekdayStart>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every derived value as JSON
    Snapshot {
        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Run the refresh loop and print each change as a JSON line
    Watch {
        /// Stop after this many seconds (runs until Ctrl-C if omitted)
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Print the DST schedule around an instant
    Dst {
        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the current season, its bounds and the countdown to the next one
    Season {
        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
    /// Print details about the current month
    Month {
        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Snapshot { at } => {
            let (_, derivation) = config.resolve().context("Invalid configuration")?;
            let local = clock_for(at.as_deref())?
                .now_local(&config.timezone_id)
                .context("Failed to read the clock")?;
            print_json(&DerivedSnapshot::derive(&local, &derivation))?;
        }
        Commands::Watch { seconds } => watch(&config, *seconds).await?,
        Commands::Dst { at } => {
            let (tz, _) = config.resolve().context("Invalid configuration")?;
            let now = clock_for(at.as_deref())?
                .now_utc()
                .context("Failed to read the clock")?;
            print_json(&dst_schedule(&tz, now))?;
        }
        Commands::Season { at } => {
            let (_, derivation) = config.resolve().context("Invalid configuration")?;
            let local = clock_for(at.as_deref())?
                .now_local(&config.timezone_id)
                .context("Failed to read the clock")?;
            let outlook = season_outlook(&local, derivation.hemisphere)
                .context("Failed to compute the season outlook")?;
            print_json(&outlook)?;
        }
        Commands::Month { at } => {
            let (_, derivation) = config.resolve().context("Invalid configuration")?;
            let local = clock_for(at.as_deref())?
                .now_local(&config.timezone_id)
                .context("Failed to read the clock")?;
            let details = derive::month_details(&local, &derivation)
                .context("Failed to compute month details")?;
            print_json(&details)?;
        }
    }

    Ok(())
}

/// Configuration file (if any) with command-line overrides applied on top.
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => read_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(tz) = &cli.timezone {
        config.timezone_id = tz.clone();
    }
    if let Some(hemisphere) = cli.hemisphere {
        config.hemisphere = hemisphere;
    }
    if let Some(weekday_start) = cli.weekday_start {
        config.weekday_start = weekday_start;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<EngineConfig> {
    EngineConfig::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// A fixed clock for `--at`, otherwise the system clock.
fn clock_for(at: Option<&str>) -> Result<Arc<dyn ClockSource>> {
    match at {
        Some(raw) => {
            let instant = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --at timestamp: {}", raw))?
                .with_timezone(&Utc);
            Ok(Arc::new(ManualClock::new(instant)))
        }
        None => Ok(Arc::new(SystemClock)),
    }
}

async fn watch(config: &EngineConfig, seconds: Option<u64>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = wtime_engine::start(config, Arc::new(SystemClock), tx)
        .context("Failed to start the refresh loop")?;

    let deadline = async {
        match seconds {
            Some(n) => tokio::time::sleep(Duration::from_secs(n)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            change = rx.recv() => match change {
                Some(change) => println!("{}", serde_json::to_string(&change)?),
                None => break,
            },
            _ = &mut deadline => break,
            _ = &mut ctrl_c => {
                tracing::info!("received Ctrl-C");
                break;
            }
        }
    }

    wtime_engine::stop(handle).await;
    while let Ok(change) = rx.try_recv() {
        println!("{}", serde_json::to_string(&change)?);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! CLI argument definitions for parkpulse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wait-times` | Live wait times for one park |
//! | `hours` | Operating hours for the coming days |
//! | `entertainment` | Shows, parades, fireworks and meets |
//! | `characters` | Character meet-and-greets |
//! | `snapshot` | All four domains plus the health report |
//! | `sources` | Ordered source plan and worst-case latency |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `-v`, `--verbose` | off | Debug logging on stderr |
//! | `--retries` | `PARKPULSE_RETRIES` | Retries per source |
//! | `--retry-delay-ms` | `PARKPULSE_RETRY_DELAY_MS` | Delay before the first retry |
//! | `--backoff` | `PARKPULSE_BACKOFF` | `fixed` or `exponential` |
//!
//! # Examples
//!
//! ```bash
//! parkpulse wait-times magic-kingdom --pretty
//! parkpulse snapshot epcot -v
//! parkpulse sources wait_times hollywood-studios
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};
use parkpulse_core::BackoffStrategy;

/// Theme-park data with multi-source fallback.
///
/// Every command prints a JSON envelope whose `meta` says which upstream
/// answered and how fresh the data is. Upstream outages never fail a
/// command; static data is served instead.
#[derive(Debug, Parser)]
#[command(
    name = "parkpulse",
    author,
    version,
    about = "Theme-park wait times, hours and entertainment with multi-source fallback"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log acquisition details to stderr. Repeat for trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Retries per upstream source (0-5), overriding `PARKPULSE_RETRIES`.
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=5))]
    pub retries: Option<u32>,

    /// Delay before the first retry in milliseconds (0-10000).
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(0..=10_000))]
    pub retry_delay_ms: Option<u64>,

    /// Delay growth between retries: fixed or exponential, overriding `PARKPULSE_BACKOFF`.
    #[arg(long, global = true)]
    pub backoff: Option<BackoffStrategy>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch live wait times.
    ///
    /// # Examples
    ///
    ///   parkpulse wait-times magic-kingdom
    WaitTimes(ParkArgs),

    /// Fetch park operating hours.
    Hours(ParkArgs),

    /// Fetch the merged entertainment schedule.
    Entertainment(ParkArgs),

    /// Fetch character meet-and-greets.
    Characters(ParkArgs),

    /// Fetch every domain concurrently and include the health report.
    Snapshot(ParkArgs),

    /// Show the ordered source plan for a domain.
    ///
    /// # Examples
    ///
    ///   parkpulse sources wait_times epcot
    Sources(SourcesArgs),
}

/// Arguments for the per-park commands.
#[derive(Debug, Args)]
pub struct ParkArgs {
    /// Park identifier: magic-kingdom, epcot, hollywood-studios or animal-kingdom.
    pub park: String,
}

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Data domain: wait_times, park_hours, entertainment or characters.
    pub domain: String,

    /// Park identifier used to render source URLs.
    pub park: String,
}

//! CLI entry point for the PVTA departure announcer.
//!
//! Designed to be invoked by an external scheduler (cron, systemd timer)
//! once a minute during service hours; each invocation is one complete
//! run. Overlap protection, if needed, belongs to the scheduler.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pvta_announcer::announce::{Announcer, CommandSink, MissingLog};
use pvta_announcer::config::RunConfig;
use pvta_announcer::domain::{AnnouncementEvent, Interval, RouteKey, StopId};
use pvta_announcer::infopoint::{InfoPointClient, InfoPointConfig};
use pvta_announcer::run::{run_announce_all, run_once};
use pvta_announcer::store::SnapshotStore;

#[derive(Parser)]
#[command(name = "pvta-announcer")]
#[command(about = "Announces PVTA bus departures that just became due", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Stop list file, one stop id per line
    #[arg(long, default_value = "stops.txt")]
    stops: PathBuf,

    /// Snapshot state file
    #[arg(long, default_value = "cached_departures.json")]
    state_file: PathBuf,

    /// Missing-messages log file
    #[arg(long, default_value = "missing_messages.log")]
    missing_log: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One full cycle: fetch, detect crossings, announce, persist
    Run,
    /// Announce the soonest departure for every route direction in the
    /// feed right now; does not touch the persisted baseline
    AnnounceAll,
    /// Announce one fixed event, for checking the audio path end to end
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = RunConfig::load(&cli.config, &cli.stops)?;

    let announcer = Announcer::new(
        CommandSink::new(&config.player_command, &config.speaker_command),
        &config.voice_dir,
        MissingLog::new(&cli.missing_log),
    );

    match cli.command {
        Commands::Run => {
            let source = InfoPointClient::new(InfoPointConfig::new())?;
            let store = SnapshotStore::new(&cli.state_file);
            run_once(&config, &source, &announcer, &store).await?;
        }
        Commands::AnnounceAll => {
            let source = InfoPointClient::new(InfoPointConfig::new())?;
            run_announce_all(&config, &source, &announcer).await?;
        }
        Commands::Demo => {
            let event = AnnouncementEvent {
                stop: StopId::new("72".to_string())?,
                route: RouteKey::new("20030", "North Amherst"),
                interval: Interval::from_minutes(5),
            };
            announcer.announce(&event).await?;
        }
    }

    Ok(())
}

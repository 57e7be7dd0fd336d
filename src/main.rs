use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand};

use watchmates::core::config::{ConfigManager, Settings};
use watchmates::core::sources::{NotificationDelivery, Snapshot};
use watchmates::{AlertTier, Coordinate, NotificationCommand, NotificationCoordinator, Result};

#[derive(Parser)]
#[command(name = "watchmates", version, about = "Favorite-team watch-along alerts")]
struct Cli {
    /// Directory holding settings.json
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate once at a single location
    Check {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Replay a JSON list of coordinates as location updates
    Walk {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        route: PathBuf,
        /// Sleep poll_interval_ms between points
        #[arg(long)]
        realtime: bool,
    },
    /// List notification tiers and their delivery channels
    Tiers,
}

/// Prints each rendered notification as one JSON line.
struct StdoutDelivery;

#[async_trait]
impl NotificationDelivery for StdoutDelivery {
    async fn deliver(&self, command: &NotificationCommand) -> Result<()> {
        println!("{}", serde_json::to_string(&command.to_message())?);
        Ok(())
    }
}

fn tier_lines() -> Vec<String> {
    AlertTier::all()
        .iter()
        .map(|tier| {
            format!(
                "{:<18} {:<14} {}",
                tier.channel_id(),
                tier.display_name(),
                tier.description()
            )
        })
        .collect()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn build_coordinator(
    snapshot: &Path,
    user: String,
    settings: &Settings,
) -> Result<NotificationCoordinator> {
    let (users, events) = Snapshot::load(snapshot)?.into_sources();
    let coordinator = NotificationCoordinator::new(
        user,
        Arc::new(users),
        Arc::new(events),
        Arc::new(StdoutDelivery),
    );
    Ok(coordinator.with_settings(settings))
}

async fn walk(
    coordinator: &NotificationCoordinator,
    route: &[Coordinate],
    settings: &Settings,
    realtime: bool,
) -> Result<()> {
    let mut last: Option<Coordinate> = None;
    for point in route {
        if let Some(prev) = last {
            let moved = prev.distance_meters(point);
            if moved < settings.min_location_delta_m {
                log::debug!("Moved {:.1} m, below threshold, skipping", moved);
                continue;
            }
        }
        let fired = coordinator.on_location_changed(*point).await?;
        log::info!(
            "Evaluated ({:.5}, {:.5}): {} notifications",
            point.latitude,
            point.longitude,
            fired.len()
        );
        last = Some(*point);

        if realtime {
            tokio::time::sleep(Duration::from_millis(settings.poll_interval_ms)).await;
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let settings = ConfigManager::new(cli.config_dir).load();

    match cli.command {
        Command::Check {
            snapshot,
            user,
            lat,
            lon,
        } => {
            let coordinator = build_coordinator(&snapshot, user, &settings)?;
            coordinator.tick(Coordinate::new(lat, lon)).await?;
        }
        Command::Walk {
            snapshot,
            user,
            route,
            realtime,
        } => {
            let coordinator = build_coordinator(&snapshot, user, &settings)?;
            let points: Vec<Coordinate> = serde_json::from_str(&fs::read_to_string(route)?)?;
            walk(&coordinator, &points, &settings, realtime).await?;
        }
        Command::Tiers => {
            for line in tier_lines() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("watchmates: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Parking lot — command line harness
//!
//! Loads a lot layout and fee schedule, then quotes fees or replays scripted
//! arrivals and departures.
//!
//! ```sh
//! # Validate the default config (~/.config/parking-lot/config.toml)
//! parking-lot check
//!
//! # Price a 26 hour stay in a medium slot
//! parking-lot quote --class medium --hours 26
//!
//! # Replay a scenario and print JSON outcomes
//! parking-lot --config lot.toml replay scenario.toml --json
//! ```

mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use parking_lot_service::application::{ManualClock, Occupancy, ParkingService};
use parking_lot_service::domain::SizeClass;
use parking_lot_service::{default_config_path, init_tracing, AppConfig, ConfigError};

use scenario::{EventOutcome, Scenario};

/// Nearest-slot parking allocation and fee calculation.
#[derive(Parser, Debug)]
#[command(name = "parking-lot", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the lot layout.
    Check,

    /// Print the fee for a stay.
    Quote {
        /// Slot class (small, medium, large).
        #[arg(long, value_parser = parse_size_class)]
        class: SizeClass,

        /// Billable hours.
        #[arg(long)]
        hours: u32,
    },

    /// Replay a scenario file of park/unpark events.
    Replay {
        /// Scenario file (TOML, `[[events]]` tables).
        scenario: PathBuf,

        /// Print outcomes as JSON lines.
        #[arg(long)]
        json: bool,
    },
}

fn parse_size_class(s: &str) -> Result<SizeClass, String> {
    SizeClass::from_str(s).ok_or_else(|| format!("unknown size class '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let explicit = cli.config.is_some();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let mut config = match load_config(&config_path, explicit) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging);
    info!("Configuration resolved from {}", config_path.display());

    let lot = match config.build_lot() {
        Ok(lot) => lot,
        Err(e) => {
            error!("Invalid lot configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Check => {
            println!("✅ Configuration is valid");
            println!("   Config file  : {}", config_path.display());
            println!("   Entry points : {}", lot.entry_points());
            for slot in lot.slots() {
                println!(
                    "   Slot {:>3}     : {:<6} distances {:?}",
                    slot.id.0,
                    slot.class.to_string(),
                    slot.distances()
                );
            }
            let tariff = lot.fee_schedule();
            println!(
                "   Tariff       : {} for {}h, then {}/{}/{} per hour, {} per {}h",
                tariff.flat_fee,
                tariff.flat_hours,
                tariff.hourly_small,
                tariff.hourly_medium,
                tariff.hourly_large,
                tariff.day_rate,
                tariff.day_hours
            );
        }
        Command::Quote { class, hours } => {
            let service = ParkingService::with_system_clock(lot);
            let breakdown = service.quote(class, hours).await;
            let formatted = service
                .with_lot(|lot| lot.fee_schedule().format_fee(breakdown.total))
                .await;
            println!("{class} slot, {hours}h: {formatted}");
            if breakdown.days > 0 {
                println!("   {} day(s)     : {}", breakdown.days, breakdown.day_charge);
            }
            println!("   flat fee     : {}", breakdown.flat_fee);
            if breakdown.excess_hours > 0 {
                println!(
                    "   {} extra hour(s): {}",
                    breakdown.excess_hours, breakdown.hourly_charge
                );
            }
        }
        Command::Replay { scenario: path, json } => {
            let script = Scenario::load(&path)?;
            let start = script
                .events
                .first()
                .map(|event| event.at())
                .unwrap_or_else(chrono::Utc::now);
            let clock = Arc::new(ManualClock::new(start));
            let service = ParkingService::new(lot, clock.clone());

            let outcomes = scenario::replay(&service, &clock, &script).await;
            for outcome in &outcomes {
                if json {
                    println!("{}", serde_json::to_string(outcome)?);
                } else {
                    print_outcome(outcome);
                }
            }

            let occupancy = service.occupancy().await;
            if json {
                println!("{}", serde_json::to_string(&occupancy)?);
            } else {
                print_occupancy(&occupancy);
            }
        }
    }

    Ok(())
}

/// Read the config at `path`.
///
/// Only a missing file at the default location falls back to the
/// demonstration lot; a path given with `--config` must load.
fn load_config(path: &Path, explicit: bool) -> Result<AppConfig, ConfigError> {
    match AppConfig::load(path) {
        Err(ConfigError::Io { source, .. })
            if !explicit && source.kind() == std::io::ErrorKind::NotFound =>
        {
            eprintln!(
                "No config at {}, using the default demonstration lot.",
                path.display()
            );
            Ok(AppConfig::default())
        }
        other => other,
    }
}

fn print_outcome(outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Parked {
            vehicle,
            slot_id,
            slot_class,
            entered_at,
        } => println!("🅿️  {vehicle} parked in slot {slot_id} ({slot_class}) at {entered_at}"),
        EventOutcome::Unparked(receipt) => println!(
            "🚗 {} left slot {} after {}h, fee {}{}",
            receipt.vehicle_id,
            receipt.slot_id,
            receipt.stay_hours,
            receipt.fee,
            if receipt.continuous {
                format!(" (continuous, {}h charged)", receipt.charged_hours)
            } else {
                String::new()
            }
        ),
        EventOutcome::Failed { vehicle, error } => println!("❌ {vehicle}: {error}"),
    }
}

fn print_occupancy(occupancy: &Occupancy) {
    println!(
        "Occupancy: {}/{} slots used, {} vehicle(s) parked",
        occupancy.occupied(),
        occupancy.total(),
        occupancy.active_vehicles
    );
    for class in SizeClass::ALL {
        let counts = occupancy.for_class(class);
        println!(
            "   {:<6} : {} free of {}",
            class.to_string(),
            counts.free(),
            counts.total
        );
    }
}

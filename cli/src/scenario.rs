//! Scripted arrival/departure replays

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use parking_lot_service::application::{ManualClock, ParkingService, Receipt};
use parking_lot_service::domain::{SizeClass, SlotId, Vehicle, VehicleId};

/// A scenario file: `[[events]]` tables replayed in order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScenarioEvent {
    Park {
        vehicle: String,
        class: SizeClass,
        entry: usize,
        at: DateTime<Utc>,
    },
    Unpark {
        vehicle: String,
        at: DateTime<Utc>,
    },
}

impl ScenarioEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Park { at, .. } | Self::Unpark { at, .. } => *at,
        }
    }
}

/// What happened to one replayed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Parked {
        vehicle: String,
        slot_id: SlotId,
        slot_class: SizeClass,
        entered_at: DateTime<Utc>,
    },
    Unparked(Receipt),
    Failed {
        vehicle: String,
        error: String,
    },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Replay every event against `service`, moving `clock` to each event's
/// instant first. Failures are recorded and the replay carries on.
pub async fn replay(
    service: &ParkingService,
    clock: &ManualClock,
    scenario: &Scenario,
) -> Vec<EventOutcome> {
    let mut outcomes = Vec::with_capacity(scenario.events.len());

    for event in &scenario.events {
        clock.set(event.at());

        let outcome = match event {
            ScenarioEvent::Park {
                vehicle,
                class,
                entry,
                ..
            } => match service.park(&Vehicle::new(vehicle.as_str(), *class), *entry).await {
                Ok(session) => EventOutcome::Parked {
                    vehicle: vehicle.clone(),
                    slot_id: session.slot_id,
                    slot_class: session.slot_class,
                    entered_at: session.entered_at,
                },
                Err(e) => {
                    warn!(vehicle = vehicle.as_str(), error = %e, "Park rejected");
                    EventOutcome::Failed {
                        vehicle: vehicle.clone(),
                        error: e.to_string(),
                    }
                }
            },
            ScenarioEvent::Unpark { vehicle, .. } => {
                match service.unpark(&VehicleId::new(vehicle.as_str())).await {
                    Ok(receipt) => EventOutcome::Unparked(receipt),
                    Err(e) => {
                        warn!(vehicle = vehicle.as_str(), error = %e, "Unpark rejected");
                        EventOutcome::Failed {
                            vehicle: vehicle.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            }
        };
        outcomes.push(outcome);
    }

    info!(events = outcomes.len(), "Scenario replayed");
    outcomes
}

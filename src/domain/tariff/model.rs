//! Fee schedule for parking stays

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::slot::SizeClass;
use crate::support::errors::{LotError, LotResult};

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Pricing rules for a lot.
///
/// A stay of up to `flat_hours` costs `flat_fee`. Every hour beyond that is
/// charged at the hourly rate of the slot class. Stays longer than
/// `day_hours` pay `day_rate` per full day and the remainder is priced by the
/// first two rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub flat_fee: u64,
    pub flat_hours: u32,
    pub hourly_small: u64,
    pub hourly_medium: u64,
    pub hourly_large: u64,
    /// Flat charge per full day, independent of slot class
    pub day_rate: u64,
    pub day_hours: u32,
    /// Re-entry within this many minutes of the last exit continues the stay
    pub continuous_grace_minutes: i64,
    /// Currency code used when formatting amounts
    pub currency: String,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            flat_fee: 40,
            flat_hours: 3,
            hourly_small: 20,
            hourly_medium: 60,
            hourly_large: 100,
            day_rate: 5000,
            day_hours: 24,
            continuous_grace_minutes: 60,
            currency: "PHP".to_string(),
        }
    }
}

impl FeeSchedule {
    pub fn hourly_rate(&self, class: SizeClass) -> u64 {
        match class {
            SizeClass::Small => self.hourly_small,
            SizeClass::Medium => self.hourly_medium,
            SizeClass::Large => self.hourly_large,
        }
    }

    /// Grace period for re-entry; an unrepresentable value yields none
    pub fn continuous_grace(&self) -> Duration {
        Duration::try_minutes(self.continuous_grace_minutes).unwrap_or_else(Duration::zero)
    }

    /// Reject schedules the fee rules cannot apply
    pub fn validate(&self) -> LotResult<()> {
        match Duration::try_minutes(self.continuous_grace_minutes) {
            Some(grace) if grace >= Duration::zero() => Ok(()),
            _ => Err(LotError::Construction(format!(
                "continuous_grace_minutes {} out of range",
                self.continuous_grace_minutes
            ))),
        }
    }

    /// Fee for a stay of `hours` billable hours in a slot of `class`.
    ///
    /// Zero hours is priced as the flat fee.
    pub fn calculate_fee(&self, class: SizeClass, hours: u32) -> u64 {
        self.calculate_breakdown(class, hours).total
    }

    /// Calculate detailed fee breakdown
    pub fn calculate_breakdown(&self, class: SizeClass, hours: u32) -> FeeBreakdown {
        let (days, remainder) = if self.day_hours > 0 && hours > self.day_hours {
            (hours / self.day_hours, hours % self.day_hours)
        } else {
            (0, hours)
        };

        let excess_hours = remainder.saturating_sub(self.flat_hours);
        let day_charge = u64::from(days).saturating_mul(self.day_rate);
        let hourly_charge = u64::from(excess_hours).saturating_mul(self.hourly_rate(class));

        FeeBreakdown {
            hours,
            days,
            day_charge,
            flat_fee: self.flat_fee,
            excess_hours,
            hourly_charge,
            total: day_charge
                .saturating_add(self.flat_fee)
                .saturating_add(hourly_charge),
        }
    }

    /// Format an amount as human-readable string
    pub fn format_fee(&self, amount: u64) -> String {
        format!("{} {}", amount, self.currency)
    }
}

/// Fee breakdown for a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub hours: u32,
    pub days: u32,
    pub day_charge: u64,
    pub flat_fee: u64,
    pub excess_hours: u32,
    pub hourly_charge: u64,
    pub total: u64,
}

/// Elapsed time between two instants in whole hours, rounded up.
///
/// Returns `None` when `exited_at` precedes `entered_at`.
pub fn billable_hours(entered_at: DateTime<Utc>, exited_at: DateTime<Utc>) -> Option<u32> {
    let millis = (exited_at - entered_at).num_milliseconds();
    if millis < 0 {
        return None;
    }
    let hours = (millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
    u32::try_from(hours).ok()
}

// ── Tests ──────────────────────────────────────────────────────

//! Core simulation types: engine state, snapshots, and display labels.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Decimal places used for the persisted snapshot and log rows.
pub const PERSIST_DECIMALS: u32 = 3;

/// Rounds `value` to `decimals` places (half away from zero).
///
/// # Examples
///
/// ```
/// use bess_sim::sim::types::round_to;
///
/// assert_eq!(round_to(24.59777, 3), 24.598);
/// assert_eq!(round_to(19.995, 0), 20.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// The single mutable record shared by all periodic tasks.
///
/// Only [`Engine`](super::engine::Engine) mutates it; every transition
/// updates all affected fields in one call.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Current electricity price (ct per kWh).
    pub price: f64,
    /// Energy currently held by the battery (kWh).
    pub stored_energy: f64,
    /// Whether the last controller update ran the charging branch.
    pub charging: bool,
    /// Facility consumption accumulated since start or the last reset (kWh).
    pub total_consumption: f64,
    /// Facility draw per tick (kWh), fixed for the process lifetime.
    pub facility_consumption_rate: f64,
    /// Monotonic reference for the override window.
    pub started_at: Instant,
}

impl EngineState {
    /// Creates a fresh state at the given price and stored energy.
    pub fn new(price: f64, stored_energy: f64, facility_consumption_rate: f64) -> Self {
        Self {
            price,
            stored_energy,
            charging: false,
            total_consumption: 0.0,
            facility_consumption_rate,
            started_at: Instant::now(),
        }
    }
}

/// "On"/"Off" rendering of the charging flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingLabels {
    /// Label shown while charging.
    pub on: String,
    /// Label shown otherwise.
    pub off: String,
}

impl ChargingLabels {
    /// Returns the label for `charging`.
    pub fn label(&self, charging: bool) -> &str {
        if charging { &self.on } else { &self.off }
    }
}

impl Default for ChargingLabels {
    fn default() -> Self {
        Self {
            on: "Ein".to_string(),
            off: "Aus".to_string(),
        }
    }
}

/// Point-in-time copy of the engine state, taken under the engine lock.
///
/// Unrounded; the persistence and API layers round to their own precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Current price.
    pub price: f64,
    /// Charging flag.
    pub charging: bool,
    /// Stored energy (kWh).
    pub stored_energy: f64,
    /// Stored energy as a percentage of total capacity.
    pub stored_energy_percent: f64,
    /// Facility draw per tick (kWh).
    pub facility_consumption_rate: f64,
    /// Accumulated facility consumption (kWh).
    pub total_consumption: f64,
}

/// Serialized form of a [`Snapshot`], shared by the state file and the status API.
///
/// Field names match the dashboard contract of the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Price (ct per kWh).
    pub current_price: f64,
    /// Charging label.
    pub charging: String,
    /// Stored energy (kWh).
    pub battery_capacity_kwh: f64,
    /// Stored energy (% of capacity).
    pub battery_capacity_percent: f64,
    /// Facility draw per tick (kWh).
    #[serde(default)]
    pub facility_consumption_rate: f64,
    /// Accumulated facility consumption (kWh).
    #[serde(default)]
    pub total_consumption_kwh: f64,
}

impl Snapshot {
    /// Renders the snapshot with every numeric field rounded to `decimals`.
    pub fn to_record(&self, labels: &ChargingLabels, decimals: u32) -> SnapshotRecord {
        SnapshotRecord {
            current_price: round_to(self.price, decimals),
            charging: labels.label(self.charging).to_string(),
            battery_capacity_kwh: round_to(self.stored_energy, decimals),
            battery_capacity_percent: round_to(self.stored_energy_percent, decimals),
            facility_consumption_rate: round_to(self.facility_consumption_rate, decimals),
            total_consumption_kwh: round_to(self.total_consumption, decimals),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "price={:>6.2} ct | stored={:>8.3} kWh ({:>5.1}%) | charging={} | \
             consumption={:.3} kWh (rate={:.4}/tick)",
            self.price,
            self.stored_energy,
            self.stored_energy_percent,
            self.charging,
            self.total_consumption,
            self.facility_consumption_rate,
        )
    }
}

//! Price-threshold charge/discharge controller.

use super::types::EngineState;

/// Seconds per hour; one tick is one second of simulated operation.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// How site consumption interacts with charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadModel {
    /// Facility draw is subtracted from every charging step and accumulated
    /// every tick. `charging` stays true while the price is below threshold,
    /// even at full capacity.
    Facility,
    /// No site consumption. Charging stops (and `charging` turns false) once
    /// the battery is full.
    Standalone,
}

/// Converts a current/voltage pair into energy per one-second tick.
///
/// `power = current * voltage * power_scale`, `rate = power / 3600`.
/// A `power_scale` of `0.001` expresses the rate in kWh when current and
/// voltage are in A and V.
///
/// # Examples
///
/// ```
/// use bess_sim::sim::controller::rate_per_tick;
///
/// let rate = rate_per_tick(25.0, 230.0, 1.0);
/// assert!((rate - 1.597).abs() < 1e-3);
/// ```
pub fn rate_per_tick(current_a: f64, voltage_v: f64, power_scale: f64) -> f64 {
    current_a * voltage_v * power_scale / SECONDS_PER_HOUR
}

/// Battery controller applying the price-threshold policy once per tick.
#[derive(Debug, Clone)]
pub struct BatteryController {
    /// Total capacity (kWh); upper bound for stored energy.
    pub capacity_max: f64,
    /// Reserve floor (kWh); lower bound for stored energy.
    pub capacity_min: f64,
    /// Prices strictly below this charge the battery.
    pub charge_threshold: f64,
    /// Energy added per charging tick.
    pub charge_rate: f64,
    /// Energy removed per discharging tick.
    pub discharge_rate: f64,
    /// Site consumption model.
    pub load_model: LoadModel,
}

impl BatteryController {
    /// Creates a controller.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Total capacity (must be > 0)
    /// * `reserve_fraction` - Fraction of capacity never discharged below (0.0..1.0)
    /// * `charge_threshold` - Price below which the battery charges
    /// * `rate` - Charge and discharge energy per tick
    /// * `load_model` - Site consumption model
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive or the reserve fraction is out of range.
    pub fn new(
        capacity_kwh: f64,
        reserve_fraction: f64,
        charge_threshold: f64,
        rate: f64,
        load_model: LoadModel,
    ) -> Self {
        assert!(capacity_kwh > 0.0, "capacity must be > 0");
        assert!(
            (0.0..1.0).contains(&reserve_fraction),
            "reserve fraction must be in [0, 1)"
        );
        Self {
            capacity_max: capacity_kwh,
            capacity_min: capacity_kwh * reserve_fraction,
            charge_threshold,
            charge_rate: rate,
            discharge_rate: rate,
            load_model,
        }
    }

    /// Clamps an energy value into the allowed band.
    pub fn clamp_energy(&self, energy: f64) -> f64 {
        energy.clamp(self.capacity_min, self.capacity_max)
    }

    /// Stored energy as a percentage of total capacity.
    pub fn percent(&self, energy: f64) -> f64 {
        energy / self.capacity_max * 100.0
    }

    /// Applies one tick of the policy to `state`, using the already-updated price.
    pub fn apply(&self, state: &mut EngineState) {
        if state.price < self.charge_threshold {
            self.charge(state);
        } else {
            state.stored_energy = self.clamp_energy(state.stored_energy - self.discharge_rate);
            state.charging = false;
        }

        if self.load_model == LoadModel::Facility {
            state.total_consumption += state.facility_consumption_rate;
        }
    }

    fn charge(&self, state: &mut EngineState) {
        match self.load_model {
            LoadModel::Facility => {
                let net = self.charge_rate - state.facility_consumption_rate;
                state.stored_energy = self.clamp_energy(state.stored_energy + net);
                state.charging = true;
            }
            LoadModel::Standalone => {
                if state.stored_energy < self.capacity_max {
                    state.stored_energy = self.clamp_energy(state.stored_energy + self.charge_rate);
                    state.charging = true;
                } else {
                    state.charging = false;
                }
            }
        }
    }
}

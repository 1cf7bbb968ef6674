//! Simulation engine that owns the shared state and applies every transition.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::sync::Mutex;

use super::controller::BatteryController;
use super::price::PriceProcess;
use super::types::{EngineState, Snapshot};

/// Engine handle shared between the periodic tasks and the status API.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Owns [`EngineState`] together with the price process and controller.
///
/// Each public mutating method is one complete transition; callers hold the
/// lock for the duration of the call, so readers never observe a half-applied
/// update.
pub struct Engine {
    state: EngineState,
    price: PriceProcess,
    controller: BatteryController,
}

impl Engine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `price` - Price process (also supplies the initial price)
    /// * `controller` - Battery controller
    /// * `restored_energy` - Stored energy recovered from the state file, if any
    /// * `facility_consumption_rate` - Facility draw per tick
    pub fn new(
        mut price: PriceProcess,
        controller: BatteryController,
        restored_energy: Option<f64>,
        facility_consumption_rate: f64,
    ) -> Self {
        let stored = restored_energy
            .filter(|e| e.is_finite())
            .map_or(controller.capacity_min, |e| controller.clamp_energy(e));
        let initial_price = price.initial_price();
        Self {
            state: EngineState::new(initial_price, stored, facility_consumption_rate),
            price,
            controller,
        }
    }

    /// Wraps the engine for sharing across tasks.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// Runs one price/battery tick using time elapsed since start.
    pub fn tick(&mut self) {
        let elapsed = self.state.started_at.elapsed();
        self.tick_at(elapsed);
    }

    /// Runs one price/battery tick as if `elapsed` had passed since start.
    pub fn tick_at(&mut self, elapsed: Duration) {
        self.state.price = self.price.next_price(self.state.price, elapsed);
        self.controller.apply(&mut self.state);
        tracing::trace!(
            price = self.state.price,
            stored = self.state.stored_energy,
            charging = self.state.charging,
            "tick"
        );
    }

    /// Returns stored energy to the reserve floor and clears consumption.
    pub fn reset_to_baseline(&mut self) {
        self.state.stored_energy = self.controller.capacity_min;
        self.state.total_consumption = 0.0;
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            price: self.state.price,
            charging: self.state.charging,
            stored_energy: self.state.stored_energy,
            stored_energy_percent: self.controller.percent(self.state.stored_energy),
            facility_consumption_rate: self.state.facility_consumption_rate,
            total_consumption: self.state.total_consumption,
        }
    }

    /// Read access to the raw state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Read access to the controller parameters.
    pub fn controller(&self) -> &BatteryController {
        &self.controller
    }
}

/// Draws the fixed facility draw per tick from `[min, max]`.
///
/// Returns `0.0` when the range is empty or non-positive.
pub fn draw_facility_rate(min: f64, max: f64, seed: Option<u64>) -> f64 {
    if max <= 0.0 || min > max {
        return 0.0;
    }
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    rng.random_range(min.max(0.0)..=max)
}

//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use bess_sim::config::SimulatorConfig;
use bess_sim::sim::controller::{BatteryController, LoadModel, rate_per_tick};
use bess_sim::sim::engine::Engine;
use bess_sim::sim::price::{OverrideWindow, PriceProcess};

/// Default fixed seed for reproducible runs.
pub const SEED: u64 = 42;

/// Default override window (20 ct for the first 3 of every 10 minutes).
pub fn default_window() -> OverrideWindow {
    OverrideWindow {
        period_secs: 600,
        window_secs: 180,
        price: 20.0,
    }
}

/// Price process with 15..40 bounds and the given drift.
pub fn price_process(max_change: f64) -> PriceProcess {
    PriceProcess::new(15.0, 40.0, max_change, default_window(), Some(SEED))
}

/// 230 kWh battery, 10 % reserve, 25 ct threshold, 25 A / 230 V unit-scaled rate.
pub fn controller(load_model: LoadModel) -> BatteryController {
    BatteryController::new(
        230.0,
        0.1,
        25.0,
        rate_per_tick(25.0, 230.0, 1.0),
        load_model,
    )
}

/// Facility-load engine with the given starting energy and per-tick draw.
pub fn facility_engine(restored: Option<f64>, facility_rate: f64) -> Engine {
    Engine::new(
        price_process(1.0),
        controller(LoadModel::Facility),
        restored,
        facility_rate,
    )
}

/// Facility preset with storage redirected into `dir`.
pub fn facility_config_in(dir: &std::path::Path) -> SimulatorConfig {
    let mut cfg = SimulatorConfig::facility();
    cfg.simulation.seed = Some(SEED);
    cfg.storage.state_path = dir.join("state.json");
    cfg.storage.log_path = dir.join("log.csv");
    cfg
}

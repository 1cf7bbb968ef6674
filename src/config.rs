//! TOML-based simulator configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sim::controller::{LoadModel, rate_per_tick};
use crate::sim::price::OverrideWindow;
use crate::sim::types::ChargingLabels;

/// Top-level simulator configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML
/// with [`SimulatorConfig::from_toml_file`] or use
/// [`SimulatorConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Task cadence and random seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Price process parameters.
    #[serde(default)]
    pub price: PriceConfig,
    /// Battery and controller parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Facility consumption parameters.
    #[serde(default)]
    pub facility: FacilityConfig,
    /// Daily reset time.
    #[serde(default)]
    pub reset: ResetConfig,
    /// State file and event log locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Status rendering.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Task cadence and random seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Random seed; absent seeds from OS entropy.
    pub seed: Option<u64>,
    /// Price/battery tick interval (seconds). Rates are per second, so only `1` validates.
    pub tick_interval_secs: u64,
    /// Event-log and snapshot interval (seconds).
    pub log_interval_secs: u64,
    /// Reset-check interval (seconds).
    pub reset_check_interval_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_secs: 1,
            log_interval_secs: 60,
            reset_check_interval_secs: 10,
        }
    }
}

/// Price process parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceConfig {
    /// Lower price bound (ct).
    pub min: f64,
    /// Upper price bound (ct).
    pub max: f64,
    /// Maximum fractional change per minute (0.4 = 40 %).
    pub max_fractional_change_per_minute: f64,
    /// Price forced during the override window (ct).
    pub override_price: f64,
    /// Override cycle length (seconds).
    pub override_period_secs: u64,
    /// Override window length at the start of each cycle (seconds).
    pub override_window_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            min: 15.0,
            max: 40.0,
            max_fractional_change_per_minute: 0.4,
            override_price: 20.0,
            override_period_secs: 600,
            override_window_secs: 180,
        }
    }
}

impl PriceConfig {
    /// Builds the override window.
    pub fn override_window(&self) -> OverrideWindow {
        OverrideWindow {
            period_secs: self.override_period_secs,
            window_secs: self.override_window_secs,
            price: self.override_price,
        }
    }
}

/// Battery and controller parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh).
    pub capacity_kwh: f64,
    /// Fraction of capacity never discharged below (0.0..1.0).
    pub reserve_fraction: f64,
    /// Prices strictly below this charge the battery (ct).
    pub charge_threshold: f64,
    /// Charge/discharge current (A).
    pub charge_current_a: f64,
    /// Operating voltage (V).
    pub voltage_v: f64,
    /// Multiplier from `A * V` to the energy unit per hour.
    pub power_scale: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 230.0,
            reserve_fraction: 0.10,
            charge_threshold: 25.0,
            charge_current_a: 25.0,
            voltage_v: 230.0,
            power_scale: 0.001,
        }
    }
}

impl BatteryConfig {
    /// Charge/discharge energy per tick.
    pub fn rate_per_tick(&self) -> f64 {
        rate_per_tick(self.charge_current_a, self.voltage_v, self.power_scale)
    }
}

/// Facility consumption parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacilityConfig {
    /// Subtract and accumulate site consumption.
    pub enabled: bool,
    /// Lower bound of the per-tick draw, sampled once at start (kWh).
    pub min_rate_per_tick: f64,
    /// Upper bound of the per-tick draw (kWh).
    pub max_rate_per_tick: f64,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_rate_per_tick: 0.0,
            max_rate_per_tick: 0.0,
        }
    }
}

impl FacilityConfig {
    /// Controller load model implied by `enabled`.
    pub fn load_model(&self) -> LoadModel {
        if self.enabled {
            LoadModel::Facility
        } else {
            LoadModel::Standalone
        }
    }
}

/// Daily reset time (local wall clock).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResetConfig {
    /// Target hour (0..24).
    pub hour: u32,
    /// Target minute (0..60).
    pub minute: u32,
    /// Minimum time between two resets (seconds).
    pub cooldown_secs: u64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            hour: 0,
            minute: 15,
            cooldown_secs: 60,
        }
    }
}

/// State file and event log locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// JSON snapshot file.
    pub state_path: PathBuf,
    /// CSV event log.
    pub log_path: PathBuf,
    /// Include consumption columns in the log.
    pub log_consumption: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("battery_state.json"),
            log_path: PathBuf::from("battery_log.csv"),
            log_consumption: false,
        }
    }
}

/// Status rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Label while charging.
    pub charging_on: String,
    /// Label otherwise.
    pub charging_off: String,
    /// Decimal places in status responses.
    pub decimals: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            charging_on: "Ein".to_string(),
            charging_off: "Aus".to_string(),
            decimals: 2,
        }
    }
}

impl DisplayConfig {
    /// Charging labels for snapshots, logs and responses.
    pub fn labels(&self) -> ChargingLabels {
        ChargingLabels {
            on: self.charging_on.clone(),
            off: self.charging_off.clone(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn err(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError {
        field: field.to_string(),
        message: message.into(),
    }
}

impl SimulatorConfig {
    /// Returns the baseline preset: standalone battery, kW-scaled 25 A / 230 V
    /// rate, 40 % per minute price drift, reset at 00:15.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            price: PriceConfig::default(),
            battery: BatteryConfig::default(),
            facility: FacilityConfig::default(),
            reset: ResetConfig::default(),
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
        }
    }

    /// Returns the facility preset: site consumption on, unit power scale,
    /// 100 % per minute price drift, reset at 10:30, consumption logged.
    pub fn facility() -> Self {
        Self {
            price: PriceConfig {
                max_fractional_change_per_minute: 1.0,
                ..PriceConfig::default()
            },
            battery: BatteryConfig {
                power_scale: 1.0,
                ..BatteryConfig::default()
            },
            facility: FacilityConfig {
                enabled: true,
                min_rate_per_tick: 0.2,
                max_rate_per_tick: 0.8,
            },
            reset: ResetConfig {
                hour: 10,
                minute: 30,
                ..ResetConfig::default()
            },
            storage: StorageConfig {
                log_consumption: true,
                ..StorageConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "facility"];

    /// Loads configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "facility" => Ok(Self::facility()),
            _ => Err(err(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| err("config", format!("cannot read \"{}\": {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| err("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        for (field, v) in [
            ("simulation.tick_interval_secs", s.tick_interval_secs),
            ("simulation.log_interval_secs", s.log_interval_secs),
            ("simulation.reset_check_interval_secs", s.reset_check_interval_secs),
        ] {
            if v == 0 {
                errors.push(err(field, "must be > 0"));
            }
        }
        // charge and facility rates are expressed per one-second tick
        if s.tick_interval_secs > 1 {
            errors.push(err("simulation.tick_interval_secs", "must be 1"));
        }

        let p = &self.price;
        if !(p.min > 0.0) {
            errors.push(err("price.min", "must be > 0"));
        }
        if !(p.min < p.max) {
            errors.push(err("price.max", "must be > price.min"));
        }
        if !(p.max_fractional_change_per_minute >= 0.0) {
            errors.push(err("price.max_fractional_change_per_minute", "must be >= 0"));
        }
        if !(p.min..=p.max).contains(&p.override_price) {
            errors.push(err("price.override_price", "must be within [price.min, price.max]"));
        }
        if p.override_period_secs > 0 && p.override_window_secs > p.override_period_secs {
            errors.push(err(
                "price.override_window_secs",
                "must be <= price.override_period_secs",
            ));
        }

        let b = &self.battery;
        if !(b.capacity_kwh > 0.0) {
            errors.push(err("battery.capacity_kwh", "must be > 0"));
        }
        if !(0.0..1.0).contains(&b.reserve_fraction) {
            errors.push(err("battery.reserve_fraction", "must be in [0.0, 1.0)"));
        }
        if !(b.charge_current_a >= 0.0) {
            errors.push(err("battery.charge_current_a", "must be >= 0"));
        }
        if !(b.voltage_v >= 0.0) {
            errors.push(err("battery.voltage_v", "must be >= 0"));
        }
        if !(b.power_scale > 0.0) {
            errors.push(err("battery.power_scale", "must be > 0"));
        }

        let f = &self.facility;
        if !(f.min_rate_per_tick >= 0.0) {
            errors.push(err("facility.min_rate_per_tick", "must be >= 0"));
        }
        if !(f.min_rate_per_tick <= f.max_rate_per_tick) {
            errors.push(err(
                "facility.min_rate_per_tick",
                "must be <= facility.max_rate_per_tick",
            ));
        }

        let r = &self.reset;
        if r.hour >= 24 {
            errors.push(err("reset.hour", "must be < 24"));
        }
        if r.minute >= 60 {
            errors.push(err("reset.minute", "must be < 60"));
        }
        if !(60..=86_400).contains(&r.cooldown_secs) {
            errors.push(err("reset.cooldown_secs", "must be in [60, 86400]"));
        }

        if self.display.decimals > 6 {
            errors.push(err("display.decimals", "must be <= 6"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = SimulatorConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in SimulatorConfig::PRESETS {
            let cfg = SimulatorConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let e = SimulatorConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn baseline_rate_is_kw_scaled() {
        let rate = SimulatorConfig::baseline().battery.rate_per_tick();
        assert!((rate - 5.75 / 3600.0).abs() < 1e-12);
        assert_eq!(
            SimulatorConfig::baseline().facility.load_model(),
            LoadModel::Standalone
        );
    }

    #[test]
    fn facility_preset_differs_from_baseline() {
        let cfg = SimulatorConfig::facility();
        assert_eq!(cfg.facility.load_model(), LoadModel::Facility);
        assert_eq!(cfg.price.max_fractional_change_per_minute, 1.0);
        assert_eq!((cfg.reset.hour, cfg.reset.minute), (10, 30));
        assert!(cfg.storage.log_consumption);
        assert!((cfg.battery.rate_per_tick() - 1.597).abs() < 1e-3);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
seed = 7
tick_interval_secs = 1
log_interval_secs = 30
reset_check_interval_secs = 5

[price]
min = 10.0
max = 50.0
max_fractional_change_per_minute = 1.0
override_price = 20.0
override_period_secs = 600
override_window_secs = 180

[battery]
capacity_kwh = 100.0
reserve_fraction = 0.2
charge_threshold = 22.0
charge_current_a = 16.0
voltage_v = 400.0
power_scale = 0.001

[facility]
enabled = true
min_rate_per_tick = 0.001
max_rate_per_tick = 0.002

[reset]
hour = 3
minute = 0
cooldown_secs = 90

[storage]
state_path = "/tmp/state.json"
log_path = "/tmp/log.csv"
log_consumption = true

[display]
charging_on = "On"
charging_off = "Off"
decimals = 3
"#;
        let cfg = SimulatorConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(Some(7)));
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_kwh), Some(100.0));
        assert_eq!(
            cfg.as_ref().map(|c| c.display.labels().on),
            Some("On".to_string())
        );
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_kwh = 10.0
bogus_field = true
"#;
        assert!(SimulatorConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[reset]
hour = 10
minute = 30
"#;
        let cfg = SimulatorConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.reset.hour), Some(10));
        assert_eq!(cfg.as_ref().map(|c| c.reset.cooldown_secs), Some(60));
        assert_eq!(cfg.as_ref().map(|c| c.price.max), Some(40.0));
        assert_eq!(cfg.as_ref().and_then(|c| c.simulation.seed), None);
    }

    #[test]
    fn validation_catches_bad_reserve() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.battery.reserve_fraction = 1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.reserve_fraction"));
    }

    #[test]
    fn validation_catches_inverted_price_bounds() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.price.min = 40.0;
        cfg.price.max = 15.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "price.max"));
        assert!(errors.iter().any(|e| e.field == "price.override_price"));
    }

    #[test]
    fn validation_catches_bad_reset_time() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.reset.hour = 24;
        cfg.reset.minute = 60;
        cfg.reset.cooldown_secs = 10;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"reset.hour".to_string()));
        assert!(fields.contains(&"reset.minute".to_string()));
        assert!(fields.contains(&"reset.cooldown_secs".to_string()));
    }

    #[test]
    fn validation_catches_zero_interval() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.simulation.log_interval_secs = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.log_interval_secs"));
    }

    #[test]
    fn validation_rejects_multi_second_tick() {
        let mut cfg = SimulatorConfig::facility();
        cfg.simulation.tick_interval_secs = 5;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "simulation.tick_interval_secs");
    }

    #[test]
    fn validation_catches_inverted_facility_range() {
        let mut cfg = SimulatorConfig::facility();
        cfg.facility.min_rate_per_tick = 1.0;
        cfg.facility.max_rate_per_tick = 0.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "facility.min_rate_per_tick"));
    }
}

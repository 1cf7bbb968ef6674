//! Simulator entry point: CLI wiring, config loading, and task startup.

use std::path::Path;
use std::process;

use bess_sim::cli::{self, CliOptions};
use bess_sim::config::SimulatorConfig;
use bess_sim::io::{EventLogger, StateStore};
use bess_sim::runtime;
use bess_sim::sim::controller::BatteryController;
use bess_sim::sim::engine::{Engine, SharedEngine, draw_facility_rate};
use bess_sim::sim::price::PriceProcess;
use bess_sim::telemetry::init_tracing;

/// Seed offset for the facility draw to avoid correlation with the price RNG.
const FACILITY_SEED_OFFSET: u64 = 57;

/// Resolves the configuration source: `--config`, then `--preset`, then baseline.
fn load_config(cli: &CliOptions) -> SimulatorConfig {
    let loaded = if let Some(ref path) = cli.config {
        SimulatorConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        SimulatorConfig::from_preset(name)
    } else {
        Ok(SimulatorConfig::baseline())
    };

    let mut cfg = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        cfg.simulation.seed = Some(seed);
    }
    if let Some(ref path) = cli.state_path {
        cfg.storage.state_path = path.clone();
    }
    if let Some(ref path) = cli.log_path {
        cfg.storage.log_path = path.clone();
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

/// Builds the engine, restoring stored energy from `store` when possible.
fn build_engine(cfg: &SimulatorConfig, store: &StateStore) -> SharedEngine {
    let seed = cfg.simulation.seed;
    let p = &cfg.price;
    let price = PriceProcess::new(
        p.min,
        p.max,
        p.max_fractional_change_per_minute,
        p.override_window(),
        seed,
    );

    let b = &cfg.battery;
    let controller = BatteryController::new(
        b.capacity_kwh,
        b.reserve_fraction,
        b.charge_threshold,
        b.rate_per_tick(),
        cfg.facility.load_model(),
    );

    let f = &cfg.facility;
    let facility_rate = if f.enabled {
        draw_facility_rate(
            f.min_rate_per_tick,
            f.max_rate_per_tick,
            seed.map(|s| s.wrapping_add(FACILITY_SEED_OFFSET)),
        )
    } else {
        0.0
    };

    let restored = store.load();
    if restored.is_none() {
        tracing::info!(
            path = %store.path().display(),
            "no usable state file, starting at reserve"
        );
    }

    let engine = Engine::new(price, controller, restored, facility_rate);
    tracing::info!(
        rate_per_tick = b.rate_per_tick(),
        facility_rate,
        snapshot = %engine.snapshot(),
        "engine initialised"
    );
    engine.into_shared()
}

async fn run(cli: CliOptions, cfg: SimulatorConfig) {
    let labels = cfg.display.labels();
    let store = StateStore::new(cfg.storage.state_path.clone(), labels.clone());
    let logger = EventLogger::new(
        cfg.storage.log_path.clone(),
        labels.clone(),
        cfg.storage.log_consumption,
    );

    let engine = build_engine(&cfg, &store);
    if let Err(e) = runtime::save_snapshot(&engine, &store).await {
        tracing::warn!(error = %e, "failed to write initial state file");
    }

    let _tasks = runtime::spawn_tasks(engine.clone(), &cfg, store, logger, runtime::local_now);

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(bess_sim::api::AppState {
            engine,
            labels,
            decimals: cfg.display.decimals,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        tokio::select! {
            served = bess_sim::api::serve(state, addr) => {
                if let Err(e) = served {
                    tracing::error!(error = %e, "status API stopped");
                    process::exit(1);
                }
            }
            _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
        }
        return;
    }

    #[cfg(not(feature = "api"))]
    if cli.serve {
        tracing::warn!("--serve ignored: built without the `api` feature");
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
    }
    tracing::info!("shutting down");
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    if cli.help {
        cli::print_usage();
        return;
    }

    init_tracing();
    let cfg = load_config(&cli);

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    rt.block_on(run(cli, cfg));
}

//! Integration tests for the status API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use bess_sim::api::{AppState, router};
use bess_sim::sim::types::ChargingLabels;

fn build_api_state(decimals: u32, labels: ChargingLabels) -> Arc<AppState> {
    let mut engine = common::facility_engine(Some(23.0), 0.0);
    engine.tick_at(Duration::from_secs(0));
    Arc::new(AppState {
        engine: engine.into_shared(),
        labels,
        decimals,
    })
}

async fn get_status(state: Arc<AppState>) -> serde_json::Value {
    let req = Request::builder()
        .uri("/get_status")
        .body(Body::empty())
        .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn status_after_one_charging_tick() {
    let json = get_status(build_api_state(3, ChargingLabels::default())).await;
    assert_eq!(json["current_price"], 20.0);
    assert_eq!(json["charging"], "Ein");
    let stored = json["battery_capacity_kwh"].as_f64().unwrap();
    assert!((stored - 24.598).abs() < 1e-2);
    let pct = json["battery_capacity_percent"].as_f64().unwrap();
    assert!(pct > 10.0 && pct < 11.0);
}

#[tokio::test]
async fn status_uses_configured_labels() {
    let labels = ChargingLabels {
        on: "On".into(),
        off: "Off".into(),
    };
    let json = get_status(build_api_state(2, labels)).await;
    assert_eq!(json["charging"], "On");
}

#[tokio::test]
async fn status_tracks_live_engine() {
    let state = build_api_state(2, ChargingLabels::default());
    let before = get_status(state.clone()).await["battery_capacity_kwh"]
        .as_f64()
        .unwrap();
    {
        let mut guard = state.engine.lock().await;
        for t in 1..11 {
            guard.tick_at(Duration::from_secs(t));
        }
    }
    let after = get_status(state).await["battery_capacity_kwh"]
        .as_f64()
        .unwrap();
    assert!(after > before);
}

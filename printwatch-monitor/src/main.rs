//! printwatch monitor - feeds one printer's MQTT report stream into the
//! state engine and serves the projected snapshot over HTTP.
//!
//! The printer reports incrementally; the engine in `printwatch-core`
//! accumulates those diffs so every HTTP read returns a complete,
//! self-consistent snapshot.

mod config;
mod health;
mod http;
mod mqtt;
mod sampler;

use anyhow::Context;
use printwatch_core::StateAccumulator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::load_config;
use crate::health::HealthTracker;
use crate::http::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let cfg = load_config().await;
    let accumulator = Arc::new(StateAccumulator::new());
    let health = HealthTracker::new();

    mqtt::spawn_mqtt_listener(accumulator.clone(), cfg.mqtt.clone(), health.clone());

    if let Some(sampler_cfg) = cfg.sampler.clone() {
        sampler::spawn_snapshot_sampler(accumulator.clone(), sampler_cfg);
    }

    let app = http::build_router(AppState {
        accumulator,
        health,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http.port));
    info!("listening on http://{addr}");
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind HTTP listener")?;
    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;
    Ok(())
}

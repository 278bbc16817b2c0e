//! Service health: uptime, ingest counters, MQTT connection status.

use printwatch_core::StateAccumulator;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Serialize)]
pub struct MonitorHealth {
    pub uptime_seconds: u64,
    pub updates_merged: u64,
    pub fragments_rejected: u64,
    pub last_update: Option<String>,
    pub mqtt_status: String,
    pub mqtt_reconnects: u32,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    mqtt_reconnects: Arc<AtomicU32>,
    fragments_rejected: Arc<AtomicU64>,
    mqtt_status: Arc<parking_lot::Mutex<String>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            mqtt_reconnects: Arc::new(AtomicU32::new(0)),
            fragments_rejected: Arc::new(AtomicU64::new(0)),
            mqtt_status: Arc::new(parking_lot::Mutex::new("connecting".to_string())),
        }
    }

    pub fn mark_mqtt_connected(&self) {
        *self.mqtt_status.lock() = "connected".to_string();
    }

    pub fn increment_reconnects(&self) {
        self.mqtt_reconnects.fetch_add(1, Ordering::Relaxed);
        *self.mqtt_status.lock() = "reconnecting".to_string();
    }

    pub fn record_rejected(&self) {
        self.fragments_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_health(&self, accumulator: &StateAccumulator) -> MonitorHealth {
        MonitorHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            updates_merged: accumulator.update_count(),
            fragments_rejected: self.fragments_rejected.load(Ordering::Relaxed),
            last_update: accumulator
                .last_update()
                .and_then(|ts| ts.format(&Rfc3339).ok()),
            mqtt_status: self.mqtt_status.lock().clone(),
            mqtt_reconnects: self.mqtt_reconnects.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_reflects_ingest_activity() {
        let tracker = HealthTracker::new();
        let acc = StateAccumulator::new();

        acc.merge(&json!({"bed_temper": 60.0})).unwrap();
        tracker.record_rejected();
        tracker.mark_mqtt_connected();

        let health = tracker.get_health(&acc);
        assert_eq!(health.updates_merged, 1);
        assert_eq!(health.fragments_rejected, 1);
        assert_eq!(health.mqtt_status, "connected");
        assert!(health.last_update.is_some());
    }

    #[test]
    fn reconnects_flip_status() {
        let tracker = HealthTracker::new();
        tracker.mark_mqtt_connected();
        tracker.increment_reconnects();

        let health = tracker.get_health(&StateAccumulator::new());
        assert_eq!(health.mqtt_reconnects, 1);
        assert_eq!(health.mqtt_status, "reconnecting");
    }
}

//! MQTT delivery boundary: feeds the printer's report stream into the
//! state engine.

use printwatch_core::StateAccumulator;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::MqttConf;
use crate::health::HealthTracker;

/// Report topic for one printer; without a serial, take whatever reports
/// the broker delivers.
pub fn report_topic(serial: &str) -> String {
    if serial.is_empty() {
        "device/+/report".to_string()
    } else {
        format!("device/{serial}/report")
    }
}

pub fn spawn_mqtt_listener(
    accumulator: Arc<StateAccumulator>,
    cfg: MqttConf,
    health: HealthTracker,
) {
    task::spawn(async move {
        let client_id = format!("printwatch-{}", Uuid::new_v4());
        let mut opts = MqttOptions::new(client_id, &cfg.host, cfg.port);
        opts.set_keep_alive(Duration::from_secs(15));
        if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
            opts.set_credentials(user.clone(), pass.clone());
        }

        let (client, mut eventloop) = AsyncClient::new(opts, 10);
        let topic = report_topic(&cfg.device_serial);
        if let Err(e) = client.subscribe(&topic, QoS::AtLeastOnce).await {
            error!("subscribe failed: {e:?}");
            return;
        }
        info!("listening for printer reports on {topic}");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => health.mark_mqtt_connected(),
                Ok(Event::Incoming(Incoming::Publish(p))) => {
                    match accumulator.merge_payload(&p.payload) {
                        Ok(()) => debug!(topic = %p.topic, "merged report fragment"),
                        Err(e) => {
                            // A bad fragment never corrupts accumulated
                            // state; count it and move on.
                            health.record_rejected();
                            warn!(topic = %p.topic, "rejected fragment: {e}");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // Accumulated state survives a disconnect; readers keep
                    // the last-known snapshot until fresh data arrives.
                    health.increment_reconnects();
                    error!("MQTT error: {e:?}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

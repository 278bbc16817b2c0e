//! Monitor configuration: YAML file with env-var override of the path.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default)]
    pub mqtt: MqttConf,
    #[serde(default)]
    pub http: HttpConf,
    /// Periodic snapshot sampling; omit the section to disable it.
    pub sampler: Option<SamplerConf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Printer serial; the report topic is `device/{serial}/report`.
    /// Empty means subscribe with a wildcard and take whatever reports.
    #[serde(default)]
    pub device_serial: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConf {
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SamplerConf {
    pub interval_secs: u64,
    pub data_dir: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            mqtt: MqttConf::default(),
            http: HttpConf::default(),
            sampler: None,
        }
    }
}

impl Default for MqttConf {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1883,
            username: None,
            password: None,
            device_serial: String::new(),
        }
    }
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

pub async fn load_config() -> MonitorConfig {
    let path = std::env::var("PRINTWATCH_CONFIG").unwrap_or_else(|_| "printwatch.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return MonitorConfig::default();
        }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            warn!("invalid config {path}: {e}, using defaults");
            MonitorConfig::default()
        })
    } else {
        warn!("no {path}, using default config");
        MonitorConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let yaml = r#"
mqtt:
  host: broker.lan
  port: 8883
  username: bblp
  password: secret
  device_serial: 01S00A000000000
http:
  port: 9090
sampler:
  interval_secs: 30
  data_dir: ./data
"#;
        let cfg: MonitorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.mqtt.host, "broker.lan");
        assert_eq!(cfg.mqtt.device_serial, "01S00A000000000");
        assert_eq!(cfg.http.port, 9090);
        assert_eq!(cfg.sampler.unwrap().interval_secs, 30);
    }

    #[test]
    fn sections_are_optional() {
        let cfg: MonitorConfig = serde_yaml::from_str("http:\n  port: 9000\n").unwrap();
        assert_eq!(cfg.http.port, 9000);
        assert_eq!(cfg.mqtt.host, "localhost");
        assert!(cfg.sampler.is_none());
    }
}

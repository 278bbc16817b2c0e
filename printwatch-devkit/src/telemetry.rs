//! Builders for the printer's report message shapes.

use serde_json::{json, Value};

/// Helper for building vendor-shaped telemetry fragments in tests.
pub struct TelemetryBuilder;

impl TelemetryBuilder {
    /// Flat progress/temperature fragment, the common push-status shape.
    pub fn push_status(nozzle: f64, bed: f64, gcode_state: &str, percent: i64) -> Value {
        json!({
            "nozzle_temper": nozzle,
            "bed_temper": bed,
            "gcode_state": gcode_state,
            "mc_percent": percent,
        })
    }

    /// Fragment touching a single AMS unit.
    pub fn ams_unit(id: &str, humidity: i64, temp: f64, trays: Vec<Value>) -> Value {
        json!({
            "ams": {
                "ams": [{
                    "id": id,
                    "humidity": humidity,
                    "temp": temp,
                    "tray": trays,
                }],
            },
        })
    }

    /// One tray entry for [`TelemetryBuilder::ams_unit`].
    pub fn tray(id: &str, material: &str, color: &str, remain: i64) -> Value {
        json!({
            "id": id,
            "tray_type": material,
            "tray_color": color,
            "remain": remain,
        })
    }

    /// Wraps a report section in the vendor `print` envelope, as the MQTT
    /// transport delivers it.
    pub fn report(section: Value) -> Value {
        json!({ "print": section })
    }

    /// A realistic first full report: the printer sends one of these after
    /// every (re)connection, before switching to sparse diffs.
    pub fn full_report() -> Value {
        Self::report(json!({
            "nozzle_temper": 220.4,
            "nozzle_target_temper": 220.0,
            "bed_temper": 55.1,
            "bed_target_temper": 55.0,
            "chamber_temper": 31.0,
            "gcode_state": "RUNNING",
            "mc_percent": 37,
            "mc_remaining_time": 84,
            "layer_num": 61,
            "total_layer_num": 199,
            "gcode_file": "benchy.3mf",
            "subtask_name": "benchy",
            "cooling_fan_speed": 70,
            "heatbreak_fan_speed": 100,
            "wifi_signal": "-41dBm",
            "print_error": 0,
            "spd_lvl": 2,
            "ams": {
                "ams_status": 768,
                "tray_now": "0",
                "ams": [{
                    "id": "0",
                    "humidity": 18,
                    "temp": 28.2,
                    "tray": [
                        {
                            "id": "0",
                            "tray_id_name": "A00-W1",
                            "tray_type": "PLA",
                            "tray_sub_brands": "PLA Basic",
                            "tray_color": "FFFFFFFF",
                            "remain": 82,
                            "tray_weight": 1000,
                            "nozzle_temp_min": 190,
                            "nozzle_temp_max": 230,
                        },
                        { "id": "1", "tray_type": "" },
                        { "id": "2", "tray_type": "" },
                        { "id": "3", "tray_type": "" },
                    ],
                }],
            },
        }))
    }
}

//! Read-side projection: accumulated raw fields to a typed snapshot.
//!
//! Projection is a pure function of the raw state. All typing, clamping
//! and validation concentrate here, so merges stay dumb and a malformed
//! value in one field never affects the rest of the snapshot.

use serde_json::{Map, Value};

use crate::raw::{id_string, RawAms, RawState, RawTray, RawUnit};
use crate::state::{AmsState, AmsUnit, GcodeState, PrinterState, Tray};

pub(crate) fn project(raw: &RawState) -> PrinterState {
    let print = &raw.print;
    let gcode_state = get_string(print, "gcode_state");
    let lifecycle = gcode_state
        .as_deref()
        .map(GcodeState::from_raw)
        .unwrap_or(GcodeState::Unknown);
    let wifi_signal = get_string(print, "wifi_signal");

    PrinterState {
        nozzle_temp: get_f64(print, "nozzle_temper"),
        nozzle_target_temp: get_f64(print, "nozzle_target_temper"),
        bed_temp: get_f64(print, "bed_temper"),
        bed_target_temp: get_f64(print, "bed_target_temper"),
        chamber_temp: get_f64(print, "chamber_temper"),
        lifecycle,
        gcode_state,
        print_percent: get_percent(print, "mc_percent"),
        remaining_time_min: get_i64(print, "mc_remaining_time"),
        layer_num: get_i64(print, "layer_num"),
        total_layer_num: get_i64(print, "total_layer_num"),
        gcode_file: get_string(print, "gcode_file"),
        subtask_name: get_string(print, "subtask_name"),
        cooling_fan_speed: get_percent(print, "cooling_fan_speed"),
        heatbreak_fan_speed: get_percent(print, "heatbreak_fan_speed"),
        wifi_signal_dbm: wifi_signal.as_deref().and_then(parse_wifi_signal),
        wifi_signal,
        print_error: get_i64(print, "print_error"),
        ams: raw.ams.as_ref().map(project_ams),
    }
}

fn project_ams(raw: &RawAms) -> AmsState {
    AmsState {
        status: get_i64(&raw.fields, "ams_status"),
        tray_now: id_string(raw.fields.get("tray_now")),
        units: raw.units.iter().map(project_unit).collect(),
    }
}

fn project_unit(raw: &RawUnit) -> AmsUnit {
    // `humidity_raw` wins over `humidity` when the firmware reported both.
    let humidity_raw =
        get_percent(&raw.fields, "humidity_raw").or_else(|| get_percent(&raw.fields, "humidity"));
    AmsUnit {
        id: raw.id.clone(),
        humidity_level: humidity_raw.map(humidity_level),
        humidity_raw,
        temp: get_f64(&raw.fields, "temp"),
        trays: raw.trays.iter().map(project_tray).collect(),
    }
}

fn project_tray(raw: &RawTray) -> Tray {
    Tray {
        id: raw.id.clone(),
        name: get_string(&raw.fields, "tray_id_name"),
        material: get_string(&raw.fields, "tray_type"),
        brand: get_string(&raw.fields, "tray_sub_brands"),
        color: get_string(&raw.fields, "tray_color"),
        remain_percent: get_percent(&raw.fields, "remain"),
        weight_g: get_i64(&raw.fields, "tray_weight"),
        nozzle_temp_min: get_i64(&raw.fields, "nozzle_temp_min"),
        nozzle_temp_max: get_i64(&raw.fields, "nozzle_temp_max"),
    }
}

/// Parses the firmware signal strength text, e.g. "-34dBm". Anything that
/// does not match projects to `None`, never a misleading zero.
fn parse_wifi_signal(raw: &str) -> Option<i32> {
    raw.trim().strip_suffix("dBm")?.parse().ok()
}

/// Dryness buckets over the raw humidity percentage, 20 points per level:
/// 0-20 => 1 (driest), 21-40 => 2, 41-60 => 3, 61-80 => 4, 81-100 => 5.
/// Callers clamp to [0,100] first.
fn humidity_level(raw_percent: u8) -> u8 {
    match raw_percent {
        0..=20 => 1,
        21..=40 => 2,
        41..=60 => 3,
        61..=80 => 4,
        _ => 5,
    }
}

/// The vendor wire mixes JSON numbers and numeric strings for the same
/// fields across firmware revisions; accept both.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn get_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    number(map.get(key)?)
}

fn get_i64(map: &Map<String, Value>, key: &str) -> Option<i64> {
    number(map.get(key)?).map(|v| v as i64)
}

/// Percent-type fields clamp to [0,100] at projection time.
fn get_percent(map: &Map<String, Value>, key: &str) -> Option<u8> {
    number(map.get(key)?).map(|v| v.clamp(0.0, 100.0).round() as u8)
}

/// The firmware reports cleared text fields as empty strings; treat those
/// as unset so readers see one notion of "unknown".
fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

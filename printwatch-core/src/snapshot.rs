//! Flattening: typed snapshot to a single-level storage record.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::state::{PrinterState, Tray};

/// Single-level record of one snapshot, suitable for time-series storage
/// or transmission.
///
/// The key set is a documented contract. Readings the printer never
/// reported serialize as null so a missing sensor stays distinguishable
/// from a zero; the AMS summary keys are omitted entirely when no AMS
/// exists, keeping records for AMS-less printers compact.
#[derive(Debug, Clone, Serialize)]
pub struct FlatSnapshot {
    /// RFC 3339 timestamp with offset.
    pub timestamp: String,

    pub nozzle_temp: Option<f64>,
    pub nozzle_target_temp: Option<f64>,
    pub bed_temp: Option<f64>,
    pub bed_target_temp: Option<f64>,
    pub chamber_temp: Option<f64>,

    pub gcode_state: Option<String>,
    pub print_percent: Option<u8>,
    pub remaining_time_min: Option<i64>,
    pub layer_num: Option<i64>,
    pub total_layer_num: Option<i64>,

    pub subtask_name: Option<String>,
    pub gcode_file: Option<String>,

    pub cooling_fan_speed: Option<u8>,
    pub heatbreak_fan_speed: Option<u8>,

    pub wifi_signal_dbm: Option<i32>,

    pub print_error: Option<i64>,
    pub has_errors: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ams_unit_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ams_status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ams_humidity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ams_humidity_raw: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ams_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filaments: Option<Vec<FilamentSummary>>,
}

/// One loaded slot in the flattened record.
#[derive(Debug, Clone, Serialize)]
pub struct FilamentSummary {
    pub slot: String,
    #[serde(rename = "type")]
    pub material: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub remain_percent: Option<u8>,
}

impl FlatSnapshot {
    /// Flattens a snapshot, stamping it with the caller-supplied time.
    pub fn from_state(state: &PrinterState, timestamp: OffsetDateTime) -> Self {
        let ams = state.ams.as_ref();
        let first_unit = ams.and_then(|a| a.units.first());
        Self {
            timestamp: timestamp.format(&Rfc3339).unwrap_or_default(),
            nozzle_temp: state.nozzle_temp,
            nozzle_target_temp: state.nozzle_target_temp,
            bed_temp: state.bed_temp,
            bed_target_temp: state.bed_target_temp,
            chamber_temp: state.chamber_temp,
            gcode_state: state.gcode_state.clone(),
            print_percent: state.print_percent,
            remaining_time_min: state.remaining_time_min,
            layer_num: state.layer_num,
            total_layer_num: state.total_layer_num,
            subtask_name: state.subtask_name.clone(),
            gcode_file: state.gcode_file.clone(),
            cooling_fan_speed: state.cooling_fan_speed,
            heatbreak_fan_speed: state.heatbreak_fan_speed,
            wifi_signal_dbm: state.wifi_signal_dbm,
            print_error: state.print_error,
            has_errors: state.has_errors(),
            ams_unit_count: ams.map(|a| a.units.len()),
            ams_status: ams.and_then(|a| a.status),
            ams_humidity: first_unit.and_then(|u| u.humidity_level),
            ams_humidity_raw: first_unit.and_then(|u| u.humidity_raw),
            ams_temp: first_unit.and_then(|u| u.temp),
            filaments: ams.map(|a| {
                a.loaded_trays()
                    .into_iter()
                    .map(FilamentSummary::from_tray)
                    .collect()
            }),
        }
    }
}

impl FilamentSummary {
    fn from_tray(tray: &Tray) -> Self {
        Self {
            // The vendor slot label only exists after an RFID read; fall
            // back to the tray id.
            slot: tray.name.clone().unwrap_or_else(|| tray.id.clone()),
            material: tray.material.clone().unwrap_or_default(),
            brand: tray.brand.clone(),
            color: tray.color.clone(),
            remain_percent: tray.remain_percent,
        }
    }
}

//! Typed printer snapshots.
//!
//! Everything here is a value object: freshly built on each projection,
//! never mutated afterwards, safe to hand across threads without
//! synchronization. Readings the printer has never reported are `None`,
//! which keeps a missing sensor distinguishable from a genuine zero.

use serde::Serialize;

/// Printer lifecycle as reported by the `gcode_state` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GcodeState {
    Idle,
    Running,
    Pause,
    Finish,
    /// Anything the firmware reports that we do not recognize, and the
    /// state before any fragment carried `gcode_state`.
    Unknown,
}

impl GcodeState {
    /// `PRINTING` is an older firmware spelling of `RUNNING`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "IDLE" => Self::Idle,
            "RUNNING" | "PRINTING" => Self::Running,
            "PAUSE" => Self::Pause,
            "FINISH" => Self::Finish,
            _ => Self::Unknown,
        }
    }
}

/// Complete projected printer state.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterState {
    pub nozzle_temp: Option<f64>,
    pub nozzle_target_temp: Option<f64>,
    pub bed_temp: Option<f64>,
    pub bed_target_temp: Option<f64>,
    pub chamber_temp: Option<f64>,

    /// Lifecycle text exactly as the firmware reported it.
    pub gcode_state: Option<String>,
    /// Typed lifecycle derived from `gcode_state`.
    pub lifecycle: GcodeState,
    pub print_percent: Option<u8>,
    pub remaining_time_min: Option<i64>,
    pub layer_num: Option<i64>,
    pub total_layer_num: Option<i64>,

    pub gcode_file: Option<String>,
    pub subtask_name: Option<String>,

    pub cooling_fan_speed: Option<u8>,
    pub heatbreak_fan_speed: Option<u8>,

    /// Signal as reported, e.g. "-34dBm".
    pub wifi_signal: Option<String>,
    /// Parsed dBm value; `None` when the text did not match the expected
    /// pattern.
    pub wifi_signal_dbm: Option<i32>,

    pub print_error: Option<i64>,

    /// Filament sub-system; `None` when no AMS data was ever reported,
    /// `Some` with an empty unit list when the section appeared but has no
    /// units yet.
    pub ams: Option<AmsState>,
}

impl PrinterState {
    pub fn is_printing(&self) -> bool {
        self.lifecycle == GcodeState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == GcodeState::Pause
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.lifecycle, GcodeState::Idle | GcodeState::Finish)
    }

    pub fn has_errors(&self) -> bool {
        self.print_error.is_some_and(|code| code != 0)
    }
}

/// Filament sub-system snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AmsState {
    pub status: Option<i64>,
    /// Id of the tray currently feeding the extruder.
    pub tray_now: Option<String>,
    /// Units in order of first appearance; ids are unique within a
    /// snapshot.
    pub units: Vec<AmsUnit>,
}

impl AmsState {
    /// Slot count across all units.
    pub fn total_trays(&self) -> usize {
        self.units.iter().map(|u| u.trays.len()).sum()
    }

    /// Trays with a known material type, in unit-then-slot order.
    pub fn loaded_trays(&self) -> Vec<&Tray> {
        self.units
            .iter()
            .flat_map(|u| &u.trays)
            .filter(|t| t.material.is_some())
            .collect()
    }
}

/// One AMS unit.
#[derive(Debug, Clone, Serialize)]
pub struct AmsUnit {
    pub id: String,
    /// Dryness bucket 1..=5 derived from `humidity_raw`; lower is drier.
    pub humidity_level: Option<u8>,
    /// Raw humidity percentage the level was derived from.
    pub humidity_raw: Option<u8>,
    /// Internal temperature in degrees Celsius.
    pub temp: Option<f64>,
    pub trays: Vec<Tray>,
}

/// One material slot of an AMS unit.
#[derive(Debug, Clone, Serialize)]
pub struct Tray {
    pub id: String,
    /// Vendor slot label, e.g. "A00-W1"; only known after an RFID read.
    pub name: Option<String>,
    /// Material type, e.g. "PLA"; `None` means the slot is empty.
    pub material: Option<String>,
    /// Brand / sub-brand label, e.g. "PLA Matte".
    pub brand: Option<String>,
    /// RGBA hex color, e.g. "FFFFFFFF".
    pub color: Option<String>,
    pub remain_percent: Option<u8>,
    pub weight_g: Option<i64>,
    pub nozzle_temp_min: Option<i64>,
    pub nozzle_temp_max: Option<i64>,
}

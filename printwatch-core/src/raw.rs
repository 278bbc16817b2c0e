//! Accumulated raw state and the merge path.
//!
//! The printer reports a diff stream: every message carries only the fields
//! that changed. `RawState` keeps the union of everything observed so far,
//! last-write-wins per field, without interpreting any value. Typing,
//! clamping and validation all happen later, at projection time, which keeps
//! a merge O(number of fields in the fragment).

use serde_json::{Map, Value};

use crate::error::MergeError;

/// Union of all vendor fields ever observed for one monitoring session.
///
/// Owned exclusively by the accumulator and never handed out to callers;
/// projection works on a clone taken under the lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawState {
    /// Flat report fields, deep-merged (nested objects merge key by key,
    /// scalars and arrays overwrite).
    pub(crate) print: Map<String, Value>,
    /// Filament sub-system, normalized by unit and tray id.
    /// `None` until an `ams` section is first observed.
    pub(crate) ams: Option<RawAms>,
}

/// Raw filament sub-system: AMS-level scalars plus units in order of first
/// appearance.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawAms {
    pub(crate) fields: Map<String, Value>,
    pub(crate) units: Vec<RawUnit>,
}

#[derive(Debug, Clone)]
pub(crate) struct RawUnit {
    pub(crate) id: String,
    pub(crate) fields: Map<String, Value>,
    pub(crate) trays: Vec<RawTray>,
}

#[derive(Debug, Clone)]
pub(crate) struct RawTray {
    pub(crate) id: String,
    pub(crate) fields: Map<String, Value>,
}

impl RawState {
    /// Applies one telemetry fragment.
    ///
    /// The fragment either applies as a whole or, when structurally
    /// invalid, not at all: shape checks run before the first mutation.
    pub(crate) fn merge(&mut self, fragment: &Value) -> Result<(), MergeError> {
        let report = unwrap_print(fragment)?;

        let ams_section = match report.get("ams") {
            Some(Value::Object(section)) => Some(section),
            Some(_) => return Err(MergeError::InvalidAms),
            None => None,
        };

        for (key, value) in report {
            if key != "ams" {
                merge_field(&mut self.print, key, value);
            }
        }
        if let Some(section) = ams_section {
            self.ams.get_or_insert_with(RawAms::default).merge(section);
        }
        Ok(())
    }
}

impl RawAms {
    /// Merges one `ams` section.
    ///
    /// The vendor may report a single unit and, inside it, a single tray;
    /// siblings not mentioned stay exactly as accumulated. Deletion is
    /// never implied by an update.
    fn merge(&mut self, section: &Map<String, Value>) {
        for (key, value) in section {
            if key != "ams" {
                merge_field(&mut self.fields, key, value);
            }
        }

        let Some(units) = section.get("ams").and_then(Value::as_array) else {
            return;
        };
        for entry in units {
            let Some(update) = entry.as_object() else { continue };
            let Some(id) = id_string(update.get("id")) else { continue };
            let pos = match self.units.iter().position(|u| u.id == id) {
                Some(pos) => pos,
                None => {
                    self.units.push(RawUnit {
                        id,
                        fields: Map::new(),
                        trays: Vec::new(),
                    });
                    self.units.len() - 1
                }
            };
            self.units[pos].merge(update);
        }
    }
}

impl RawUnit {
    fn merge(&mut self, update: &Map<String, Value>) {
        for (key, value) in update {
            if key != "id" && key != "tray" {
                merge_field(&mut self.fields, key, value);
            }
        }

        let Some(trays) = update.get("tray").and_then(Value::as_array) else {
            return;
        };
        for entry in trays {
            let Some(update) = entry.as_object() else { continue };
            let Some(id) = id_string(update.get("id")) else { continue };
            let pos = match self.trays.iter().position(|t| t.id == id) {
                Some(pos) => pos,
                None => {
                    self.trays.push(RawTray {
                        id,
                        fields: Map::new(),
                    });
                    self.trays.len() - 1
                }
            };
            for (key, value) in update {
                if key != "id" {
                    merge_field(&mut self.trays[pos].fields, key, value);
                }
            }
        }
    }
}

/// The transport wraps the report section in a `print` envelope; local
/// callers and tests usually pass the section directly. Accept both.
fn unwrap_print(fragment: &Value) -> Result<&Map<String, Value>, MergeError> {
    let object = fragment.as_object().ok_or(MergeError::NotAnObject)?;
    match object.get("print") {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Ok(object),
    }
}

/// Last-write-wins merge of one field. Nested objects merge recursively so
/// a sparse fragment never erases sibling keys; scalars and arrays
/// overwrite.
fn merge_field(base: &mut Map<String, Value>, key: &str, value: &Value) {
    match (base.get_mut(key), value) {
        (Some(Value::Object(existing)), Value::Object(update)) => {
            for (k, v) in update {
                merge_field(existing, k, v);
            }
        }
        _ => {
            base.insert(key.to_string(), value.clone());
        }
    }
}

/// Unit and tray ids arrive as strings or numbers depending on firmware
/// revision; normalize both to a string key.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged(fragments: &[Value]) -> RawState {
        let mut raw = RawState::default();
        for fragment in fragments {
            raw.merge(fragment).expect("valid fragment");
        }
        raw
    }

    #[test]
    fn rejects_non_object_fragment() {
        let mut raw = RawState::default();
        raw.merge(&json!({"nozzle_temper": 210.0})).unwrap();

        let err = raw.merge(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, MergeError::NotAnObject));
        assert_eq!(raw.print.get("nozzle_temper"), Some(&json!(210.0)));
    }

    #[test]
    fn rejects_fragment_with_bad_ams_atomically() {
        let mut raw = RawState::default();
        let err = raw
            .merge(&json!({"bed_temper": 60.0, "ams": 5}))
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidAms));
        // The flat field from the same fragment must not have been applied.
        assert!(raw.print.is_empty());
        assert!(raw.ams.is_none());
    }

    #[test]
    fn unwraps_print_envelope() {
        let raw = merged(&[json!({"print": {"mc_percent": 12}})]);
        assert_eq!(raw.print.get("mc_percent"), Some(&json!(12)));
        assert!(!raw.print.contains_key("print"));
    }

    #[test]
    fn deep_merges_nested_objects() {
        let raw = merged(&[
            json!({"upgrade_state": {"status": "IDLE", "progress": "0"}}),
            json!({"upgrade_state": {"progress": "40"}}),
        ]);
        assert_eq!(
            raw.print.get("upgrade_state"),
            Some(&json!({"status": "IDLE", "progress": "40"}))
        );
    }

    #[test]
    fn preserves_unit_order_of_first_appearance() {
        let raw = merged(&[
            json!({"ams": {"ams": [{"id": "1", "temp": 30.0}]}}),
            json!({"ams": {"ams": [{"id": "0", "temp": 28.0}]}}),
            json!({"ams": {"ams": [{"id": "1", "humidity": 40}]}}),
        ]);
        let ams = raw.ams.as_ref().unwrap();
        let ids: Vec<&str> = ams.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["1", "0"]);
        assert_eq!(ams.units[0].fields.get("temp"), Some(&json!(30.0)));
        assert_eq!(ams.units[0].fields.get("humidity"), Some(&json!(40)));
    }

    #[test]
    fn targeted_tray_update_leaves_siblings_alone() {
        let raw = merged(&[
            json!({"ams": {"ams": [{"id": "0", "tray": [
                {"id": "0", "tray_type": "PLA", "remain": 80},
                {"id": "1", "tray_type": "PETG", "remain": 55},
            ]}]}}),
            json!({"ams": {"ams": [{"id": "0", "tray": [
                {"id": "1", "remain": 54},
            ]}]}}),
        ]);
        let unit = &raw.ams.as_ref().unwrap().units[0];
        assert_eq!(unit.trays[0].fields.get("remain"), Some(&json!(80)));
        assert_eq!(unit.trays[1].fields.get("remain"), Some(&json!(54)));
        assert_eq!(unit.trays[1].fields.get("tray_type"), Some(&json!("PETG")));
    }

    #[test]
    fn numeric_ids_match_string_ids() {
        let raw = merged(&[
            json!({"ams": {"ams": [{"id": "0", "temp": 30.0}]}}),
            json!({"ams": {"ams": [{"id": 0, "humidity": 25}]}}),
        ]);
        let ams = raw.ams.as_ref().unwrap();
        assert_eq!(ams.units.len(), 1);
        assert_eq!(ams.units[0].fields.get("humidity"), Some(&json!(25)));
    }

    #[test]
    fn ams_scalars_merge_without_units() {
        let raw = merged(&[json!({"ams": {"ams_status": 768, "tray_now": "255"}})]);
        let ams = raw.ams.as_ref().unwrap();
        assert!(ams.units.is_empty());
        assert_eq!(ams.fields.get("ams_status"), Some(&json!(768)));
    }

    #[test]
    fn entries_without_id_are_ignored() {
        let raw = merged(&[json!({"ams": {"ams": [{"temp": 30.0}, {"id": "0", "temp": 31.0}]}})]);
        let ams = raw.ams.as_ref().unwrap();
        assert_eq!(ams.units.len(), 1);
        assert_eq!(ams.units[0].id, "0");
    }
}

//! End-to-end engine scenarios over the public API.

use printwatch_core::StateAccumulator;
use printwatch_devkit::TelemetryBuilder;
use serde_json::{json, Value};
use time::macros::datetime;

fn projected(fragments: &[Value]) -> Value {
    let acc = StateAccumulator::new();
    for fragment in fragments {
        acc.merge(fragment).expect("valid fragment");
    }
    serde_json::to_value(acc.project()).expect("state serializes")
}

#[test]
fn merging_the_same_fragment_twice_is_idempotent() {
    let fragment = TelemetryBuilder::push_status(220.5, 55.0, "RUNNING", 45);
    assert_eq!(
        projected(&[fragment.clone()]),
        projected(&[fragment.clone(), fragment]),
    );
}

#[test]
fn disjoint_fragments_commute() {
    let a = json!({"nozzle_temper": 220.5, "bed_temper": 55.0});
    let b = json!({"wifi_signal": "-40dBm", "mc_percent": 12});
    assert_eq!(projected(&[a.clone(), b.clone()]), projected(&[b, a]));
}

#[test]
fn disjoint_unit_and_tray_updates_commute() {
    let unit0 = TelemetryBuilder::ams_unit(
        "0",
        20,
        28.0,
        vec![TelemetryBuilder::tray("0", "PLA", "FFFFFFFF", 80)],
    );
    let unit1 = TelemetryBuilder::ams_unit(
        "1",
        35,
        30.0,
        vec![TelemetryBuilder::tray("1", "PETG", "00FF00FF", 60)],
    );

    let forward = projected(&[unit0.clone(), unit1.clone()]);
    let backward = projected(&[unit1, unit0]);

    // Unit order follows first appearance, so compare unit-by-unit.
    let units_fwd = forward["ams"]["units"].as_array().unwrap();
    let units_bwd = backward["ams"]["units"].as_array().unwrap();
    assert_eq!(units_fwd.len(), 2);
    assert_eq!(units_bwd.len(), 2);
    for unit in units_fwd {
        assert!(units_bwd.contains(unit), "missing unit: {unit}");
    }
    assert_eq!(forward["ams"]["status"], backward["ams"]["status"]);
}

#[test]
fn ams_only_fragment_keeps_top_level_fields() {
    let acc = StateAccumulator::new();
    acc.merge(&TelemetryBuilder::full_report()).unwrap();
    let before = acc.project();

    acc.merge(&TelemetryBuilder::ams_unit("0", 19, 28.4, vec![]))
        .unwrap();
    let after = acc.project();

    assert_eq!(after.nozzle_temp, before.nozzle_temp);
    assert_eq!(after.gcode_state, before.gcode_state);
    assert_eq!(after.print_percent, before.print_percent);
    assert_eq!(after.wifi_signal_dbm, before.wifi_signal_dbm);
    // And the targeted unit did move.
    assert_eq!(
        after.ams.as_ref().unwrap().units[0].humidity_raw,
        Some(19)
    );
}

#[test]
fn targeted_slot_update_touches_only_that_field() {
    let acc = StateAccumulator::new();
    acc.merge(&TelemetryBuilder::ams_unit(
        "0",
        20,
        28.0,
        vec![
            TelemetryBuilder::tray("1", "PLA", "FFFFFFFF", 80),
            TelemetryBuilder::tray("2", "PETG", "00FF00FF", 55),
        ],
    ))
    .unwrap();

    acc.merge(&json!({"ams": {"ams": [{"id": "0", "tray": [{"id": "2", "remain": 54}]}]}}))
        .unwrap();

    let state = acc.project();
    let trays = &state.ams.as_ref().unwrap().units[0].trays;
    assert_eq!(trays[0].remain_percent, Some(80));
    assert_eq!(trays[0].material.as_deref(), Some("PLA"));
    assert_eq!(trays[1].remain_percent, Some(54));
    assert_eq!(trays[1].material.as_deref(), Some("PETG"));
    assert_eq!(trays[1].color.as_deref(), Some("00FF00FF"));
}

#[test]
fn two_fragment_session_flattens_to_the_documented_record() {
    let acc = StateAccumulator::new();
    acc.merge(&json!({
        "nozzle_temper": 220.5,
        "bed_temper": 55.0,
        "gcode_state": "RUNNING",
        "mc_percent": 45,
    }))
    .unwrap();
    acc.merge(&json!({
        "ams": {"ams": [{
            "id": "0",
            "humidity": 30,
            "temp": 36.3,
            "tray": [{"id": "0", "tray_type": "PLA", "tray_color": "FFFFFFFF", "remain": 85}],
        }]},
    }))
    .unwrap();

    let flat = acc.flatten_at(datetime!(2025-06-01 10:00 UTC));
    let record = serde_json::to_value(&flat).unwrap();

    assert_eq!(record["nozzle_temp"], json!(220.5));
    assert_eq!(record["bed_temp"], json!(55.0));
    assert_eq!(record["gcode_state"], json!("RUNNING"));
    assert_eq!(record["print_percent"], json!(45));
    assert_eq!(record["ams_unit_count"], json!(1));
    assert_eq!(record["ams_humidity_raw"], json!(30));
    assert_eq!(record["ams_temp"], json!(36.3));

    let filaments = record["filaments"].as_array().unwrap();
    assert_eq!(filaments.len(), 1);
    assert_eq!(filaments[0]["slot"], json!("0"));
    assert_eq!(filaments[0]["type"], json!("PLA"));
    assert_eq!(filaments[0]["color"], json!("FFFFFFFF"));
    assert_eq!(filaments[0]["remain_percent"], json!(85));
}

#[test]
fn full_report_roundtrip_through_the_print_envelope() {
    let acc = StateAccumulator::new();
    acc.merge(&TelemetryBuilder::full_report()).unwrap();
    let state = acc.project();

    assert!(state.is_printing());
    assert!(!state.is_idle());
    assert_eq!(state.wifi_signal_dbm, Some(-41));
    assert_eq!(state.print_percent, Some(37));

    let ams = state.ams.as_ref().unwrap();
    assert_eq!(ams.total_trays(), 4);
    // Only the first slot has material loaded in the fixture.
    let loaded = ams.loaded_trays();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name.as_deref(), Some("A00-W1"));
    assert_eq!(loaded[0].nozzle_temp_max, Some(230));
}

#[test]
fn sparse_diffs_after_a_full_report_only_move_what_they_name() {
    let acc = StateAccumulator::new();
    acc.merge(&TelemetryBuilder::full_report()).unwrap();
    acc.merge(&TelemetryBuilder::report(json!({"mc_percent": 38, "layer_num": 62})))
        .unwrap();

    let state = acc.project();
    assert_eq!(state.print_percent, Some(38));
    assert_eq!(state.layer_num, Some(62));
    assert_eq!(state.total_layer_num, Some(199));
    assert_eq!(state.nozzle_temp, Some(220.4));
}

//! Serialization round-trips for the types an operator shell persists.

use gpi_control::{GaugeCalibration, PuffChannel, PuffPlan, RegulationState};

#[test]
fn puff_plan_round_trips_through_json() {
    let plan = PuffPlan {
        channels: [
            PuffChannel {
                enabled: true,
                offset_s: Some(2.5),
                duration_s: 1.0,
            },
            PuffChannel::default(),
        ],
    };

    let json = serde_json::to_string(&plan).expect("serialize");
    let back: PuffPlan = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, plan);
}

#[test]
fn disabled_channel_offset_survives_as_null() {
    let plan = PuffPlan::default();
    let json = serde_json::to_string(&plan).expect("serialize");
    assert!(json.contains("null"));
    let back: PuffPlan = serde_json::from_str(&json).expect("deserialize");
    assert!(!back.any_active());
}

#[test]
fn regulation_state_round_trips_through_json() {
    let state = RegulationState::new();
    let json = serde_json::to_string(&state).expect("serialize");
    let back: RegulationState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.mode(), state.mode());
    assert_eq!(back.desired_pressure_torr(), state.desired_pressure_torr());
}

#[test]
fn calibration_round_trips_through_json() {
    let cal = GaugeCalibration::ABSOLUTE;
    let json = serde_json::to_string(&cal).expect("serialize");
    let back: GaugeCalibration = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, cal);
}

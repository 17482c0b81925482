//! Fill and pump-down cycles driven through the controller, with raw
//! counts on the wire instead of synthetic readings.

use gpi_control::{
    Controller, GaugeCalibration, RegulationMode, ValveCommand, HISTORY_WINDOW_S, IDLE_TICK_S,
};
use gpi_core::{GaugeId, ValveId};
use gpi_hw::{AutoConfirm, BenchTransport, NullSink, StatusSink};

/// Encode a signed decoded value into the 14-bit counter format.
fn encode_raw(decoded: i16) -> u32 {
    u32::from(decoded as u16 & 0x3FFF)
}

fn controller() -> Controller<BenchTransport, AutoConfirm, NullSink> {
    Controller::new(BenchTransport::new(), AutoConfirm, NullSink)
}

#[test]
fn encode_raw_is_the_decoder_inverse() {
    for decoded in [-8192i16, -100, -1, 0, 1, 242, 8191] {
        let raw = encode_raw(decoded);
        assert_eq!(gpi_control::decode_raw(raw as u16), decoded);
    }
}

#[test]
fn fill_cycle_against_raw_counts() {
    let mut ctl = controller();

    // Decoded 61 reads as ~49.9 Torr on the absolute gauge
    ctl.transport_mut().set_abs_level(encode_raw(61));
    ctl.start_fill(100.0);

    ctl.service_tick(0.0);
    assert_eq!(ctl.regulation_mode(), RegulationMode::Filling);
    assert_eq!(ctl.desired_pressure_torr(), 100.0);
    assert_eq!(ctl.commanded(ValveId::Slow1), ValveCommand::Open);
    let reading = ctl.last_reading(GaugeId::Absolute).expect("sampled");
    assert!((reading.pressure_torr - 49.9).abs() < 0.1);

    // Decoded 231 is ~96.9 Torr: below the stop threshold, valve stays open
    ctl.transport_mut().set_abs_level(encode_raw(231));
    ctl.service_tick(0.2);
    assert_eq!(ctl.regulation_mode(), RegulationMode::Filling);
    assert_eq!(ctl.commanded(ValveId::Slow1), ValveCommand::Open);
    assert_eq!(ctl.transport().writes_to(ValveId::Slow1), 1);

    // Decoded 232 is ~97.1 Torr: past 0.97 * 100, fill closes and idles
    ctl.transport_mut().set_abs_level(encode_raw(232));
    ctl.service_tick(0.4);
    assert_eq!(ctl.regulation_mode(), RegulationMode::Idle);
    assert_eq!(ctl.commanded(ValveId::Slow1), ValveCommand::Close);
}

#[test]
fn pump_down_chains_into_refill() {
    let mut ctl = controller();

    // Complete a fill first so a target pressure is on record
    ctl.transport_mut().set_abs_level(encode_raw(232));
    ctl.start_fill(100.0);
    ctl.service_tick(0.0);
    assert_eq!(ctl.regulation_mode(), RegulationMode::Idle);

    ctl.start_pump_refill();
    assert_eq!(ctl.regulation_mode(), RegulationMode::PumpingDown);

    // Decoded -100 reads ~0.011 V, below the pumped-out threshold, but
    // the previous tick's voltage was high: pump valve opens, no exit yet
    ctl.transport_mut().set_abs_level(encode_raw(-100));
    ctl.service_tick(1.0);
    assert_eq!(ctl.regulation_mode(), RegulationMode::PumpingDown);
    assert_eq!(ctl.commanded(ValveId::Slow2), ValveCommand::Open);

    // Second consecutive low tick: close pump, chain to filling, and ask
    // for one idle-length settle tick
    let sleep = ctl.service_tick(1.2);
    assert_eq!(ctl.regulation_mode(), RegulationMode::Filling);
    assert_eq!(ctl.commanded(ValveId::Slow2), ValveCommand::Close);
    assert_eq!(sleep, IDLE_TICK_S);

    // The chained fill leg opens the fill valve on its next tick
    ctl.service_tick(2.2);
    assert_eq!(ctl.commanded(ValveId::Slow1), ValveCommand::Open);
}

#[test]
fn histories_and_sink_follow_every_tick() {
    #[derive(Default)]
    struct CountingSink {
        valve_events: usize,
        gauge_events: usize,
    }
    impl StatusSink for CountingSink {
        fn valve_changed(&mut self, _: ValveId, _: bool) {
            self.valve_events += 1;
        }
        fn gauge_reading(&mut self, _: GaugeId, _: f64) {
            self.gauge_events += 1;
        }
    }

    let mut ctl = Controller::new(BenchTransport::new(), AutoConfirm, CountingSink::default());
    for i in 0..5 {
        ctl.service_tick(i as f64);
    }
    assert_eq!(ctl.history(GaugeId::Absolute).len(), 5);
    assert_eq!(ctl.history(GaugeId::Differential).len(), 5);
    assert_eq!(ctl.diagnostics(GaugeId::Absolute).len(), 5);
    assert_eq!(ctl.sink().gauge_events, 10);
    assert_eq!(ctl.sink().valve_events, 0);

    // A raw level of zero still reads as the calibration offset
    let abs = ctl.last_reading(GaugeId::Absolute).expect("sampled");
    assert!((abs.pressure_torr - 33.05).abs() < 1e-9);
    let diff = ctl.last_reading(GaugeId::Differential).expect("sampled");
    assert!((diff.pressure_torr - 0.47).abs() < 1e-9);

    // Old entries age out relative to the newest sample
    ctl.service_tick(4.0 + HISTORY_WINDOW_S + 1.0);
    assert_eq!(ctl.history(GaugeId::Absolute).len(), 1);
}

#[test]
fn calibration_constants_match_the_gauge_input_paths() {
    assert_eq!(GaugeCalibration::ABSOLUTE.torr_per_volt, 500.0);
    assert_eq!(GaugeCalibration::DIFFERENTIAL.torr_per_volt, 10.0);
    assert_eq!(GaugeCalibration::ABSOLUTE.offset, 0.0661);
    assert_eq!(GaugeCalibration::DIFFERENTIAL.offset, 0.047);
}

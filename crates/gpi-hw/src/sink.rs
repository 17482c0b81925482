//! Presentation-side notification port.

use gpi_core::{GaugeId, ValveId};

/// Receives state changes for display. The core pushes into this sink and
/// never renders anything itself.
pub trait StatusSink {
    /// A valve's commanded state changed. `open` reflects the commanded
    /// state, not the wire level.
    fn valve_changed(&mut self, valve: ValveId, open: bool);

    /// A new calibrated gauge reading is available.
    fn gauge_reading(&mut self, gauge: GaugeId, pressure_torr: f64);
}

/// Sink that drops every notification.
#[derive(Debug, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn valve_changed(&mut self, _valve: ValveId, _open: bool) {}

    fn gauge_reading(&mut self, _gauge: GaugeId, _pressure_torr: f64) {}
}

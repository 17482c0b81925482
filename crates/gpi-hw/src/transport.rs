//! Hardware transport capability.

use gpi_core::ValveId;

/// Access to the valve trigger lines and gauge ADC channels.
///
/// Implementations fail soft: when the device is unreachable they return
/// `false`/`0` and swallow writes rather than raising into the control
/// core. A zero gauge reading is treated as legitimate data upstream.
pub trait Transport {
    /// Drive a valve trigger line. `signal` is the wire level, after any
    /// polarity handling by the caller.
    fn set_trigger(&mut self, valve: ValveId, signal: bool);

    /// Read back the wire level of a valve trigger line.
    fn get_trigger(&self, valve: ValveId) -> bool;

    /// Raw counter reading of the absolute pressure gauge channel.
    fn abs_gauge_raw(&mut self) -> u32;

    /// Raw counter reading of the differential pressure gauge channel.
    fn diff_gauge_raw(&mut self) -> u32;
}

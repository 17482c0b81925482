//! Signal conditioning for the pressure gauges.
//!
//! The acquisition card reports each gauge as a 14-bit signed counter
//! value. The conditioning chain is:
//!
//! raw counts -> decoded signed value -> measured volts -> calibrated
//! volts -> Torr
//!
//! Each stage is a pure function, so the chain is testable without
//! hardware. Per tick the raw input is the arithmetic mean of
//! [`AVERAGE_SAMPLES`] sub-samples.

use gpi_core::GaugeId;
use serde::{Deserialize, Serialize};

use gpi_hw::Transport;

/// Raw sub-samples averaged into one reading per gauge per tick.
pub const AVERAGE_SAMPLES: usize = 20;

/// FPGA timing clock period, seconds.
pub const FPGA_CLOCK_PERIOD_S: f64 = 8e-9;

const COUNTER_BITS: u32 = 14;
const SIGN_BIT: u16 = 1 << (COUNTER_BITS - 1);
const MAGNITUDE_MASK: u16 = SIGN_BIT - 1;
const FULL_SCALE: f64 = ((1u32 << COUNTER_BITS) - 1) as f64;

/// Decode the low 14 bits of a counter word as a two's-complement value.
///
/// If the sign bit (bit 13) is set, the magnitude bits are complemented,
/// reinterpreted as unsigned, negated and decremented; otherwise they are
/// the value directly. Result is always in [-8192, 8191].
pub fn decode_raw(count: u16) -> i16 {
    if count & SIGN_BIT != 0 {
        -(((!count) & MAGNITUDE_MASK) as i16) - 1
    } else {
        (count & MAGNITUDE_MASK) as i16
    }
}

/// Convert a raw (possibly averaged, hence fractional) counter reading to
/// the measured input voltage, before calibration.
pub fn raw_to_voltage(raw: f64) -> f64 {
    let count = raw.round().clamp(0.0, FULL_SCALE) as u16;
    2.0 / FULL_SCALE * f64::from(decode_raw(count))
}

/// Seconds to FPGA timing clock cycles, for programming the timing
/// registers. Informational helper for the shell.
pub fn clock_cycles(seconds: f64) -> u64 {
    (seconds / FPGA_CLOCK_PERIOD_S) as u64
}

/// Linear calibration of one gauge input path, plus the gauge's
/// volts-to-Torr scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeCalibration {
    /// Calibration offset, volts.
    pub offset: f64,
    /// Calibration slope, dimensionless.
    pub slope: f64,
    /// Gauge scale, Torr per calibrated volt.
    pub torr_per_volt: f64,
}

impl GaugeCalibration {
    /// Absolute gauge on IN 1, with its 0.252 voltage divider.
    pub const ABSOLUTE: Self = Self {
        offset: 0.0661,
        slope: 4.526,
        torr_per_volt: 500.0,
    };

    /// Differential gauge on IN 2, with its 0.342 voltage divider.
    pub const DIFFERENTIAL: Self = Self {
        offset: 0.047,
        slope: 3.329,
        torr_per_volt: 10.0,
    };

    pub fn for_gauge(gauge: GaugeId) -> Self {
        match gauge {
            GaugeId::Absolute => Self::ABSOLUTE,
            GaugeId::Differential => Self::DIFFERENTIAL,
        }
    }

    /// Calibrated voltage for a raw counter reading.
    pub fn voltage(&self, raw: f64) -> f64 {
        self.offset + self.slope * raw_to_voltage(raw)
    }

    /// Pressure in Torr for a calibrated voltage.
    pub fn pressure_torr(&self, voltage: f64) -> f64 {
        self.torr_per_volt * voltage
    }

    /// Run the full conditioning chain on a raw reading.
    pub fn reading(&self, timestamp: f64, raw: f64) -> GaugeReading {
        let voltage = self.voltage(raw);
        GaugeReading {
            timestamp,
            raw,
            voltage,
            pressure_torr: self.pressure_torr(voltage),
        }
    }
}

/// One conditioned gauge sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    /// Sample time, seconds from the control clock's epoch.
    pub timestamp: f64,
    /// Mean raw counter value over the tick's sub-samples.
    pub raw: f64,
    /// Calibrated voltage.
    pub voltage: f64,
    /// Calibrated pressure, Torr.
    pub pressure_torr: f64,
}

/// Take one tick's worth of interleaved sub-samples from both gauge
/// channels and return the (absolute, differential) raw means.
pub fn sample_raw_means<T: Transport>(transport: &mut T) -> (f64, f64) {
    let mut abs_sum = 0.0;
    let mut diff_sum = 0.0;
    for _ in 0..AVERAGE_SAMPLES {
        abs_sum += f64::from(transport.abs_gauge_raw());
        diff_sum += f64::from(transport.diff_gauge_raw());
    }
    let n = AVERAGE_SAMPLES as f64;
    (abs_sum / n, diff_sum / n)
}

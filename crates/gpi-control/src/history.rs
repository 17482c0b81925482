//! Bounded in-memory sample windows.
//!
//! [`SampleHistory`] holds the trend data shown next to each gauge: the
//! last 30 s of (timestamp, pressure) pairs, evicted by age on every push.
//! [`DiagnosticWindow`] holds the last 100 raw/voltage pairs for noise
//! diagnostics; it is not safety-critical.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Age bound of the pressure trend window, seconds.
pub const HISTORY_WINDOW_S: f64 = 30.0;

/// Capacity of the raw/voltage diagnostic window.
pub const DIAGNOSTIC_WINDOW: usize = 100;

/// Time-ordered (timestamp, Torr) pairs spanning at most the last
/// [`HISTORY_WINDOW_S`] seconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleHistory {
    samples: VecDeque<(f64, f64)>,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample and evict entries older than the window relative
    /// to the newest timestamp.
    pub fn push(&mut self, timestamp: f64, pressure_torr: f64) {
        self.samples.push_back((timestamp, pressure_torr));
        let cutoff = timestamp - HISTORY_WINDOW_S;
        while self.samples.front().is_some_and(|&(t, _)| t < cutoff) {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<(f64, f64)> {
        self.samples.back().copied()
    }

    /// Oldest-to-newest iterator over (timestamp, Torr) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().copied()
    }
}

/// Last [`DIAGNOSTIC_WINDOW`] raw counts and calibrated voltages of one
/// gauge, with relative-spread helpers for noise checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticWindow {
    raw: VecDeque<f64>,
    voltage: VecDeque<f64>,
}

impl DiagnosticWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: f64, voltage: f64) {
        push_bounded(&mut self.raw, raw);
        push_bounded(&mut self.voltage, voltage);
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// sigma/mean of the raw counts, `None` while empty or centred on zero.
    pub fn raw_relative_spread(&self) -> Option<f64> {
        relative_spread(&self.raw)
    }

    /// sigma/mean of the voltages.
    pub fn voltage_relative_spread(&self) -> Option<f64> {
        relative_spread(&self.voltage)
    }
}

fn push_bounded(window: &mut VecDeque<f64>, value: f64) {
    window.push_back(value);
    while window.len() > DIAGNOSTIC_WINDOW {
        window.pop_front();
    }
}

fn relative_spread(values: &VecDeque<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean.abs())
}

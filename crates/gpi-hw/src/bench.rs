//! In-memory transport for tests and bench work.

use std::collections::VecDeque;

use gpi_core::ValveId;

use crate::transport::Transport;

/// Scripted transport: trigger lines are latched in memory and gauge
/// channels serve queued samples, falling back to a settable steady level
/// once the queue drains.
#[derive(Debug, Default)]
pub struct BenchTransport {
    triggers: [bool; 4],
    abs_queue: VecDeque<u32>,
    diff_queue: VecDeque<u32>,
    abs_level: u32,
    diff_level: u32,
    /// Every `set_trigger` call in order, for assertions on actuation.
    pub trigger_log: Vec<(ValveId, bool)>,
}

impl BenchTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steady raw level served by the absolute gauge channel.
    pub fn set_abs_level(&mut self, raw: u32) {
        self.abs_level = raw;
    }

    /// Steady raw level served by the differential gauge channel.
    pub fn set_diff_level(&mut self, raw: u32) {
        self.diff_level = raw;
    }

    /// Queue raw samples to be served ahead of the steady level.
    pub fn push_abs_samples(&mut self, samples: impl IntoIterator<Item = u32>) {
        self.abs_queue.extend(samples);
    }

    pub fn push_diff_samples(&mut self, samples: impl IntoIterator<Item = u32>) {
        self.diff_queue.extend(samples);
    }

    /// Force a wire level directly, bypassing the command path.
    pub fn force_trigger(&mut self, valve: ValveId, signal: bool) {
        self.triggers[valve.index()] = signal;
    }

    /// Number of `set_trigger` calls seen for one valve.
    pub fn writes_to(&self, valve: ValveId) -> usize {
        self.trigger_log.iter().filter(|(v, _)| *v == valve).count()
    }
}

impl Transport for BenchTransport {
    fn set_trigger(&mut self, valve: ValveId, signal: bool) {
        self.triggers[valve.index()] = signal;
        self.trigger_log.push((valve, signal));
    }

    fn get_trigger(&self, valve: ValveId) -> bool {
        self.triggers[valve.index()]
    }

    fn abs_gauge_raw(&mut self) -> u32 {
        self.abs_queue.pop_front().unwrap_or(self.abs_level)
    }

    fn diff_gauge_raw(&mut self) -> u32 {
        self.diff_queue.pop_front().unwrap_or(self.diff_level)
    }
}

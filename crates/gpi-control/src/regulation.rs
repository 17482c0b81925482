//! Pressure regulation loop.
//!
//! One tick per sampling cycle. Filling holds V5 open until the reservoir
//! crosses the stop threshold below the target (hysteresis keeps the
//! valve from chattering near the target); pump-down holds V4 open until
//! the absolute gauge has read below the base-pressure voltage on two
//! consecutive ticks, then chains straight into a fill.

use gpi_core::ValveId;
use serde::{Deserialize, Serialize};

use gpi_hw::{StatusSink, Transport};

use crate::gauge::GaugeReading;
use crate::valves::{ValveBank, ValveCommand};

/// Tick period while a fill or pump-down cycle is active, seconds.
pub const ACTIVE_TICK_S: f64 = 0.2;

/// Tick period while idle, seconds.
pub const IDLE_TICK_S: f64 = 1.0;

/// Fraction of the target pressure at which a fill stops.
pub const FILL_STOP_FRACTION: f64 = 0.97;

/// Absolute-gauge voltage below which the reservoir counts as pumped out.
pub const PUMPED_OUT_VOLTS: f64 = 0.02;

/// Regulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegulationMode {
    #[default]
    Idle,
    Filling,
    PumpingDown,
}

/// State of the fill / pump-down regulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegulationState {
    mode: RegulationMode,
    /// Target reservoir pressure, Torr. Zero means regulation inactive.
    desired_pressure_torr: f64,
    /// Previous tick's absolute-gauge voltage, for the two-sample
    /// pumped-out test.
    last_voltage: f64,
}

impl RegulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> RegulationMode {
        self.mode
    }

    pub fn desired_pressure_torr(&self) -> f64 {
        self.desired_pressure_torr
    }

    /// Operator entry point: set the target and begin filling.
    ///
    /// No-op unless idle; an in-progress cycle is never interrupted and
    /// re-requesting the current mode changes nothing. A non-finite
    /// target is treated as zero (inactive), which the first tick aborts.
    pub fn start_fill(&mut self, desired_pressure_torr: f64) {
        if self.mode != RegulationMode::Idle {
            return;
        }
        self.desired_pressure_torr = if desired_pressure_torr.is_finite() {
            desired_pressure_torr
        } else {
            0.0
        };
        tracing::info!(target_torr = self.desired_pressure_torr, "fill requested");
        self.mode = RegulationMode::Filling;
    }

    /// Operator entry point: pump the reservoir out, then refill to the
    /// current target. No-op unless idle.
    pub fn start_pump_refill(&mut self) {
        if self.mode != RegulationMode::Idle {
            return;
        }
        tracing::info!("pump & refill requested");
        self.mode = RegulationMode::PumpingDown;
    }

    /// Run one regulation step against the tick's absolute-gauge reading.
    /// Returns the recommended sleep until the next tick.
    pub fn tick<T: Transport, S: StatusSink>(
        &mut self,
        abs: &GaugeReading,
        valves: &mut ValveBank,
        transport: &mut T,
        sink: &mut S,
    ) -> f64 {
        let mut sleep_s = match self.mode {
            RegulationMode::Idle => IDLE_TICK_S,
            _ => ACTIVE_TICK_S,
        };

        match self.mode {
            RegulationMode::Idle => {}
            RegulationMode::Filling => {
                if abs.pressure_torr <= 0.0 || self.desired_pressure_torr <= 0.0 {
                    tracing::info!(
                        pressure_torr = abs.pressure_torr,
                        target_torr = self.desired_pressure_torr,
                        "fill aborted"
                    );
                    self.mode = RegulationMode::Idle;
                } else if abs.pressure_torr > FILL_STOP_FRACTION * self.desired_pressure_torr {
                    tracing::info!(pressure_torr = abs.pressure_torr, "fill complete");
                    valves.set(transport, sink, ValveId::Slow1, ValveCommand::Close);
                    self.mode = RegulationMode::Idle;
                } else if abs.pressure_torr < self.desired_pressure_torr
                    && !valves.read_trigger(transport, ValveId::Slow1)
                {
                    valves.set(transport, sink, ValveId::Slow1, ValveCommand::Open);
                }
            }
            RegulationMode::PumpingDown => {
                if abs.pressure_torr > 0.0 && self.desired_pressure_torr > 0.0 {
                    if !valves.read_trigger(transport, ValveId::Slow2) {
                        valves.set(transport, sink, ValveId::Slow2, ValveCommand::Open);
                    }
                    if abs.voltage < PUMPED_OUT_VOLTS && self.last_voltage < PUMPED_OUT_VOLTS {
                        tracing::info!(voltage = abs.voltage, "pumped out, refilling");
                        valves.set(transport, sink, ValveId::Slow2, ValveCommand::Close);
                        self.mode = RegulationMode::Filling;
                        // One idle-length settle tick before the fill leg
                        sleep_s = IDLE_TICK_S;
                    }
                }
            }
        }

        self.last_voltage = abs.voltage;
        sleep_s
    }
}

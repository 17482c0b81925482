//! gpi-control: sequencing and regulation core for the GPI gas-injection
//! system.
//!
//! This crate is the control half of the system: the operator shell
//! (windows, dialogs, plots) and the device transport live elsewhere and
//! reach this core only through the ports defined in `gpi-hw`.
//!
//! # Architecture
//!
//! - `gauge` — signal conditioning: 14-bit counter decode, calibration,
//!   per-tick sub-sample averaging
//! - `history` — bounded pressure trend and noise-diagnostic windows
//! - `valves` — commanded-state bank with the per-valve polarity table
//! - `sequencer` — externally-ticked puff run state machine
//! - `regulation` — fill / pump-down hysteresis loop
//! - `driver` — the single [`Controller`] owner tying it all together
//!
//! # Design principles
//!
//! - **Single owner**: all mutable state lives in one [`Controller`];
//!   exclusivity between puff runs, regulation ticks and manual commands
//!   falls out of `&mut self`
//! - **Synthetic time**: every state machine is advanced by a caller
//!   supplied "now", so tests never sleep
//! - **Fail-soft inputs**: transports report zeros when hardware is
//!   gone; zero readings are data here, not errors

pub mod driver;
pub mod error;
pub mod gauge;
pub mod history;
pub mod regulation;
pub mod sequencer;
pub mod valves;

pub use driver::{Confirmation, Controller, PuffOutcome, STALL_POLL_LIMIT};
pub use error::{ControlError, ControlResult};
pub use gauge::{
    AVERAGE_SAMPLES, GaugeCalibration, GaugeReading, clock_cycles, decode_raw, raw_to_voltage,
};
pub use history::{DIAGNOSTIC_WINDOW, DiagnosticWindow, HISTORY_WINDOW_S, SampleHistory};
pub use regulation::{
    ACTIVE_TICK_S, FILL_STOP_FRACTION, IDLE_TICK_S, PUMPED_OUT_VOLTS, RegulationMode,
    RegulationState,
};
pub use sequencer::{
    ChannelPhase, OPEN_DURATION_S, PREP_LEAD_S, PuffChannel, PuffPlan, PuffRun, T1_REL_T0_S,
};
pub use valves::{ValveBank, ValveCommand};

//! Valve actuator layer.
//!
//! Translates logical open/close commands into trigger-line levels,
//! applying the per-valve polarity table, and records the commanded state
//! that indicators must display. Read-back of the trigger line is raw:
//! the wire level is reported as-is, so for the inverted V3 the read-back
//! does not mirror the commanded state. Indicators read
//! [`ValveBank::commanded`] instead.

use gpi_core::ValveId;
use serde::{Deserialize, Serialize};

use gpi_hw::{StatusSink, Transport};

/// Logical valve command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValveCommand {
    Open,
    Close,
}

impl ValveCommand {
    pub fn is_open(self) -> bool {
        matches!(self, ValveCommand::Open)
    }

    /// Verb used in operator-facing confirmation prompts.
    pub fn action_label(self) -> &'static str {
        match self {
            ValveCommand::Open => "OPENING",
            ValveCommand::Close => "CLOSING",
        }
    }
}

/// Commanded-state record for every valve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValveBank {
    commanded: [ValveCommand; 4],
}

impl Default for ValveBank {
    fn default() -> Self {
        Self {
            commanded: [ValveCommand::Close; 4],
        }
    }
}

impl ValveBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a command: compute the wire level (inverted for V3), drive
    /// the trigger line, record the commanded state and notify the
    /// status sink with the commanded (not wire) state.
    pub fn set<T: Transport, S: StatusSink>(
        &mut self,
        transport: &mut T,
        sink: &mut S,
        valve: ValveId,
        command: ValveCommand,
    ) {
        let signal = command.is_open() ^ valve.inverted_polarity();
        tracing::debug!(valve = %valve, ?command, signal, "valve command");
        transport.set_trigger(valve, signal);
        self.commanded[valve.index()] = command;
        sink.valve_changed(valve, command.is_open());
    }

    /// Last commanded state. This is what an indicator shows.
    pub fn commanded(&self, valve: ValveId) -> ValveCommand {
        self.commanded[valve.index()]
    }

    /// Raw trigger-line read-back, no polarity correction applied.
    pub fn read_trigger<T: Transport>(&self, transport: &T, valve: ValveId) -> bool {
        transport.get_trigger(valve)
    }
}

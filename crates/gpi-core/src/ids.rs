//! Closed identity enums for valves and gauges.
//!
//! The hardware exposes one fast valve and three slow valves on fixed
//! channels. Modelling them as a closed enum (instead of name strings)
//! makes every dispatch an exhaustive match and lets the wiring table
//! live in one place.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Identity of a controllable valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValveId {
    /// The fast puff valve (hardware label FV2).
    Fast1,
    /// Slow gas-feed valve (hardware label V5).
    Slow1,
    /// Slow pump-line valve (hardware label V4).
    Slow2,
    /// Slow isolation valve (hardware label V3). Wired with inverted polarity.
    Slow3,
}

impl ValveId {
    /// All valves, in wiring-table order.
    pub const ALL: [ValveId; 4] = [
        ValveId::Fast1,
        ValveId::Slow1,
        ValveId::Slow2,
        ValveId::Slow3,
    ];

    /// Hardware label as printed on the gas panel.
    pub fn label(self) -> &'static str {
        match self {
            ValveId::Fast1 => "FV2",
            ValveId::Slow1 => "V5",
            ValveId::Slow2 => "V4",
            ValveId::Slow3 => "V3",
        }
    }

    /// Whether the trigger line for this valve is wired inverted
    /// (signal 0 opens, 1 closes).
    pub fn inverted_polarity(self) -> bool {
        matches!(self, ValveId::Slow3)
    }

    /// Dense index for table storage.
    pub fn index(self) -> usize {
        match self {
            ValveId::Fast1 => 0,
            ValveId::Slow1 => 1,
            ValveId::Slow2 => 2,
            ValveId::Slow3 => 3,
        }
    }
}

impl fmt::Display for ValveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of a pressure gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeId {
    /// Absolute reservoir pressure gauge.
    Absolute,
    /// Differential pressure gauge.
    Differential,
}

impl fmt::Display for GaugeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaugeId::Absolute => f.write_str("abs"),
            GaugeId::Differential => f.write_str("diff"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valve_labels_match_wiring_table() {
        assert_eq!(ValveId::Fast1.label(), "FV2");
        assert_eq!(ValveId::Slow1.label(), "V5");
        assert_eq!(ValveId::Slow2.label(), "V4");
        assert_eq!(ValveId::Slow3.label(), "V3");
    }

    #[test]
    fn only_v3_is_inverted() {
        for valve in ValveId::ALL {
            assert_eq!(valve.inverted_polarity(), valve == ValveId::Slow3);
        }
    }

    #[test]
    fn indices_are_dense_and_unique() {
        let mut seen = [false; 4];
        for valve in ValveId::ALL {
            assert!(!seen[valve.index()]);
            seen[valve.index()] = true;
        }
    }
}

//! Fail-soft stub transport.

use gpi_core::ValveId;

use crate::transport::Transport;

/// Transport bound when the device is unreachable at startup.
///
/// Every read returns zero/false and writes are dropped, so the control
/// core keeps running and a disconnected gauge reports as a zero count.
#[derive(Debug, Default)]
pub struct ZeroTransport;

impl Transport for ZeroTransport {
    fn set_trigger(&mut self, valve: ValveId, signal: bool) {
        tracing::debug!(%valve, signal, "dropping trigger write, no device");
    }

    fn get_trigger(&self, _valve: ValveId) -> bool {
        false
    }

    fn abs_gauge_raw(&mut self) -> u32 {
        0
    }

    fn diff_gauge_raw(&mut self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_zero_and_writes_are_dropped() {
        let mut transport = ZeroTransport;
        transport.set_trigger(ValveId::Fast1, true);
        assert!(!transport.get_trigger(ValveId::Fast1));
        assert_eq!(transport.abs_gauge_raw(), 0);
        assert_eq!(transport.diff_gauge_raw(), 0);
    }
}

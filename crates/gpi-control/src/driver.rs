//! Single-owner controller driving the whole core.
//!
//! [`Controller`] owns every piece of mutable control state (valve
//! records, regulation state, histories, the armed puff run) plus the
//! three collaborator ports. All updates go through `&mut self`, which
//! enforces the exclusivity contract structurally: at most one of
//! {puff run tick, regulation tick, manual valve command} executes at a
//! time, and an armed run is serviced to completion before regulation
//! ticks again.

use std::sync::atomic::{AtomicBool, Ordering};

use gpi_core::{Clock, GaugeId, ValveId};
use gpi_hw::{ConfirmationGate, StatusSink, Transport};

use crate::error::{ControlError, ControlResult};
use crate::gauge::{self, GaugeCalibration, GaugeReading};
use crate::history::{DiagnosticWindow, SampleHistory};
use crate::regulation::{RegulationMode, RegulationState};
use crate::sequencer::{PuffPlan, PuffRun};
use crate::valves::{ValveBank, ValveCommand};

/// Poll iterations a blocking run tolerates without the clock advancing
/// before giving up. Transitions are pure functions of elapsed time, so
/// an advancing clock always completes the run; a stalled clock would
/// otherwise spin the poll loop forever.
pub const STALL_POLL_LIMIT: u32 = 100_000;

/// How a manually requested valve command should be gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Ask the operator through the confirmation gate first.
    Interactive,
    /// Unattended path: skip the gate.
    Bypass,
}

/// Result of a blocking puff run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuffOutcome {
    /// Every scheduled transition fired.
    Completed,
    /// No channel was active; nothing was armed and T0 was not captured.
    NothingToDo,
    /// The abort flag was raised mid-run.
    Aborted,
}

/// The control core: state plus collaborator ports.
pub struct Controller<T, G, S> {
    transport: T,
    gate: G,
    sink: S,
    valves: ValveBank,
    regulation: RegulationState,
    abs_history: SampleHistory,
    diff_history: SampleHistory,
    abs_diagnostics: DiagnosticWindow,
    diff_diagnostics: DiagnosticWindow,
    last_abs: Option<GaugeReading>,
    last_diff: Option<GaugeReading>,
    puff: Option<PuffRun>,
}

impl<T, G, S> Controller<T, G, S>
where
    T: Transport,
    G: ConfirmationGate,
    S: StatusSink,
{
    pub fn new(transport: T, gate: G, sink: S) -> Self {
        Self {
            transport,
            gate,
            sink,
            valves: ValveBank::new(),
            regulation: RegulationState::new(),
            abs_history: SampleHistory::new(),
            diff_history: SampleHistory::new(),
            abs_diagnostics: DiagnosticWindow::new(),
            diff_diagnostics: DiagnosticWindow::new(),
            last_abs: None,
            last_diff: None,
            puff: None,
        }
    }

    /// Service the core once at time `now`.
    ///
    /// While a puff run is armed it alone is advanced and the returned
    /// sleep is zero (tight poll); otherwise both gauges are sampled and
    /// one regulation step runs, returning its recommended sleep.
    pub fn service_tick(&mut self, now: f64) -> f64 {
        if let Some(run) = self.puff.as_mut() {
            let complete = run.tick(now, &mut self.valves, &mut self.transport, &mut self.sink);
            if complete {
                tracing::info!("puff run complete");
                self.puff = None;
            }
            return 0.0;
        }

        let (abs, _diff) = self.sample(now);
        self.regulation
            .tick(&abs, &mut self.valves, &mut self.transport, &mut self.sink)
    }

    /// Sample both gauges (averaged sub-samples), update histories and
    /// diagnostics, and notify the status sink.
    fn sample(&mut self, now: f64) -> (GaugeReading, GaugeReading) {
        let (abs_raw, diff_raw) = gauge::sample_raw_means(&mut self.transport);
        let abs = GaugeCalibration::ABSOLUTE.reading(now, abs_raw);
        let diff = GaugeCalibration::DIFFERENTIAL.reading(now, diff_raw);

        self.abs_history.push(now, abs.pressure_torr);
        self.diff_history.push(now, diff.pressure_torr);
        self.abs_diagnostics.push(abs.raw, abs.voltage);
        self.diff_diagnostics.push(diff.raw, diff.voltage);
        self.sink.gauge_reading(GaugeId::Absolute, abs.pressure_torr);
        self.sink.gauge_reading(GaugeId::Differential, diff.pressure_torr);

        self.last_abs = Some(abs);
        self.last_diff = Some(diff);
        (abs, diff)
    }

    /// Arm a puff run with T0 = `now`.
    ///
    /// Returns `Ok(false)` (no T0 captured) when no channel is active,
    /// `Err(SequencerActive)` if a run is already armed.
    pub fn start_puff(&mut self, plan: PuffPlan, now: f64) -> ControlResult<bool> {
        if self.puff.is_some() {
            return Err(ControlError::SequencerActive);
        }
        match PuffRun::arm(plan, now) {
            Some(run) => {
                self.puff = Some(run);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop an armed run without firing its remaining transitions.
    /// Returns whether a run was active.
    pub fn abort_puff(&mut self) -> bool {
        if self.puff.take().is_some() {
            tracing::warn!("puff run aborted");
            true
        } else {
            false
        }
    }

    pub fn puff_active(&self) -> bool {
        self.puff.is_some()
    }

    /// Execute a whole puff run, polling `clock` in a tight loop.
    ///
    /// The run occupies the control thread exclusively until it
    /// completes; no regulation ticks or manual commands are serviced
    /// meanwhile. `abort` is checked on every poll iteration, and a
    /// clock that stops advancing for [`STALL_POLL_LIMIT`] consecutive
    /// polls fails the run with [`ControlError::RunTimeout`].
    pub fn run_puff<C: Clock>(
        &mut self,
        plan: PuffPlan,
        clock: &C,
        abort: &AtomicBool,
    ) -> ControlResult<PuffOutcome> {
        let t0 = clock.now();
        if !self.start_puff(plan, t0)? {
            return Ok(PuffOutcome::NothingToDo);
        }

        let mut last_now = t0;
        let mut stalled_polls: u32 = 0;
        loop {
            if abort.load(Ordering::Relaxed) {
                self.puff = None;
                tracing::warn!("puff run aborted");
                return Ok(PuffOutcome::Aborted);
            }
            let now = clock.now();
            let complete = match self.puff.as_mut() {
                Some(run) => {
                    run.tick(now, &mut self.valves, &mut self.transport, &mut self.sink)
                }
                None => true,
            };
            if complete {
                tracing::info!("puff run complete");
                self.puff = None;
                return Ok(PuffOutcome::Completed);
            }
            if now > last_now {
                last_now = now;
                stalled_polls = 0;
            } else {
                stalled_polls += 1;
                if stalled_polls >= STALL_POLL_LIMIT {
                    self.puff = None;
                    return Err(ControlError::RunTimeout { elapsed_s: now - t0 });
                }
            }
        }
    }

    /// Operator-initiated valve command.
    ///
    /// Interactive requests go through the confirmation gate; a denial is
    /// a clean no-op returning `Ok(false)`. Refused with
    /// [`ControlError::SequencerActive`] while a run is armed.
    pub fn manual_valve(
        &mut self,
        valve: ValveId,
        command: ValveCommand,
        confirmation: Confirmation,
    ) -> ControlResult<bool> {
        if self.puff.is_some() {
            return Err(ControlError::SequencerActive);
        }
        if confirmation == Confirmation::Interactive {
            let action = format!("{} of {}", command.action_label(), valve.label());
            if !self.gate.confirm(&action) {
                tracing::info!(%action, "operator cancelled valve command");
                return Ok(false);
            }
        }
        self.valves
            .set(&mut self.transport, &mut self.sink, valve, command);
        Ok(true)
    }

    /// Set the target pressure and begin filling (no-op unless idle).
    pub fn start_fill(&mut self, desired_pressure_torr: f64) {
        self.regulation.start_fill(desired_pressure_torr);
    }

    /// Pump the reservoir out, then refill (no-op unless idle).
    pub fn start_pump_refill(&mut self) {
        self.regulation.start_pump_refill();
    }

    pub fn regulation_mode(&self) -> RegulationMode {
        self.regulation.mode()
    }

    pub fn desired_pressure_torr(&self) -> f64 {
        self.regulation.desired_pressure_torr()
    }

    /// Last commanded state of a valve; the source for indicators.
    pub fn commanded(&self, valve: ValveId) -> ValveCommand {
        self.valves.commanded(valve)
    }

    /// Raw trigger-line read-back (see the valve layer note on V3).
    pub fn read_trigger(&self, valve: ValveId) -> bool {
        self.valves.read_trigger(&self.transport, valve)
    }

    /// Fast-valve readiness for the given plan.
    pub fn fast_ready(&self, plan: &PuffPlan) -> bool {
        plan.fast_ready(self.read_trigger(ValveId::Fast1))
    }

    pub fn history(&self, gauge: GaugeId) -> &SampleHistory {
        match gauge {
            GaugeId::Absolute => &self.abs_history,
            GaugeId::Differential => &self.diff_history,
        }
    }

    pub fn diagnostics(&self, gauge: GaugeId) -> &DiagnosticWindow {
        match gauge {
            GaugeId::Absolute => &self.abs_diagnostics,
            GaugeId::Differential => &self.diff_diagnostics,
        }
    }

    pub fn last_reading(&self, gauge: GaugeId) -> Option<GaugeReading> {
        match gauge {
            GaugeId::Absolute => self.last_abs,
            GaugeId::Differential => self.last_diff,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }
}

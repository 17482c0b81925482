//! Timed puff sequencer.
//!
//! A puff run fires valve events at fixed offsets from the external
//! trigger instant T0: the machine trigger T1 arrives [`T1_REL_T0_S`]
//! seconds after T0, the V3 safety close happens [`PREP_LEAD_S`] seconds
//! before the first possible puff, and each active channel opens the fast
//! valve at its own offset past T1 for its configured duration.
//!
//! The run is a state machine advanced by [`PuffRun::tick`] with an
//! externally supplied "now"; it never sleeps. Every transition is
//! guarded by its own done flag, so ticks are idempotent once a deadline
//! has been crossed and two channels sharing one offset each still fire
//! exactly once.

use gpi_core::ValveId;
use serde::{Deserialize, Serialize};

use gpi_hw::{StatusSink, Transport};

use crate::valves::{ValveBank, ValveCommand};

/// Delay from the T0 trigger to the T1 machine trigger, seconds.
pub const T1_REL_T0_S: f64 = 30.0;

/// Lead time of the preparatory V3 close before the earliest puff, seconds.
pub const PREP_LEAD_S: f64 = 5.0;

/// Fast-valve open duration per puff, seconds.
pub const OPEN_DURATION_S: f64 = 1.0;

/// One timing channel of a puff plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuffChannel {
    /// Operator permission flag for this channel.
    pub enabled: bool,
    /// Requested opening offset from T1, seconds. `None` disables the
    /// channel for the run, as does a non-finite value.
    pub offset_s: Option<f64>,
    /// Fast-valve open duration, seconds.
    pub duration_s: f64,
}

impl Default for PuffChannel {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_s: None,
            duration_s: OPEN_DURATION_S,
        }
    }
}

impl PuffChannel {
    /// A channel participates in a run iff it has permission and a
    /// usable timing value.
    pub fn active(&self) -> bool {
        self.enabled && self.offset_s.is_some_and(f64::is_finite)
    }
}

/// Two-channel puff plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PuffPlan {
    pub channels: [PuffChannel; 2],
}

impl PuffPlan {
    /// Plan with a single active channel at `offset_s`.
    pub fn single(offset_s: f64) -> Self {
        Self {
            channels: [
                PuffChannel {
                    enabled: true,
                    offset_s: Some(offset_s),
                    duration_s: OPEN_DURATION_S,
                },
                PuffChannel::default(),
            ],
        }
    }

    pub fn any_active(&self) -> bool {
        self.channels.iter().any(PuffChannel::active)
    }

    fn active_offsets(&self) -> impl Iterator<Item = f64> + '_ {
        self.channels
            .iter()
            .filter(|c| c.active())
            .filter_map(|c| c.offset_s)
    }

    /// Earliest active offset, if any channel is active.
    pub fn min_active_offset(&self) -> Option<f64> {
        self.active_offsets().reduce(f64::min)
    }

    /// Latest puff end (offset + duration) over active channels.
    pub fn last_close_offset(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter(|c| c.active())
            .filter_map(|c| c.offset_s.map(|t| t + c.duration_s))
            .reduce(f64::max)
    }

    /// Fast-valve readiness indicator: the hardware trigger line plus
    /// both channels' permissions and durations must all be live.
    pub fn fast_ready(&self, fast_trigger: bool) -> bool {
        fast_trigger
            && self
                .channels
                .iter()
                .all(|c| c.enabled && c.duration_s > 0.0)
    }
}

/// Progress of one channel within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelPhase {
    NotStarted,
    Opened,
    Closed,
}

/// An in-progress execution of a [`PuffPlan`].
#[derive(Debug, Clone)]
pub struct PuffRun {
    plan: PuffPlan,
    t0: f64,
    prep_done: bool,
    t1_seen: bool,
    phases: [ChannelPhase; 2],
}

impl PuffRun {
    /// Capture T0 and arm a run. Returns `None` (and captures nothing)
    /// unless at least one channel is active.
    pub fn arm(plan: PuffPlan, t0: f64) -> Option<Self> {
        if !plan.any_active() {
            return None;
        }
        tracing::info!(t0, t1_in_s = T1_REL_T0_S, "T0 received");
        let phases = plan.channels.map(|c| {
            if c.active() {
                ChannelPhase::NotStarted
            } else {
                ChannelPhase::Closed
            }
        });
        Some(Self {
            plan,
            t0,
            prep_done: false,
            t1_seen: false,
            phases,
        })
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn plan(&self) -> &PuffPlan {
        &self.plan
    }

    pub fn phase(&self, channel: usize) -> ChannelPhase {
        self.phases[channel]
    }

    /// All transitions have fired (inactive channels count as done).
    pub fn is_complete(&self) -> bool {
        self.prep_done
            && self.t1_seen
            && self.phases.iter().all(|p| *p == ChannelPhase::Closed)
    }

    /// Advance the run to `now`, firing every transition whose deadline
    /// has been crossed and not yet fired. Returns completion.
    pub fn tick<T: Transport, S: StatusSink>(
        &mut self,
        now: f64,
        valves: &mut ValveBank,
        transport: &mut T,
        sink: &mut S,
    ) -> bool {
        let elapsed = now - self.t0;

        if !self.prep_done {
            if let Some(first_offset) = self.plan.min_active_offset() {
                if elapsed > T1_REL_T0_S - PREP_LEAD_S + first_offset {
                    tracing::info!(elapsed_s = elapsed, "closing V3 ahead of first puff");
                    valves.set(transport, sink, ValveId::Slow3, ValveCommand::Close);
                    self.prep_done = true;
                }
            }
        }

        if !self.t1_seen && elapsed > T1_REL_T0_S {
            tracing::info!(elapsed_s = elapsed, "T1 received");
            self.t1_seen = true;
        }

        for (phase, channel) in self.phases.iter_mut().zip(&self.plan.channels) {
            if !channel.active() {
                continue;
            }
            let Some(offset) = channel.offset_s else {
                continue;
            };
            // Sequential checks, not else-if: a tick far past both
            // deadlines opens and closes in one pass.
            if *phase == ChannelPhase::NotStarted && elapsed > T1_REL_T0_S + offset {
                tracing::info!(elapsed_s = elapsed, "opening FV2");
                valves.set(transport, sink, ValveId::Fast1, ValveCommand::Open);
                *phase = ChannelPhase::Opened;
            }
            if *phase == ChannelPhase::Opened
                && elapsed > T1_REL_T0_S + offset + channel.duration_s
            {
                tracing::info!(elapsed_s = elapsed, "closing FV2");
                valves.set(transport, sink, ValveId::Fast1, ValveCommand::Close);
                *phase = ChannelPhase::Closed;
            }
        }

        self.is_complete()
    }
}

//! Round-based interval timer: a single authoritative state record
//! advanced by one transition per scheduler second. The rendering layer
//! only ever reads snapshots; cues go out through the [`Notifier`] port.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notify::Notifier;
use crate::util::minutes_from_secs;

pub const STANDARD_ROUNDS: u32 = 5;
pub const STANDARD_WORK_SECS: u32 = 3 * 60;
pub const STANDARD_REST_SECS: u32 = 60;

pub const MIN_WORK_MINUTES: u32 = 1;
pub const MAX_WORK_MINUTES: u32 = 60;
pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 20;

/// Short pulse at the 3-2-1 countdown, longer pattern on phase changes.
const COUNTDOWN_VIBRATE_MS: [u64; 1] = [100];
const PHASE_VIBRATE_MS: [u64; 3] = [200, 100, 200];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub rounds: u32,
    pub work_secs: u32,
    pub rest_secs: u32,
}

impl Preset {
    pub fn standard() -> Self {
        Self {
            rounds: STANDARD_ROUNDS,
            work_secs: STANDARD_WORK_SECS,
            rest_secs: STANDARD_REST_SECS,
        }
    }

    /// Build a custom preset from user input. Out-of-range values are
    /// clamped, never rejected; rest stays at the standard minute.
    pub fn custom(work_minutes: u32, rounds: u32) -> Self {
        Self {
            rounds: rounds.clamp(MIN_ROUNDS, MAX_ROUNDS),
            work_secs: work_minutes.clamp(MIN_WORK_MINUTES, MAX_WORK_MINUTES) * 60,
            rest_secs: STANDARD_REST_SECS,
        }
    }

    /// Clamp a preset from an untrusted source (e.g. a hand-edited
    /// config file) back into the supported ranges.
    pub fn normalized(self) -> Self {
        Self {
            rounds: self.rounds.clamp(MIN_ROUNDS, MAX_ROUNDS),
            work_secs: self
                .work_secs
                .clamp(MIN_WORK_MINUTES * 60, MAX_WORK_MINUTES * 60),
            rest_secs: self.rest_secs,
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Work,
    Rest,
    Done,
}

impl Phase {
    /// Banner label for the timer screen.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "READY",
            Phase::Work => "WORK",
            Phase::Rest => "REST",
            Phase::Done => "DONE",
        }
    }
}

/// Offered to the caller once a session reaches `Done`: the final elapsed
/// time and the minutes a logged workout would be prefilled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandoff {
    pub elapsed_secs: u32,
    pub suggested_minutes: u32,
}

#[derive(Debug)]
pub struct IntervalTimer {
    preset: Preset,
    phase: Phase,
    round: u32,
    time_left: u32,
    elapsed_secs: u32,
}

impl IntervalTimer {
    pub fn new(preset: Preset) -> Self {
        Self {
            preset,
            phase: Phase::Idle,
            round: 1,
            time_left: preset.work_secs,
            elapsed_secs: 0,
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Work | Phase::Rest)
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// The completion decision payload; present only while in `Done`.
    pub fn handoff(&self) -> Option<SessionHandoff> {
        if self.phase == Phase::Done {
            Some(SessionHandoff {
                elapsed_secs: self.elapsed_secs,
                suggested_minutes: minutes_from_secs(self.elapsed_secs),
            })
        } else {
            None
        }
    }

    /// Swap the preset. Permitted only while idle; returns whether the
    /// change was applied.
    pub fn set_preset(&mut self, preset: Preset) -> bool {
        if self.phase != Phase::Idle {
            debug!(?preset, "preset change refused while session active");
            return false;
        }
        self.preset = preset;
        self.time_left = preset.work_secs;
        true
    }

    /// Begin a session from idle.
    pub fn start(&mut self, notifier: &dyn Notifier) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Work;
        self.round = 1;
        self.time_left = self.preset.work_secs;
        self.elapsed_secs = 0;
        debug!(rounds = self.preset.rounds, "session started");
        notifier.announce("Work round 1");
        notifier.vibrate(&PHASE_VIBRATE_MS);
    }

    /// Cancel from any phase: back to the idle baseline, discarding any
    /// pending completion decision.
    pub fn reset(&mut self) {
        debug!(phase = ?self.phase, elapsed = self.elapsed_secs, "timer reset");
        self.phase = Phase::Idle;
        self.round = 1;
        self.time_left = self.preset.work_secs;
        self.elapsed_secs = 0;
    }

    /// Advance one second. No-op unless a session is running; the
    /// scheduler guarantees ticks are strictly sequential.
    pub fn tick(&mut self, notifier: &dyn Notifier) {
        if !self.is_running() {
            return;
        }

        self.time_left -= 1;
        self.elapsed_secs += 1;

        if (1..=3).contains(&self.time_left) {
            notifier.announce(&self.time_left.to_string());
            notifier.vibrate(&COUNTDOWN_VIBRATE_MS);
            return;
        }

        if self.time_left > 0 {
            return;
        }

        match self.phase {
            Phase::Work if self.round == self.preset.rounds => {
                self.phase = Phase::Done;
                debug!(elapsed = self.elapsed_secs, "session complete");
                notifier.announce("Session complete");
                notifier.vibrate(&PHASE_VIBRATE_MS);
            }
            Phase::Work if self.preset.rest_secs == 0 => {
                // Zero-rest presets go straight into the next round.
                self.round += 1;
                self.time_left = self.preset.work_secs;
                notifier.announce(&format!("Work round {}", self.round));
                notifier.vibrate(&PHASE_VIBRATE_MS);
            }
            Phase::Work => {
                self.phase = Phase::Rest;
                self.time_left = self.preset.rest_secs;
                notifier.announce("Rest");
                notifier.vibrate(&PHASE_VIBRATE_MS);
            }
            Phase::Rest => {
                self.round += 1;
                self.phase = Phase::Work;
                self.time_left = self.preset.work_secs;
                notifier.announce(&format!("Work round {}", self.round));
                notifier.vibrate(&PHASE_VIBRATE_MS);
            }
            // Unreachable: guarded by is_running above
            Phase::Idle | Phase::Done => {}
        }
    }
}

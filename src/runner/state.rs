//! Run stage with atomic transitions.
//!
//! ```text
//! Launching → WaitingReady → SettingUp → Watching → Terminated
//! ```
//!
//! `WaitingReady → SettingUp` is the one-shot guard: only the first readiness
//! marker wins the compare-and-set, however many times the node prints it.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Stage {
    Launching = 0,
    WaitingReady = 1,
    SettingUp = 2,
    Watching = 3,
    Terminated = 4,
}

impl Stage {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Stage::Launching,
            1 => Stage::WaitingReady,
            2 => Stage::SettingUp,
            3 => Stage::Watching,
            _ => Stage::Terminated,
        }
    }
}

#[derive(Debug)]
pub struct RunState {
    stage: AtomicU8,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            stage: AtomicU8::new(Stage::Launching as u8),
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::from_u8(self.stage.load(Ordering::Acquire))
    }

    /// Move `from → to` in one atomic step. Fails if the stage is not `from`.
    pub fn transition(&self, from: Stage, to: Stage) -> bool {
        let moved = self
            .stage
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if moved {
            tracing::debug!(from = ?from, to = ?to, "Run stage changed");
        }
        moved
    }

    /// Claim the setup sequence. True exactly once per run.
    pub fn try_begin_setup(&self) -> bool {
        self.transition(Stage::WaitingReady, Stage::SettingUp)
    }

    pub fn terminate(&self) {
        self.stage.store(Stage::Terminated as u8, Ordering::Release);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

//! Session time and presentation pacing
//!
//! The random-event cooldown is measured in session time, which comes either
//! from the wall clock or from a manually advanced counter (tests, headless
//! runs). Pacing delays are handed back to the caller as values so the
//! simulation itself never sleeps.

use std::time::{Duration, Instant};

/// Source of elapsed session time
#[derive(Debug, Clone)]
pub enum SessionClock {
    /// Real time since the session started
    Wall(Instant),
    /// Time that only moves when `advance` is called
    Manual(Duration),
}

impl SessionClock {
    pub fn wall() -> Self {
        SessionClock::Wall(Instant::now())
    }

    pub fn manual() -> Self {
        SessionClock::Manual(Duration::ZERO)
    }

    /// Time elapsed since the session started
    pub fn elapsed(&self) -> Duration {
        match self {
            SessionClock::Wall(start) => start.elapsed(),
            SessionClock::Manual(elapsed) => *elapsed,
        }
    }

    /// Move a manual clock forward. No-op on a wall clock.
    pub fn advance(&mut self, by: Duration) {
        if let SessionClock::Manual(elapsed) = self {
            *elapsed += by;
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::wall()
    }
}

/// A presentation-only pause the caller may animate, shorten or skip
///
/// Returned by long-running interactive actions (army drills). The state
/// change has already been applied when the caller receives this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDelay {
    pub label: &'static str,
    pub steps: u32,
    pub step: Duration,
}

impl SimulatedDelay {
    /// The three one-second beats used by training and commander drills
    pub fn drill(label: &'static str) -> Self {
        Self {
            label,
            steps: 3,
            step: Duration::from_secs(1),
        }
    }

    pub fn total(&self) -> Duration {
        self.step * self.steps
    }
}

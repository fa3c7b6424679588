//! Gravity clock: running/stopped state and the fixed drop interval.

use std::time::Duration;

/// Default gravity interval.
pub const DEFAULT_DROP_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Result of one scheduling pass while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// An automatic soft drop is due.
    pub gravity: bool,
}

#[derive(Debug, Clone)]
pub struct GameClock {
    state: ClockState,
    interval: Duration,
    accumulated: Duration,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_DROP_INTERVAL)
    }
}

impl GameClock {
    /// Starts stopped.
    pub fn new(interval: Duration) -> Self {
        Self {
            state: ClockState::Stopped,
            interval,
            accumulated: Duration::ZERO,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.accumulated = Duration::ZERO;
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    /// Any soft drop restarts the countdown to the next automatic one.
    pub fn reset_accumulator(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Adds `elapsed` and reports whether gravity is due.
    ///
    /// Returns `None` while stopped: no tick, no render pass.
    pub fn advance(&mut self, elapsed: Duration) -> Option<Tick> {
        if !self.is_running() {
            return None;
        }
        self.accumulated += elapsed;
        let gravity = self.accumulated > self.interval;
        if gravity {
            self.accumulated = Duration::ZERO;
        }
        Some(Tick { gravity })
    }
}

use std::time::{Duration, Instant};

/// Debounce window between the last content change and the flush.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

/// Single-shot, reset-on-event save timer modelled as an explicit
/// deadline. Each content change pushes the deadline out; the frame
/// loop polls [`AutosaveTimer::take_due`] and flushes once the
/// deadline passes with no further change. A controlled shutdown
/// calls [`AutosaveTimer::take_pending`] for the final flush.
#[derive(Debug, Default)]
pub struct AutosaveTimer {
    deadline: Option<Instant>,
}

impl AutosaveTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note content changed; (re)start the timer.
    pub fn bump(&mut self, now: Instant) {
        self.deadline = Some(now + AUTOSAVE_DELAY);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when the deadline has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clear and report whether a save was still owed, regardless of
    /// the deadline. Used on shutdown.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_delay() {
        let mut timer = AutosaveTimer::new();
        let t0 = Instant::now();
        timer.bump(t0);

        assert!(!timer.take_due(t0 + Duration::from_millis(499)));
        assert!(timer.take_due(t0 + AUTOSAVE_DELAY));
        // one-shot: no second fire without another bump
        assert!(!timer.take_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn each_change_resets_the_deadline() {
        let mut timer = AutosaveTimer::new();
        let t0 = Instant::now();
        timer.bump(t0);
        timer.bump(t0 + Duration::from_millis(400));

        assert!(!timer.take_due(t0 + Duration::from_millis(600)));
        assert!(timer.take_due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn shutdown_flush_collects_pending_saves() {
        let mut timer = AutosaveTimer::new();
        assert!(!timer.take_pending());
        timer.bump(Instant::now());
        assert!(timer.take_pending());
        assert!(!timer.is_pending());
    }
}

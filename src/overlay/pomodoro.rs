//! Pomodoro timer
//!
//! Counts down in whole seconds. Reaching zero stops the timer and loads the
//! other phase; the user starts it again.

/// Which half of the cycle is running
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Work,
    Break,
}

#[derive(Clone, Debug)]
pub struct PomodoroTimer {
    work_secs: u32,
    break_secs: u32,
    remaining: u32,
    running: bool,
    phase: Phase,
    /// Fractional seconds not yet counted
    carry: f32,
}

impl PomodoroTimer {
    /// Timer with the given phase lengths; zero minutes count as one
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        let work_secs = work_minutes.max(1).saturating_mul(60);
        Self {
            work_secs,
            break_secs: break_minutes.max(1).saturating_mul(60),
            remaining: work_secs,
            running: false,
            phase: Phase::Work,
            carry: 0.0,
        }
    }

    /// Start or pause. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Stop and go back to a full work phase
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining = self.work_secs;
        self.carry = 0.0;
    }

    /// Count one second. Returns the new phase when the current one ends.
    pub fn tick_second(&mut self) -> Option<Phase> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.running = false;
        self.phase = match self.phase {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        };
        self.remaining = self.phase_secs();
        Some(self.phase)
    }

    /// Feed wall-clock time; whole seconds are counted as ticks.
    ///
    /// Returns the last phase switch, if any.
    pub fn advance(&mut self, dt: f32) -> Option<Phase> {
        if !self.running || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        self.carry += dt;
        let whole = self.carry.floor();
        self.carry -= whole;
        // Float to int casts saturate
        let ticks = whole as u32;
        if ticks < self.remaining {
            self.remaining -= ticks;
            return None;
        }

        // The phase ends inside this step; leftover time is dropped
        self.remaining = 1;
        self.carry = 0.0;
        self.tick_second()
    }

    fn phase_secs(&self) -> u32 {
        match self.phase {
            Phase::Work => self.work_secs,
            Phase::Break => self.break_secs,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds left in the current phase
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Completed fraction of the current phase in `[0, 1]`
    pub fn progress(&self) -> f32 {
        let total = self.phase_secs() as f32;
        (total - self.remaining as f32) / total
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(25, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.remaining(), 25 * 60);
        assert_eq!(timer.phase(), Phase::Work);
        assert!(!timer.is_running());
        assert_eq!(timer.display(), "25:00");
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_paused_timer_does_not_count() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.tick_second(), None);
        assert_eq!(timer.remaining(), 25 * 60);
    }

    #[test]
    fn test_work_phase_ends_in_break() {
        let mut timer = PomodoroTimer::new(1, 5);
        assert!(timer.toggle());
        for _ in 0..59 {
            assert_eq!(timer.tick_second(), None);
        }
        assert_eq!(timer.display(), "00:01");
        assert_eq!(timer.tick_second(), Some(Phase::Break));
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 5 * 60);
    }

    #[test]
    fn test_break_phase_ends_in_work() {
        let mut timer = PomodoroTimer::new(1, 1);
        timer.toggle();
        timer.advance(60.0);
        assert_eq!(timer.phase(), Phase::Break);
        timer.toggle();
        assert_eq!(timer.advance(61.5), Some(Phase::Work));
        assert_eq!(timer.remaining(), 60);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_advance_accumulates_fractions() {
        let mut timer = PomodoroTimer::default();
        timer.toggle();
        for _ in 0..4 {
            timer.advance(0.25);
        }
        assert_eq!(timer.remaining(), 25 * 60 - 1);
        timer.advance(-1.0);
        timer.advance(f32::NAN);
        assert_eq!(timer.remaining(), 25 * 60 - 1);
    }

    #[test]
    fn test_huge_lengths_saturate() {
        let mut timer = PomodoroTimer::new(u32::MAX, u32::MAX);
        assert_eq!(timer.remaining(), u32::MAX);
        assert_eq!(timer.progress(), 0.0);

        timer.toggle();
        assert_eq!(timer.advance(1.0e8), None);
        assert_eq!(timer.remaining(), u32::MAX - 100_000_000);
        assert_eq!(timer.advance(f32::MAX), Some(Phase::Break));
        assert_eq!(timer.remaining(), u32::MAX);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_reset() {
        let mut timer = PomodoroTimer::new(1, 1);
        timer.toggle();
        timer.advance(60.0);
        timer.reset();
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.remaining(), 60);
        assert!(!timer.is_running());
    }
}

//! Frame timing helpers. Everything here advances by explicit deltas so the orchestrator can
//! be driven by a real clock or a fixed test timestep alike.

use std::time::Instant;

/// Wall-clock delta source for the host frame loop
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Seconds since the previous tick; advances the clock
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot timer, fires once after `duration` seconds of accumulated ticks
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl Countdown {
    /// Create an inactive countdown
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Create a countdown that is already running
    pub fn started(duration: f32) -> Self {
        let mut countdown = Self::new(duration);
        countdown.start();
        countdown
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true exactly once, on the tick that completes the countdown
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed += delta;

        if self.elapsed >= self.duration {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }
}

/// Time-boxed interpolation between two values of `T`, reported as a raw progress fraction.
/// The caller applies its own easing.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Copy> {
    pub from: T,
    pub to: T,
    timer: Countdown,
}

impl<T: Copy> Tween<T> {
    pub fn new(from: T, to: T, duration: f32) -> Self {
        Self {
            from,
            to,
            timer: Countdown::started(duration),
        }
    }

    /// Advance by `delta`; returns the progress after advancing and whether the tween finished
    pub fn advance(&mut self, delta: f32) -> (f32, bool) {
        let finished = self.timer.tick(delta) || self.timer.progress() >= 1.0;
        (self.timer.progress(), finished)
    }

    pub fn progress(&self) -> f32 {
        self.timer.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        assert!(delta >= 0.009, "delta was {delta}");
    }

    #[test]
    fn countdown_fires_once() {
        let mut timer = Countdown::new(1.0);

        assert!(!timer.tick(0.5)); // inactive

        timer.start();
        assert!(!timer.tick(0.5));
        assert_eq!(timer.progress(), 0.5);

        assert!(timer.tick(0.6));
        assert!(!timer.tick(0.1));
    }

    #[test]
    fn cancelled_countdown_never_fires() {
        let mut timer = Countdown::started(0.2);
        timer.cancel();
        assert!(!timer.tick(1.0));
        assert!(!timer.is_active());
    }

    #[test]
    fn tween_reports_completion() {
        let mut tween = Tween::new(0.0f32, 10.0, 1.0);
        let (p, done) = tween.advance(0.25);
        assert_eq!(p, 0.25);
        assert!(!done);

        let (p, done) = tween.advance(1.0);
        assert_eq!(p, 1.0);
        assert!(done);
    }

    #[test]
    fn zero_length_tween_finishes_immediately() {
        let mut tween = Tween::new(1, 2, 0.0);
        let (p, done) = tween.advance(0.0);
        assert_eq!(p, 1.0);
        assert!(done);
    }
}

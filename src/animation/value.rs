use crate::animation::easing::{EasingFunction, Interpolatable};
use instant::Instant;
use std::time::Duration;

/// Lifecycle of an [`AnimatedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    /// Never animated
    Idle,
    Running,
    /// Last tween reached its target
    Settled,
}

/// One in-flight interpolation
#[derive(Debug, Clone, PartialEq)]
struct Tween {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    easing: EasingFunction,
}

impl Tween {
    fn progress_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn value_at(&self, now: Instant) -> f64 {
        let progress = self.progress_at(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(&self.to, self.easing.apply(progress))
    }

    fn is_finished_at(&self, now: Instant) -> bool {
        self.progress_at(now) >= 1.0
    }
}

/// A scalar that can be tweened towards a target and read at any instant.
///
/// Reading never mutates; a running tween is evaluated against the supplied
/// timestamp. Starting a new tween replaces the running one and continues
/// from wherever the old one was at that instant.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedValue {
    /// Value at rest; `None` until set or animated
    base: Option<f64>,
    tween: Option<Tween>,
    animated: bool,
}

impl AnimatedValue {
    pub fn new(initial: Option<f64>) -> Self {
        Self {
            base: initial,
            tween: None,
            animated: false,
        }
    }

    /// Current value, 0 when unset
    pub fn value_at(&self, now: Instant) -> f64 {
        match &self.tween {
            Some(tween) => tween.value_at(now),
            None => self.base.unwrap_or(0.0),
        }
    }

    pub fn value(&self) -> f64 {
        self.value_at(Instant::now())
    }

    /// Final value once every running tween has completed
    pub fn target(&self) -> f64 {
        match &self.tween {
            Some(tween) => tween.to,
            None => self.base.unwrap_or(0.0),
        }
    }

    pub fn state_at(&self, now: Instant) -> TweenState {
        match &self.tween {
            Some(tween) if !tween.is_finished_at(now) => TweenState::Running,
            _ if self.animated => TweenState::Settled,
            _ => TweenState::Idle,
        }
    }

    pub fn is_running_at(&self, now: Instant) -> bool {
        self.state_at(now) == TweenState::Running
    }

    /// Starts a tween from the value at `now` towards `to`, cancelling any
    /// tween already running.
    pub fn animate_to(&mut self, to: f64, duration: Duration, easing: EasingFunction, now: Instant) {
        let from = self.value_at(now);
        self.base = Some(from);
        self.tween = Some(Tween {
            from,
            to,
            started: now,
            duration,
            easing,
        });
        self.animated = true;
    }

    /// Jumps to `value` without animating
    pub fn set(&mut self, value: f64) {
        self.base = Some(value);
        self.tween = None;
    }

    /// Folds a finished tween into the resting value. Returns true when a
    /// tween settled during this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.tween {
            Some(tween) if tween.is_finished_at(now) => {
                self.base = Some(tween.to);
                self.tween = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_unset_value_reads_zero() {
        let value = AnimatedValue::default();
        let now = Instant::now();
        assert_eq!(value.value_at(now), 0.0);
        assert_eq!(value.state_at(now), TweenState::Idle);
    }

    #[test]
    fn test_tween_reaches_target() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(Some(0.0));
        value.animate_to(10.0, ms(100), EasingFunction::Linear, start);

        assert_eq!(value.state_at(start), TweenState::Running);
        assert!((value.value_at(start + ms(50)) - 5.0).abs() < 1e-9);
        assert_eq!(value.value_at(start + ms(100)), 10.0);
        assert_eq!(value.value_at(start + ms(400)), 10.0);
        assert_eq!(value.state_at(start + ms(100)), TweenState::Settled);
    }

    #[test]
    fn test_override_continues_from_current_value() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(Some(0.0));
        value.animate_to(10.0, ms(100), EasingFunction::Linear, start);
        value.animate_to(20.0, ms(100), EasingFunction::Linear, start + ms(50));

        assert!((value.value_at(start + ms(50)) - 5.0).abs() < 1e-9);
        assert!((value.value_at(start + ms(100)) - 12.5).abs() < 1e-9);
        assert_eq!(value.value_at(start + ms(150)), 20.0);
        assert_eq!(value.target(), 20.0);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let now = Instant::now();
        let mut value = AnimatedValue::new(Some(1.0));
        value.animate_to(3.0, Duration::ZERO, EasingFunction::EaseInOut, now);
        assert_eq!(value.value_at(now), 3.0);
        assert!(!value.is_running_at(now));
    }

    #[test]
    fn test_tick_settles_finished_tween() {
        let start = Instant::now();
        let mut value = AnimatedValue::new(None);
        value.animate_to(4.0, ms(10), EasingFunction::Linear, start);

        assert!(!value.tick(start + ms(5)));
        assert!(value.tick(start + ms(10)));
        assert!(!value.tick(start + ms(20)));
        assert_eq!(value.value_at(start), 4.0);
        assert_eq!(value.state_at(start), TweenState::Settled);
    }
}

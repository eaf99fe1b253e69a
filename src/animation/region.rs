//! Camera region animation
//!
//! A [`RegionAnimator`] owns four independently tweened scalars (latitude,
//! longitude and both spans). [`LiveRegion`] handles read them without
//! owning the animator, so a renderer can sample the camera every frame
//! while the host keeps issuing [`RegionAnimator::animate`] commands.

use crate::animation::easing::EasingFunction;
use crate::animation::value::AnimatedValue;
use crate::core::config::RegionAnimationConfig;
use crate::core::geo::{PartialRegion, Region};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Target of a region animation. Scalars left `None`, or set to a falsy
/// value (0 or NaN), are not animated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimateOptions {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub latitude_delta: Option<f64>,
    pub longitude_delta: Option<f64>,
    pub duration: Option<Duration>,
    pub easing: Option<EasingFunction>,
}

impl AnimateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets every scalar of `region`
    pub fn to_region(region: Region) -> Self {
        Self {
            latitude: Some(region.latitude),
            longitude: Some(region.longitude),
            latitude_delta: Some(region.latitude_delta),
            longitude_delta: Some(region.longitude_delta),
            ..Self::default()
        }
    }

    pub fn latitude(mut self, latitude: f64) -> Self {
        self.latitude = Some(latitude);
        self
    }

    pub fn longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self
    }

    pub fn latitude_delta(mut self, delta: f64) -> Self {
        self.latitude_delta = Some(delta);
        self
    }

    pub fn longitude_delta(mut self, delta: f64) -> Self {
        self.longitude_delta = Some(delta);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// Only non-zero, non-NaN targets start a tween
fn truthy(target: Option<f64>) -> Option<f64> {
    target.filter(|value| *value != 0.0 && !value.is_nan())
}

#[derive(Debug, Default)]
struct RegionState {
    latitude: AnimatedValue,
    longitude: AnimatedValue,
    latitude_delta: AnimatedValue,
    longitude_delta: AnimatedValue,
}

impl RegionState {
    fn from_partial(initial: PartialRegion) -> Self {
        Self {
            latitude: AnimatedValue::new(initial.latitude),
            longitude: AnimatedValue::new(initial.longitude),
            latitude_delta: AnimatedValue::new(initial.latitude_delta),
            longitude_delta: AnimatedValue::new(initial.longitude_delta),
        }
    }

    fn region_at(&self, now: Instant) -> Region {
        Region::new(
            self.latitude.value_at(now),
            self.longitude.value_at(now),
            self.latitude_delta.value_at(now),
            self.longitude_delta.value_at(now),
        )
    }

    fn scalars_mut(&mut self) -> [&mut AnimatedValue; 4] {
        [
            &mut self.latitude,
            &mut self.longitude,
            &mut self.latitude_delta,
            &mut self.longitude_delta,
        ]
    }
}

/// Read-only projection of a [`RegionAnimator`]'s scalars
#[derive(Debug, Clone)]
pub struct LiveRegion {
    state: Rc<RefCell<RegionState>>,
}

impl LiveRegion {
    pub fn get_at(&self, now: Instant) -> Region {
        self.state.borrow().region_at(now)
    }

    pub fn get(&self) -> Region {
        self.get_at(Instant::now())
    }
}

/// Four independently animated region scalars
#[derive(Debug, Clone)]
pub struct RegionAnimator {
    state: Rc<RefCell<RegionState>>,
    config: RegionAnimationConfig,
}

impl RegionAnimator {
    pub fn new(initial: PartialRegion) -> Self {
        Self::with_config(initial, RegionAnimationConfig::default())
    }

    pub fn with_config(initial: PartialRegion, config: RegionAnimationConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegionState::from_partial(initial))),
            config,
        }
    }

    pub fn config(&self) -> &RegionAnimationConfig {
        &self.config
    }

    /// Handle for binding the animated region to a renderer
    pub fn live_props(&self) -> LiveRegion {
        LiveRegion {
            state: Rc::clone(&self.state),
        }
    }

    pub fn region_at(&self, now: Instant) -> Region {
        self.state.borrow().region_at(now)
    }

    pub fn animate(&self, options: AnimateOptions) {
        self.animate_at(options, Instant::now());
    }

    /// Starts one tween per truthy scalar in `options`. Each replaces only
    /// the tween of its own scalar; the others keep running.
    pub fn animate_at(&self, options: AnimateOptions, now: Instant) {
        let duration = options.duration.unwrap_or_else(|| self.config.duration());
        let easing = options.easing.unwrap_or(self.config.easing);
        let targets = [
            truthy(options.latitude),
            truthy(options.longitude),
            truthy(options.latitude_delta),
            truthy(options.longitude_delta),
        ];

        if targets.iter().all(Option::is_none) {
            log::trace!("region animation ignored: no target scalars");
            return;
        }

        let mut state = self.state.borrow_mut();
        for (value, target) in state.scalars_mut().into_iter().zip(targets) {
            if let Some(to) = target {
                value.animate_to(to, duration, easing, now);
            }
        }
        log::debug!(
            "region animation started over {:?} ({:?}) towards {:?}",
            duration,
            easing,
            targets
        );
    }

    /// Jumps to `region` without animating
    pub fn set_region(&self, region: Region) {
        let mut state = self.state.borrow_mut();
        state.latitude.set(region.latitude);
        state.longitude.set(region.longitude);
        state.latitude_delta.set(region.latitude_delta);
        state.longitude_delta.set(region.longitude_delta);
    }

    pub fn is_animating_at(&self, now: Instant) -> bool {
        let state = self.state.borrow();
        [
            &state.latitude,
            &state.longitude,
            &state.latitude_delta,
            &state.longitude_delta,
        ]
        .iter()
        .any(|value| value.is_running_at(now))
    }

    /// Settles finished tweens. Returns true if any scalar is still running.
    pub fn tick(&self, now: Instant) -> bool {
        let mut state = self.state.borrow_mut();
        let mut running = false;
        for value in state.scalars_mut() {
            value.tick(now);
            running |= value.is_running_at(now);
        }
        running
    }
}

impl Default for RegionAnimator {
    fn default() -> Self {
        Self::new(PartialRegion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_filter() {
        assert_eq!(truthy(Some(1.5)), Some(1.5));
        assert_eq!(truthy(Some(-2.0)), Some(-2.0));
        assert_eq!(truthy(Some(0.0)), None);
        assert_eq!(truthy(Some(f64::NAN)), None);
        assert_eq!(truthy(None), None);
    }

    #[test]
    fn test_live_props_default_to_zero() {
        let animator = RegionAnimator::default();
        assert_eq!(animator.live_props().get(), Region::default());
    }

    #[test]
    fn test_live_props_follow_set_region() {
        let animator = RegionAnimator::default();
        let live = animator.live_props();
        let region = Region::new(1.0, 2.0, 3.0, 4.0);
        animator.set_region(region);
        assert_eq!(live.get(), region);
    }

    #[test]
    fn test_falsy_targets_are_noops() {
        let now = Instant::now();
        let animator = RegionAnimator::new(Region::new(5.0, 6.0, 1.0, 1.0).into());
        animator.animate_at(AnimateOptions::new().latitude(0.0), now);
        animator.animate_at(AnimateOptions::new(), now);
        assert!(!animator.is_animating_at(now));
        assert_eq!(animator.region_at(now), Region::new(5.0, 6.0, 1.0, 1.0));
    }

    #[test]
    fn test_tick_reports_running() {
        let now = Instant::now();
        let animator = RegionAnimator::default();
        animator.animate_at(
            AnimateOptions::new()
                .longitude(8.0)
                .duration(Duration::from_millis(100)),
            now,
        );
        assert!(animator.tick(now + Duration::from_millis(50)));
        assert!(!animator.tick(now + Duration::from_millis(100)));
        assert_eq!(animator.region_at(now).longitude, 8.0);
    }
}

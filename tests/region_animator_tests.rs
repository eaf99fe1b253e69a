use animated_clusters::prelude::*;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Region animation with an injected clock
#[cfg(test)]
mod region_animator_tests {
    use super::*;

    fn start() -> RegionAnimator {
        RegionAnimator::new(Region::new(10.0, 20.0, 1.0, 2.0).into())
    }

    /// A second call overrides only the scalars it names
    #[test]
    fn test_per_scalar_override() {
        let animator = start();
        let t0 = Instant::now();

        animator.animate_at(
            AnimateOptions::new()
                .latitude(30.0)
                .longitude(40.0)
                .duration(ms(1000)),
            t0,
        );
        animator.animate_at(AnimateOptions::new().latitude(20.0), t0 + ms(200));

        let settled = animator.region_at(t0 + ms(1200));
        assert_eq!(settled.latitude, 20.0);
        assert_eq!(settled.longitude, 40.0);
        assert_eq!(settled.latitude_delta, 1.0);
        assert_eq!(settled.longitude_delta, 2.0);

        // The override finishes after its own 500ms, the longitude keeps its 1s
        assert_eq!(animator.region_at(t0 + ms(700)).latitude, 20.0);
        assert!(animator.region_at(t0 + ms(700)).longitude < 40.0);
    }

    /// Omitted duration and easing fall back to 500ms ease-in-out
    #[test]
    fn test_default_duration_and_easing() {
        let animator = start();
        let t0 = Instant::now();
        animator.animate_at(AnimateOptions::new().latitude(30.0), t0);

        let halfway = animator.region_at(t0 + ms(250)).latitude;
        assert!((halfway - 20.0).abs() < 1e-9);

        let early = animator.region_at(t0 + ms(100)).latitude;
        assert!(early > 10.0 && early < 14.0, "ease-in start, got {}", early);

        assert!(animator.region_at(t0 + ms(499)).latitude < 30.0);
        assert_eq!(animator.region_at(t0 + ms(500)).latitude, 30.0);
        assert!(animator.is_animating_at(t0 + ms(499)));
        assert!(!animator.is_animating_at(t0 + ms(500)));
    }

    /// Zero and NaN targets are ignored, other scalars still animate
    #[test]
    fn test_falsy_targets_are_skipped() {
        let animator = start();
        let t0 = Instant::now();

        animator.animate_at(
            AnimateOptions::new()
                .latitude(0.0)
                .longitude(f64::NAN)
                .latitude_delta(4.0),
            t0,
        );
        let settled = animator.region_at(t0 + ms(500));
        assert_eq!(settled.latitude, 10.0);
        assert_eq!(settled.longitude, 20.0);
        assert_eq!(settled.latitude_delta, 4.0);

        animator.animate_at(AnimateOptions::new(), t0 + ms(600));
        assert!(!animator.is_animating_at(t0 + ms(600)));
    }

    /// Live props follow the animator without owning it
    #[test]
    fn test_live_props_track_animation() {
        let animator = RegionAnimator::default();
        let live = animator.live_props();
        let t0 = Instant::now();

        assert_eq!(live.get_at(t0), Region::default());

        animator.animate_at(
            AnimateOptions::to_region(Region::new(1.0, 2.0, 3.0, 4.0)).easing(EasingFunction::Linear),
            t0,
        );
        assert_eq!(live.get_at(t0 + ms(250)), Region::new(0.5, 1.0, 1.5, 2.0));

        assert!(!animator.tick(t0 + ms(500)));
        assert_eq!(live.get_at(t0 + ms(500)), Region::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_configured_defaults() {
        let config = RegionAnimationConfig {
            duration_ms: 100,
            easing: EasingFunction::Linear,
        };
        let animator = RegionAnimator::with_config(PartialRegion::default(), config);
        let t0 = Instant::now();

        animator.animate_at(AnimateOptions::new().latitude(10.0), t0);
        assert_eq!(animator.region_at(t0 + ms(50)).latitude, 5.0);
        assert_eq!(animator.region_at(t0 + ms(100)).latitude, 10.0);
    }

    #[test]
    fn test_set_region_cancels_animation() {
        let animator = start();
        let t0 = Instant::now();
        animator.animate_at(AnimateOptions::new().latitude(30.0), t0);

        animator.set_region(Region::new(-5.0, -5.0, 1.0, 1.0));
        assert_eq!(animator.region_at(t0 + ms(100)).latitude, -5.0);
        assert!(!animator.is_animating_at(t0 + ms(100)));
    }
}

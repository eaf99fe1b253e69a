pub mod easing;
pub mod region;
pub mod value;

// Re-export commonly used types and functions for convenience
pub use easing::{EasingFunction, Interpolatable};
pub use region::{AnimateOptions, LiveRegion, RegionAnimator};
pub use value::{AnimatedValue, TweenState};

pub mod feature;
pub mod reconciler;

pub use feature::{
    AnimationDescriptor, ClusterFeature, ClusterId, Feature, Frame, PointFeature, RawMarker,
};
pub use reconciler::{
    plan_transitions, ClusterReconciler, Membership, Transition, TransitionKind, TransitionPlan,
};

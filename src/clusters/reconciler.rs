//! Cluster membership reconciliation
//!
//! Each pass compares the previously rendered frame with the engine's new
//! output and works out, per marker, whether it joined a cluster, left one,
//! or kept its state. Markers whose state changed get an
//! [`AnimationDescriptor`] so the renderer can tween them.
//!
//! Cluster ids are not stable between passes, so matching is done by
//! membership: which cluster (old or new) contains a given marker id.

use crate::{
    clusters::feature::{AnimationDescriptor, ClusterFeature, ClusterId, Feature, Frame, RawMarker},
    core::{
        config::{ClusterOptions, ReconcilerConfig},
        geo::{Region, ViewportSize},
    },
    prelude::{FxHasher, HashMap, HashSet},
    spatial::clustering::RadiusClusterEngine,
    traits::ClusterEngine,
    Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::hash_map::Entry;
use std::hash::{Hash, Hasher};

/// Which cluster of a frame holds each marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Membership {
    clusters: HashMap<String, ClusterFeature>,
}

impl Membership {
    /// Queries the children of every cluster in `frame` once. When two
    /// clusters claim the same marker the first in frame order wins.
    pub fn collect<P, F>(frame: &Frame<P>, mut children: F) -> Result<Self>
    where
        F: FnMut(ClusterId) -> Result<Vec<String>>,
    {
        let mut clusters = HashMap::default();
        for cluster in frame.clusters() {
            for child in children(cluster.id)? {
                match clusters.entry(child) {
                    Entry::Vacant(slot) => {
                        slot.insert(cluster.clone());
                    }
                    Entry::Occupied(slot) => {
                        log::warn!(
                            "marker {} claimed by {} and {}; keeping {}",
                            slot.key(),
                            slot.get().id,
                            cluster.id,
                            slot.get().id
                        );
                    }
                }
            }
        }
        Ok(Self { clusters })
    }

    pub fn cluster_of(&self, marker_id: &str) -> Option<&ClusterFeature> {
        self.clusters.get(marker_id)
    }

    /// Number of clustered markers
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Direction of a marker's state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Standalone in the previous frame, folded into a cluster in the next
    Entering,
    /// Member of a cluster in the previous frame, standalone in the next
    Emerging,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub marker_id: String,
    pub kind: TransitionKind,
    pub descriptor: AnimationDescriptor,
}

/// Animation descriptors for one pass, in marker input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionPlan {
    pub transitions: Vec<Transition>,
}

impl TransitionPlan {
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn count(&self, kind: TransitionKind) -> usize {
        self.transitions.iter().filter(|t| t.kind == kind).count()
    }

    pub fn get(&self, marker_id: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.marker_id == marker_id)
    }

    /// Builds the frame handed to the renderer: the previous frame with
    /// entering markers annotated, followed (when `include_emerging`) by the
    /// next frame's point features of emerging markers.
    pub fn apply<P: Clone>(
        &self,
        previous: &Frame<P>,
        next: &Frame<P>,
        include_emerging: bool,
    ) -> Frame<P> {
        let mut delivered = previous.without_animations();
        let previous_points = previous.point_indices();
        let next_points = next.point_indices();

        for transition in &self.transitions {
            match transition.kind {
                TransitionKind::Entering => {
                    if let Some(&index) = previous_points.get(transition.marker_id.as_str()) {
                        if let Feature::Point(point) = &mut delivered.features[index] {
                            point.animation = Some(transition.descriptor);
                        }
                    }
                }
                TransitionKind::Emerging if include_emerging => {
                    if let Some(Feature::Point(point)) = next_points
                        .get(transition.marker_id.as_str())
                        .map(|&index| &next.features[index])
                    {
                        delivered.features.push(Feature::Point(
                            point.clone().with_animation(transition.descriptor),
                        ));
                    }
                }
                TransitionKind::Emerging => {}
            }
        }
        delivered
    }
}

/// Works out the descriptor of every marker whose cluster state changed
/// between `previous` and `next`.
///
/// - A marker inside a cluster of `next` that was a point of `previous`
///   flies from its previous position to the new cluster.
/// - A marker that is a point of `next` and was inside a cluster of
///   `previous` flies from the old cluster to its new position.
/// - Anything else gets no descriptor.
pub fn plan_transitions<P>(
    markers: &[RawMarker<P>],
    previous: &Frame<P>,
    previous_membership: &Membership,
    next: &Frame<P>,
    next_membership: &Membership,
) -> TransitionPlan {
    let previous_points = previous.point_indices();
    let next_points = next.point_indices();
    let mut seen = HashSet::default();
    let mut transitions = Vec::new();

    for marker in markers {
        let id = marker.id.as_str();
        if !seen.insert(id) {
            continue;
        }

        if let Some(destination) = next_membership.cluster_of(id) {
            if let Some(&index) = previous_points.get(id) {
                transitions.push(Transition {
                    marker_id: marker.id.clone(),
                    kind: TransitionKind::Entering,
                    descriptor: AnimationDescriptor::new(
                        previous.features[index].coordinate(),
                        destination.coordinate,
                    ),
                });
            }
        } else if let Some(origin) = previous_membership.cluster_of(id) {
            if let Some(&index) = next_points.get(id) {
                transitions.push(Transition {
                    marker_id: marker.id.clone(),
                    kind: TransitionKind::Emerging,
                    descriptor: AnimationDescriptor::new(
                        origin.coordinate,
                        next.features[index].coordinate(),
                    ),
                });
            }
        }
    }

    for transition in &transitions {
        log::trace!(
            "{:?} {}: {:?} -> {:?}",
            transition.kind,
            transition.marker_id,
            transition.descriptor.from,
            transition.descriptor.to
        );
    }
    TransitionPlan { transitions }
}

/// Hash of the markers' ids and coordinates
fn marker_fingerprint<P>(markers: &[RawMarker<P>]) -> u64 {
    let mut hasher = FxHasher::default();
    markers.len().hash(&mut hasher);
    for marker in markers {
        marker.id.hash(&mut hasher);
        marker.coordinate.lat.to_bits().hash(&mut hasher);
        marker.coordinate.lng.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Everything that can change the engine's output. Markers are hashed;
/// the view and the options are kept verbatim so a hash collision alone
/// can never skip a pass.
#[derive(Debug, Clone, PartialEq)]
struct PassInputs {
    markers: u64,
    marker_count: usize,
    viewport: [u64; 2],
    region: [u64; 4],
    options: ClusterOptions,
}

impl PassInputs {
    fn capture<P>(
        markers: &[RawMarker<P>],
        viewport: ViewportSize,
        region: &Region,
        options: &ClusterOptions,
    ) -> Self {
        Self {
            markers: marker_fingerprint(markers),
            marker_count: markers.len(),
            viewport: [viewport.width.to_bits(), viewport.height.to_bits()],
            region: [
                region.latitude.to_bits(),
                region.longitude.to_bits(),
                region.latitude_delta.to_bits(),
                region.longitude_delta.to_bits(),
            ],
            options: options.clone(),
        }
    }
}

/// Turns successive clustering results into animated frames.
///
/// Call [`ClusterReconciler::reconcile`] whenever the markers, the viewport
/// or the region may have changed. A pass only runs when those inputs differ
/// from the last successful call; otherwise the engine is skipped and the
/// last engine output is delivered without descriptors. Marker payloads are not
/// part of that comparison: call [`ClusterReconciler::invalidate`] after
/// changing payloads alone.
pub struct ClusterReconciler<P = serde_json::Value, E = RadiusClusterEngine> {
    engine: E,
    options: ClusterOptions,
    config: ReconcilerConfig,
    /// Last engine output, without descriptors
    previous: Frame<P>,
    previous_membership: Membership,
    delivered: Frame<P>,
    last_plan: TransitionPlan,
    /// `delivered` is exactly `previous`
    settled: bool,
    inputs: Option<PassInputs>,
    passes: u64,
    subscribers: Vec<Sender<Frame<P>>>,
}

impl<P: Clone> ClusterReconciler<P, RadiusClusterEngine> {
    /// Reconciler backed by the built-in radius engine
    pub fn with_options(options: ClusterOptions) -> Self {
        Self::new(RadiusClusterEngine::new(), options)
    }
}

impl<P: Clone, E: ClusterEngine<P>> ClusterReconciler<P, E> {
    pub fn new(engine: E, options: ClusterOptions) -> Self {
        Self::with_config(engine, options, ReconcilerConfig::default())
    }

    pub fn with_config(engine: E, options: ClusterOptions, config: ReconcilerConfig) -> Self {
        Self {
            engine,
            options,
            config,
            previous: Frame::empty(),
            previous_membership: Membership::default(),
            delivered: Frame::empty(),
            last_plan: TransitionPlan::default(),
            settled: true,
            inputs: None,
            passes: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Replaces the options; the next `reconcile` runs a pass
    pub fn set_options(&mut self, options: ClusterOptions) {
        self.options = options;
        self.inputs = None;
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconcilerConfig) {
        self.config = config;
        self.inputs = None;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Frame the next pass compares against
    pub fn previous_frame(&self) -> &Frame<P> {
        &self.previous
    }

    /// Frame returned by the last pass
    pub fn delivered(&self) -> &Frame<P> {
        &self.delivered
    }

    /// Transitions computed by the last pass
    pub fn last_plan(&self) -> &TransitionPlan {
        &self.last_plan
    }

    /// Number of passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Receives a copy of every frame delivered from now on
    pub fn subscribe(&mut self) -> Receiver<Frame<P>> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Forces the next `reconcile` to run a pass
    pub fn invalidate(&mut self) {
        self.inputs = None;
    }

    /// Forgets every cached frame; the next pass animates nothing
    pub fn reset(&mut self) {
        self.previous = Frame::empty();
        self.previous_membership = Membership::default();
        self.delivered = Frame::empty();
        self.last_plan = TransitionPlan::default();
        self.settled = true;
        self.inputs = None;
    }

    pub fn reconcile(
        &mut self,
        markers: &[RawMarker<P>],
        viewport: ViewportSize,
        region: &Region,
    ) -> Result<&Frame<P>> {
        let inputs = PassInputs::capture(markers, viewport, region, &self.options);
        if self.inputs.as_ref() == Some(&inputs) {
            log::trace!("reconcile skipped: inputs unchanged");
            self.settle();
            return Ok(&self.delivered);
        }

        let mut next = Frame::new(
            self.engine
                .cluster(markers, viewport, region, &self.options)?,
        );
        next.clear_animations();
        self.run_pass(markers, next)?;
        self.inputs = Some(inputs);
        Ok(&self.delivered)
    }

    fn run_pass(&mut self, markers: &[RawMarker<P>], next: Frame<P>) -> Result<()> {
        let engine = &self.engine;
        let next_membership = Membership::collect(&next, |id| engine.children(id))?;

        // Nothing on screen yet: show the engine output as is
        let seeding = self.previous.is_empty();
        let plan = if seeding
            || !self.config.animate_transitions
            || next.same_layout(&self.previous)
        {
            TransitionPlan::default()
        } else {
            plan_transitions(
                markers,
                &self.previous,
                &self.previous_membership,
                &next,
                &next_membership,
            )
        };

        // Animated deliveries are built on the old frame and settle later
        let animated = self.config.animate_transitions && !seeding;
        let delivered = if animated {
            plan.apply(&self.previous, &next, self.config.include_emerging)
        } else {
            next.clone()
        };

        self.passes += 1;
        log::debug!(
            "reconcile pass {}: {} features, {} entering, {} emerging",
            self.passes,
            next.len(),
            plan.count(TransitionKind::Entering),
            plan.count(TransitionKind::Emerging)
        );

        self.previous = next;
        self.previous_membership = next_membership;
        self.delivered = delivered;
        self.last_plan = plan;
        self.settled = !animated;
        self.broadcast();
        Ok(())
    }

    /// Replaces the last delivery, which was built on the frame before it,
    /// with the current engine output. Subscribers hear about it once.
    fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.delivered = self.previous.clone();
        self.last_plan = TransitionPlan::default();
        self.settled = true;
        self.broadcast();
    }

    fn broadcast(&mut self) {
        let frame = &self.delivered;
        self.subscribers
            .retain(|subscriber| subscriber.send(frame.clone()).is_ok());
    }
}

//! Seams between the reconciler and the components it drives

use crate::{
    clusters::feature::{ClusterId, Feature, RawMarker},
    core::{
        config::ClusterOptions,
        geo::{Region, ViewportSize},
    },
    Result,
};

/// A spatial clustering engine.
///
/// `cluster` partitions the markers into point and cluster features for the
/// given view. Every marker must land in exactly one feature. `children`
/// reports the ids of every marker folded (transitively) into a cluster and
/// must keep answering for the clusters of the current and the preceding
/// `cluster` call.
pub trait ClusterEngine<P> {
    fn cluster(
        &mut self,
        markers: &[RawMarker<P>],
        viewport: ViewportSize,
        region: &Region,
        options: &ClusterOptions,
    ) -> Result<Vec<Feature<P>>>;

    fn children(&self, cluster: ClusterId) -> Result<Vec<String>>;
}

impl<P, E: ClusterEngine<P> + ?Sized> ClusterEngine<P> for Box<E> {
    fn cluster(
        &mut self,
        markers: &[RawMarker<P>],
        viewport: ViewportSize,
        region: &Region,
        options: &ClusterOptions,
    ) -> Result<Vec<Feature<P>>> {
        (**self).cluster(markers, viewport, region, options)
    }

    fn children(&self, cluster: ClusterId) -> Result<Vec<String>> {
        (**self).children(cluster)
    }
}

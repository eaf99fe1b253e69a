use animated_clusters::prelude::*;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GeoJSON file with Point features; a synthetic set is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON configuration (clustering, regionAnimation, reconciler)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clustering preset: dense, balanced, sparse. Not combinable with --config
    #[arg(long, default_value = "balanced", conflicts_with = "config")]
    profile: String,

    /// Number of synthetic markers
    #[arg(long, default_value = "200")]
    markers: usize,

    /// Map center latitude
    #[arg(long, default_value = "48.8566", allow_hyphen_values = true)]
    lat: f64,

    /// Map center longitude
    #[arg(long, default_value = "2.3522", allow_hyphen_values = true)]
    lng: f64,

    /// Zoom levels to visit, in order
    #[arg(long, value_delimiter = ',', default_value = "3,6,9,12,9,6,3")]
    zooms: Vec<f64>,

    /// Region samples reconciled while animating between two zoom levels
    #[arg(long, default_value = "4")]
    samples: u32,

    /// Viewport width in pixels
    #[arg(long, default_value = "400")]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value = "800")]
    height: f64,

    /// Print every delivered frame as GeoJSON
    #[arg(long)]
    json: bool,
}

fn parse_profile(name: &str) -> anyhow::Result<ClusterProfile> {
    match name {
        "dense" => Ok(ClusterProfile::Dense),
        "balanced" => Ok(ClusterProfile::Balanced),
        "sparse" => Ok(ClusterProfile::Sparse),
        other => anyhow::bail!("unknown profile '{}'", other),
    }
}

/// The config file wins outright; otherwise defaults plus the profile
fn load_config(args: &Args) -> anyhow::Result<AnimatedClustersConfig> {
    match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(AnimatedClustersConfig::from_json_str(&text).map_err(|e| anyhow::anyhow!(e))?)
        }
        None => Ok(AnimatedClustersConfig {
            clustering: parse_profile(&args.profile)?.resolve(),
            ..Default::default()
        }),
    }
}

/// Markers on a golden-angle spiral around the center, dense in the middle
fn synthetic_markers(center: LatLng, count: usize) -> Vec<RawMarker> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    (0..count)
        .map(|i| {
            let radius = 2.0 * ((i as f64 + 0.5) / count as f64).sqrt();
            let angle = i as f64 * golden_angle;
            let coordinate = LatLng::new(
                center.lat + radius * angle.sin() / 2.0,
                center.lng + radius * angle.cos(),
            );
            RawMarker::new(
                format!("marker-{}", i),
                coordinate,
                serde_json::json!({ "rank": i }),
            )
        })
        .collect()
}

fn load_markers(args: &Args) -> anyhow::Result<Vec<RawMarker>> {
    match &args.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(markers_from_geojson(&text).map_err(|e| anyhow::anyhow!(e))?)
        }
        None => Ok(synthetic_markers(LatLng::new(args.lat, args.lng), args.markers)),
    }
}

/// Region showing `zoom` across `width` pixels
fn region_at_zoom(center: LatLng, zoom: f64, viewport: ViewportSize) -> Region {
    let longitude_delta = 360.0 * (viewport.width / 256.0) / 2f64.powf(zoom);
    let latitude_delta = longitude_delta * viewport.height / viewport.width;
    Region::new(center.lat, center.lng, latitude_delta, longitude_delta)
}

/// Features whose position falls inside the region
fn visible_features(frame: &Frame, region: &Region) -> usize {
    let bounds = region.bounds();
    frame
        .iter()
        .filter(|feature| bounds.contains(&feature.coordinate()))
        .count()
}

fn report(
    frame: &Frame,
    plan: &TransitionPlan,
    region: &Region,
    step: usize,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&frame_to_geojson(frame).map_err(|e| anyhow::anyhow!(e))?)?);
        return Ok(());
    }
    println!(
        "step {:>3}: {:>4} features ({:>3} clusters, {:>4} visible), \
         {:>3} entering, {:>3} emerging",
        step,
        frame.len(),
        frame.clusters().count(),
        visible_features(frame, region),
        plan.count(TransitionKind::Entering),
        plan.count(TransitionKind::Emerging)
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    config.clustering.validate().map_err(|e| anyhow::anyhow!(e))?;
    let markers = load_markers(&args)?;
    log::info!("loaded {} markers", markers.len());

    let viewport = ViewportSize::new(args.width, args.height);
    let center = LatLng::new(args.lat, args.lng);
    let mut zooms = args.zooms.iter().copied();
    let first = zooms.next().context("at least one zoom level is required")?;

    let animator = RegionAnimator::with_config(
        region_at_zoom(center, first, viewport).into(),
        config.region_animation.clone(),
    );
    let live = animator.live_props();
    let mut reconciler = ClusterReconciler::with_config(
        RadiusClusterEngine::new(),
        config.clustering.clone(),
        config.reconciler.clone(),
    );

    // Simulated clock so the replay is deterministic
    let mut now = Instant::now();
    let duration = config.region_animation.duration();
    let samples = args.samples.max(1);
    let mut step = 0;

    let region = live.get_at(now);
    reconciler.reconcile(&markers, viewport, &region).map_err(|e| anyhow::anyhow!(e))?;
    report(reconciler.delivered(), reconciler.last_plan(), &region, step, args.json)?;

    for zoom in zooms {
        log::info!("animating to zoom {}", zoom);
        animator.animate_at(
            AnimateOptions::to_region(region_at_zoom(center, zoom, viewport)),
            now,
        );
        let started = now;
        for sample in 1..=samples {
            now = started + duration * sample / samples;
            step += 1;
            let region = live.get_at(now);
            reconciler.reconcile(&markers, viewport, &region).map_err(|e| anyhow::anyhow!(e))?;
            report(reconciler.delivered(), reconciler.last_plan(), &region, step, args.json)?;
        }
        animator.tick(now);
    }

    log::info!("{} reconcile passes", reconciler.passes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_and_config_conflict() {
        let err = Args::try_parse_from([
            "animated-clusters",
            "--config",
            "c.json",
            "--profile",
            "dense",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        // The default profile alone does not count as a conflict
        let args = Args::try_parse_from(["animated-clusters", "--config", "c.json"]).unwrap();
        assert_eq!(args.profile, "balanced");
    }

    #[test]
    fn test_profile_applies_without_config() {
        let args = Args::try_parse_from(["animated-clusters", "--profile", "dense"]).unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.clustering, ClusterProfile::Dense.resolve());

        let args = Args::try_parse_from(["animated-clusters", "--profile", "huge"]).unwrap();
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_visible_features() {
        let frame = Frame::new(vec![
            Feature::point(RawMarker::new("in", LatLng::new(1.0, 1.0), serde_json::Value::Null)),
            Feature::point(RawMarker::new("out", LatLng::new(30.0, 1.0), serde_json::Value::Null)),
        ]);
        assert_eq!(visible_features(&frame, &Region::new(0.0, 0.0, 10.0, 10.0)), 1);
    }
}

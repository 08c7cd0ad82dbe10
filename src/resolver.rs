use crate::error::Result;
use crate::geometry;
use crate::overpass::PoiSource;
use crate::types::{Poi, ReachableArea};

use futures::future::try_join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

pub const DEFAULT_MAX_POIS: usize = 10;

/// Every distinct POI strictly inside `region`, in first-seen order.
///
/// One query per polygon, issued concurrently. A single failed query fails
/// the whole call.
pub async fn candidates<S: PoiSource>(region: &ReachableArea, source: &S) -> Result<Vec<Poi>> {
    // Step 1: Bounding boxes, rejecting empty shells before any request
    let boxes = region
        .shells
        .iter()
        .map(|shell| geometry::bounding_box(shell))
        .collect::<Result<Vec<_>>>()?;

    // Step 2: Fetch raw POIs per box
    let batches = try_join_all(boxes.into_iter().map(|bbox| source.query(bbox))).await?;
    let raw_count: usize = batches.iter().map(Vec::len).sum();

    // Step 3: Deduplicate and drop what the boxes caught outside the area
    let area = region.to_multi_polygon();
    let mut seen = HashSet::new();
    let kept = batches
        .into_iter()
        .flatten()
        .filter(|poi| geometry::multi_polygon_contains(&area, poi.coordinate()))
        .filter(|poi| seen.insert(poi.clone()))
        .collect::<Vec<_>>();

    debug!(
        "{} raw POIs from {} polygons, {} distinct inside the area",
        raw_count,
        region.shells.len(),
        kept.len()
    );
    Ok(kept)
}

/// Uniformly shuffle and keep at most `max_count`
pub fn sample<R: Rng + ?Sized>(mut pois: Vec<Poi>, max_count: usize, rng: &mut R) -> Vec<Poi> {
    pois.shuffle(rng);
    pois.truncate(max_count);
    pois
}

/// A random selection of at most `max_count` distinct POIs inside `region`
pub async fn resolve<S: PoiSource>(
    region: &ReachableArea,
    source: &S,
    max_count: usize,
) -> Result<Vec<Poi>> {
    let found = candidates(region, source).await?;
    let total = found.len();
    let pois = sample(found, max_count, &mut rand::thread_rng());
    info!("Resolved {} of {} POIs", pois.len(), total);
    Ok(pois)
}

/// `resolve` with a caller supplied random source
pub async fn resolve_with_rng<S: PoiSource, R: Rng + ?Sized>(
    region: &ReachableArea,
    source: &S,
    max_count: usize,
    rng: &mut R,
) -> Result<Vec<Poi>> {
    let found = candidates(region, source).await?;
    Ok(sample(found, max_count, rng))
}

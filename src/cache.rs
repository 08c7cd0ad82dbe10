use crate::error::Result;
use crate::overpass::PoiSource;
use crate::types::{BoundingBox, Poi};

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::debug;

type BboxKey = [u64; 4];

// Exact box only, a neighbouring box may hold different POIs
fn cache_key(bbox: &BoundingBox) -> BboxKey {
    [bbox.west, bbox.south, bbox.east, bbox.north].map(f64::to_bits)
}

/// Wraps a `PoiSource` with an LRU cache keyed by the bounding box.
/// A capacity of zero turns the cache off and every query goes to the
/// inner source. Failed queries are not cached.
pub struct CachedPoiSource<S> {
    inner: S,
    cache: Option<Mutex<LruCache<BboxKey, Vec<Poi>>>>,
}

impl<S: PoiSource> CachedPoiSource<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            cache: NonZeroUsize::new(capacity).map(|c| Mutex::new(LruCache::new(c))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check_cache(&self, key: &BboxKey) -> Option<Vec<Poi>> {
        let mut cache = self.cache.as_ref()?.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(key).cloned()
    }

    fn insert_into_cache(&self, key: BboxKey, pois: Vec<Poi>) {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.put(key, pois);
        }
    }
}

impl<S: PoiSource> PoiSource for CachedPoiSource<S> {
    async fn query(&self, bbox: BoundingBox) -> Result<Vec<Poi>> {
        if !self.is_enabled() {
            return self.inner.query(bbox).await;
        }

        let key = cache_key(&bbox);
        if let Some(pois) = self.check_cache(&key) {
            debug!("POI cache hit for {:?}", bbox);
            return Ok(pois);
        }

        let pois = self.inner.query(bbox).await?;
        self.insert_into_cache(key, pois.clone());
        Ok(pois)
    }
}

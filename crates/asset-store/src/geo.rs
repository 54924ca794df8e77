//! Coordinate → region resolution used by imports when a row carries no region.

use crate::config::{RegionBox, StoreConfig};

/// Resolves a region code from a coordinate. `None` (or an empty string) means unknown.
pub trait RegionResolver: Send + Sync {
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// Resolver that never knows the region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegionResolver;

impl RegionResolver for NoRegionResolver {
    fn resolve(&self, _latitude: f64, _longitude: f64) -> Option<String> {
        None
    }
}

impl<F> RegionResolver for F
where
    F: Fn(f64, f64) -> Option<String> + Send + Sync,
{
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String> {
        self(latitude, longitude)
    }
}

/// Resolver backed by configured bounding boxes; the first box containing the point wins.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxResolver {
    boxes: Vec<RegionBox>,
}

impl BoundingBoxResolver {
    pub fn new(boxes: Vec<RegionBox>) -> Self {
        Self { boxes }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.region_boxes.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl RegionResolver for BoundingBoxResolver {
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String> {
        self.boxes
            .iter()
            .find(|b| b.contains(latitude, longitude))
            .map(|b| b.code.clone())
    }
}

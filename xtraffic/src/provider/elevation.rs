//! In-memory elevation provider.
//!
//! The simulator driver probes terrain asynchronously and remembers the
//! results here; interpolators only ever read. A query never blocks on a
//! probe: a miss simply returns `None`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::coord::{ElevationPlane, GeoPosition};

use super::ElevationProvider;

/// Planes kept by default.
pub const DEFAULT_ELEVATION_CACHE_CAPACITY: usize = 1000;

/// Bounded cache of elevation planes, newest first.
#[derive(Debug)]
pub struct ElevationCache {
    planes: RwLock<VecDeque<ElevationPlane>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for ElevationCache {
    fn default() -> Self {
        Self::new(DEFAULT_ELEVATION_CACHE_CAPACITY)
    }
}

impl ElevationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            planes: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Remember a plane, evicting the oldest on overflow.
    pub fn remember(&self, plane: ElevationPlane) {
        if !plane.elevation_ft.is_finite() {
            return;
        }
        let mut planes = self.planes.write();
        planes.push_front(plane);
        planes.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.planes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.read().is_empty()
    }

    pub fn clear(&self) {
        self.planes.write().clear();
    }

    /// Successful lookups.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Failed lookups.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl ElevationProvider for ElevationCache {
    fn find_closest_elevation(&self, position: &GeoPosition, radius_m: f64) -> Option<ElevationPlane> {
        let planes = self.planes.read();
        let closest = planes
            .iter()
            .map(|plane| (plane.distance_m(position), plane))
            .filter(|(distance, _)| *distance <= radius_m)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, plane)| *plane);
        drop(planes);

        match closest {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        closest
    }
}

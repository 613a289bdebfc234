//! Thread-safe holder of the current cluster index.
//!
//! `Clusterer` wraps an `Arc<RwLock<Option<Arc<ClusterIndex>>>>`. A load builds
//! the new index without holding the lock and only takes the write lock to
//! swap the snapshot in, so readers are never blocked by a build. Queries grab
//! the current snapshot and release the lock before doing any work; callers
//! that hold an older snapshot keep a consistent view until they drop it.
//!
//! # Examples
//!
//! ```rust
//! use geocluster::{Clusterer, ClusterOptions, InputPoint};
//! use std::thread;
//!
//! # fn main() -> geocluster::Result<()> {
//! let clusterer = Clusterer::new(ClusterOptions::default())?;
//!
//! let loader = clusterer.clone();
//! thread::spawn(move || {
//!     loader
//!         .load_points(vec![
//!             InputPoint::from_lng_lat(2.35, 48.85),
//!             InputPoint::from_lng_lat(2.36, 48.86),
//!         ])
//!         .unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! let features = clusterer.get_clusters([-180.0, -85.0, 180.0, 85.0], 3)?;
//! assert_eq!(features.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::compute::geojson as convert;
use crate::config::ClusterOptions;
use crate::error::{ClusterError, Result};
use crate::index::{ClusterFeature, ClusterIndex, TileFeature};
use crate::point::InputPoint;
use crate::reduce::PropertyReducer;
use geocluster_types::{ClusterId, LngLatBounds};
use geojson::Feature;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cluster engine with a swappable snapshot.
///
/// Cloning is cheap; clones share the same snapshot slot.
#[derive(Clone, Debug)]
pub struct Clusterer {
    options: ClusterOptions,
    reducer: Option<Arc<dyn PropertyReducer>>,
    inner: Arc<RwLock<Option<Arc<ClusterIndex>>>>,
}

impl Clusterer {
    /// Create an empty engine. Queries fail with `NotLoaded` until the first
    /// successful load.
    pub fn new(options: ClusterOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            reducer: None,
            inner: Arc::new(RwLock::new(None)),
        })
    }

    /// Aggregate point properties into clusters on every subsequent load.
    pub fn with_reducer(mut self, reducer: impl PropertyReducer + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    pub(crate) fn with_shared_reducer(mut self, reducer: Option<Arc<dyn PropertyReducer>>) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    // ===== Loading =====

    /// Replace the current snapshot with an index over `features`.
    ///
    /// Every feature must have a `Point` geometry. On any error the previous
    /// snapshot stays in place.
    pub fn load(&self, features: Vec<Feature>) -> Result<Arc<ClusterIndex>> {
        let points = convert::points_from_features(features)?;
        self.load_points(points)
    }

    /// Replace the current snapshot with an index over already converted
    /// points.
    pub fn load_points(&self, points: Vec<InputPoint>) -> Result<Arc<ClusterIndex>> {
        let index = Arc::new(ClusterIndex::build_with_reducer(
            self.options.clone(),
            points,
            self.reducer.as_deref(),
        )?);
        *self.inner.write() = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Parse GeoJSON text and load it.
    pub fn load_geojson(&self, text: &str) -> Result<Arc<ClusterIndex>> {
        let points = convert::points_from_geojson(text)?;
        self.load_points(points)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Result<Arc<ClusterIndex>> {
        self.inner.read().clone().ok_or(ClusterError::NotLoaded)
    }

    // ===== Queries =====

    /// Features inside `bounds` at `zoom`, as GeoJSON.
    pub fn get_clusters(&self, bounds: impl Into<LngLatBounds>, zoom: u8) -> Result<Vec<Feature>> {
        let index = self.snapshot()?;
        let features = index.get_clusters(bounds, zoom)?;
        Ok(features.iter().map(ClusterFeature::to_geojson).collect())
    }

    /// Features of tile `z/x/y` with geometry in tile pixel coordinates.
    pub fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Vec<Feature>> {
        let index = self.snapshot()?;
        let features = index.get_tile(z, x, y)?;
        Ok(features.iter().map(TileFeature::to_geojson).collect())
    }

    pub fn get_children(&self, id: ClusterId) -> Result<Vec<Feature>> {
        let index = self.snapshot()?;
        let features = index.get_children(id)?;
        Ok(features.iter().map(ClusterFeature::to_geojson).collect())
    }

    pub fn get_leaves(&self, id: ClusterId, limit: usize, offset: usize) -> Result<Vec<Feature>> {
        let index = self.snapshot()?;
        let features = index.get_leaves(id, limit, offset)?;
        Ok(features.iter().map(ClusterFeature::to_geojson).collect())
    }

    pub fn get_cluster_expansion_zoom(&self, id: ClusterId) -> Result<u8> {
        self.snapshot()?.get_cluster_expansion_zoom(id)
    }
}

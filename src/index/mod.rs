//! The cluster index: an immutable snapshot of the zoom hierarchy.
//!
//! A [`ClusterIndex`] holds one [`KdIndex`] per zoom level from `min_zoom` to
//! `max_zoom + 1`, the loaded points, and the registry of clusters created
//! while building. It is built in one pass by [`ClusterIndex::build`] and has
//! no mutation API; loading a new batch means building a new index.
//!
//! ```rust
//! use geocluster::{ClusterIndex, ClusterOptions, InputPoint};
//! use geocluster_types::LngLatBounds;
//!
//! let points = vec![
//!     InputPoint::from_lng_lat(116.40, 39.92),
//!     InputPoint::from_lng_lat(116.41, 39.92),
//!     InputPoint::from_lng_lat(-74.00, 40.71),
//! ];
//! let index = ClusterIndex::build(ClusterOptions::default(), points)?;
//!
//! let features = index.get_clusters(LngLatBounds::world(), 2)?;
//! let total: u32 = features.iter().map(|f| f.point_count()).sum();
//! assert_eq!(total, 3);
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

pub mod build;
pub mod feature;
pub mod query;

use crate::compute::kdtree::KdIndex;
use crate::compute::projection;
use crate::config::ClusterOptions;
use crate::error::{ClusterError, Result};
use crate::point::InputPoint;
use geocluster_types::{ClusterId, EntryId};
use geojson::JsonObject;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

pub use feature::{ClusterFeature, ClusterSummary, TileFeature};
pub use query::Leaves;

/// Unit of storage inside a zoom level: a leaf or a cluster at its projected
/// position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedEntry {
    pub x: f64,
    pub y: f64,
    /// Number of original points represented.
    pub weight: u32,
    pub id: EntryId,
}

impl ProjectedEntry {
    pub fn is_cluster(&self) -> bool {
        self.id.is_cluster()
    }
}

/// Metadata of a cluster created during the build.
#[derive(Debug)]
pub struct ClusterRecord {
    id: ClusterId,
    weight: u32,
    x: f64,
    y: f64,
    /// Slots of the members in the entry list of `zoom + 1`.
    children: SmallVec<[u32; 4]>,
    below_min_points: bool,
    properties: Option<JsonObject>,
    expansion_zoom: OnceCell<u8>,
}

impl ClusterRecord {
    pub(crate) fn new(
        id: ClusterId,
        weight: u32,
        (x, y): (f64, f64),
        children: SmallVec<[u32; 4]>,
        min_points: u32,
        properties: Option<JsonObject>,
    ) -> Self {
        Self {
            id,
            weight,
            x,
            y,
            children,
            below_min_points: weight < min_points,
            properties,
            expansion_zoom: OnceCell::new(),
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Zoom level the cluster was created at.
    pub fn zoom(&self) -> u8 {
        self.id.zoom()
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Projected centroid.
    pub fn projected(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Geographic centroid.
    pub fn centroid(&self) -> geo::Point<f64> {
        projection::unproject(self.x, self.y)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether the cluster is lighter than `min_points` and is displayed as
    /// its individual points.
    pub fn is_below_min_points(&self) -> bool {
        self.below_min_points
    }

    pub fn properties(&self) -> Option<&JsonObject> {
        self.properties.as_ref()
    }

    pub(crate) fn children(&self) -> &[u32] {
        &self.children
    }
}

/// Entries and spatial index of a single zoom level.
#[derive(Debug)]
pub(crate) struct Level {
    pub(crate) entries: Vec<ProjectedEntry>,
    pub(crate) tree: KdIndex,
}

impl Level {
    pub(crate) fn new(entries: Vec<ProjectedEntry>, node_size: usize) -> Self {
        let tree = KdIndex::new(entries.iter().map(|e| (e.x, e.y)), node_size);
        Self { entries, tree }
    }
}

/// Immutable, thread-safe snapshot of a clustered point set.
#[derive(Debug)]
pub struct ClusterIndex {
    options: ClusterOptions,
    points: Vec<InputPoint>,
    /// `levels[z - min_zoom]` for `z` in `min_zoom..=max_zoom + 1`.
    levels: Vec<Level>,
    registry: FxHashMap<ClusterId, ClusterRecord>,
}

impl ClusterIndex {
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Loaded points, in input order.
    pub fn points(&self) -> &[InputPoint] {
        &self.points
    }

    /// Number of loaded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of clusters created across all zoom levels.
    pub fn cluster_count(&self) -> usize {
        self.registry.len()
    }

    /// Entries stored at `zoom` (clamped to the indexed range).
    pub fn entries(&self, zoom: u8) -> &[ProjectedEntry] {
        &self.level(zoom).entries
    }

    /// Look up a cluster by id.
    pub fn cluster(&self, id: ClusterId) -> Result<&ClusterRecord> {
        self.registry
            .get(&id)
            .ok_or(ClusterError::UnknownCluster(id))
    }

    /// Level for `zoom`, clamped to `[min_zoom, max_zoom + 1]`.
    pub(crate) fn level(&self, zoom: u8) -> &Level {
        let zoom = self.options.clamp_zoom(zoom);
        &self.levels[usize::from(zoom - self.options.min_zoom)]
    }

    /// Projected position of the leaf at `index`.
    pub(crate) fn leaf_entry(&self, index: usize) -> &ProjectedEntry {
        &self.level(self.options.max_zoom + 1).entries[index]
    }
}

//! Query output.

use crate::point::InputPoint;
use geocluster_types::{ClusterId, EntryId};
use geojson::JsonObject;

/// A marker returned by a query: an original point or an aggregated cluster.
///
/// Leaves borrow the loaded point, so results live as long as the
/// [`ClusterIndex`](crate::ClusterIndex) they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterFeature<'a> {
    Leaf(&'a InputPoint),
    Cluster(ClusterSummary),
}

impl ClusterFeature<'_> {
    pub fn id(&self) -> EntryId {
        match self {
            Self::Leaf(point) => EntryId::Leaf(point.index()),
            Self::Cluster(summary) => EntryId::Cluster(summary.id),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }

    /// Number of original points represented; 1 for a leaf.
    pub fn point_count(&self) -> u32 {
        match self {
            Self::Leaf(_) => 1,
            Self::Cluster(summary) => summary.point_count,
        }
    }

    /// Geographic position: the point itself or the cluster centroid.
    pub fn position(&self) -> geo::Point<f64> {
        match self {
            Self::Leaf(point) => point.position(),
            Self::Cluster(summary) => summary.position,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterSummary> {
        match self {
            Self::Leaf(_) => None,
            Self::Cluster(summary) => Some(summary),
        }
    }

    pub fn as_leaf(&self) -> Option<&InputPoint> {
        match self {
            Self::Leaf(point) => Some(point),
            Self::Cluster(_) => None,
        }
    }

    pub fn to_geojson(&self) -> geojson::Feature {
        crate::compute::geojson::cluster_feature_to_geojson(self)
    }
}

/// Display data of a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub id: ClusterId,
    pub point_count: u32,
    /// Weighted centroid in longitude/latitude.
    pub position: geo::Point<f64>,
    pub expansion_zoom: u8,
    /// Aggregated properties when a reducer was used at build time.
    pub properties: Option<JsonObject>,
}

impl ClusterSummary {
    pub fn point_count_abbreviated(&self) -> String {
        abbreviate_count(self.point_count)
    }
}

/// A query result placed in tile-local pixel coordinates.
///
/// Coordinates run from `0` to `extent` inside the tile and may fall slightly
/// outside it for features collected from the tile buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFeature<'a> {
    pub x: i64,
    pub y: i64,
    pub feature: ClusterFeature<'a>,
}

impl TileFeature<'_> {
    pub fn to_geojson(&self) -> geojson::Feature {
        crate::compute::geojson::tile_feature_to_geojson(self)
    }
}

/// Short label for a point count: `999`, `1.2k`, `34k`, `2.5M`.
///
/// # Examples
///
/// ```
/// use geocluster::index::feature::abbreviate_count;
///
/// assert_eq!(abbreviate_count(999), "999");
/// assert_eq!(abbreviate_count(1_000), "1k");
/// assert_eq!(abbreviate_count(1_250), "1.3k");
/// assert_eq!(abbreviate_count(34_499), "34k");
/// assert_eq!(abbreviate_count(2_500_000), "2.5M");
/// ```
pub fn abbreviate_count(count: u32) -> String {
    if count >= 1_000_000 {
        format!("{}M", (f64::from(count) / 100_000.0).round() / 10.0)
    } else if count >= 10_000 {
        format!("{}k", (f64::from(count) / 1_000.0).round())
    } else if count >= 1_000 {
        format!("{}k", (f64::from(count) / 100.0).round() / 10.0)
    } else {
        count.to_string()
    }
}

//! Hierarchical point clustering for interactive maps.
//!
//! Points are merged zoom by zoom into a pyramid of clusters, and the result
//! is queried by bounding box, map tile, or by walking a cluster's children
//! and leaves.
//!
//! ```rust
//! use geocluster::{Clusterer, ClusterOptions, InputPoint, LngLatBounds};
//!
//! let clusterer = Clusterer::new(ClusterOptions::default())?;
//! clusterer.load_points(vec![
//!     InputPoint::from_lng_lat(-74.0060, 40.7128),
//!     InputPoint::from_lng_lat(-74.0050, 40.7130),
//!     InputPoint::from_lng_lat(139.6917, 35.6895),
//! ])?;
//!
//! let world = clusterer.get_clusters(LngLatBounds::world(), 0)?;
//! assert_eq!(world.len(), 2);
//! # Ok::<(), geocluster::ClusterError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod point;
pub mod reduce;

pub use builder::ClustererBuilder;
pub use config::ClusterOptions;
pub use engine::Clusterer;
pub use error::{ClusterError, Result};
pub use index::{
    ClusterFeature, ClusterIndex, ClusterRecord, ClusterSummary, Leaves, ProjectedEntry,
    TileFeature,
};
pub use point::InputPoint;
pub use reduce::{PropertyReducer, SumProperties};

pub use geocluster_types::{ClusterId, EntryId, LngLatBounds, ParseClusterIdError, TileCoord};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterError, Clusterer, ClustererBuilder, Result};

    pub use crate::{ClusterFeature, ClusterIndex, ClusterOptions, InputPoint};

    pub use crate::{ClusterId, EntryId, LngLatBounds, TileCoord};

    pub use crate::{PropertyReducer, SumProperties};

    pub use geo::Point;
}

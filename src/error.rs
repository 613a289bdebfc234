//! Error types for loading and querying a cluster index.

use geocluster_types::{ClusterId, ParseClusterIdError};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// A feature without a `Point` geometry was passed to `load`. The whole
    /// batch is rejected.
    #[error("feature {index} has unsupported geometry `{geometry}`, only Point is accepted")]
    UnsupportedGeometry { index: usize, geometry: String },

    #[error("feature {index} has invalid coordinates: {reason}")]
    InvalidCoordinates { index: usize, reason: String },

    #[error("no points have been loaded")]
    NotLoaded,

    #[error("no cluster with id {0}")]
    UnknownCluster(ClusterId),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("tile {z}/{x}/{y} is outside the zoom {z} grid")]
    InvalidTile { z: u8, x: u32, y: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    InvalidClusterId(#[from] ParseClusterIdError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("toml error: {0}")]
    Toml(String),
}

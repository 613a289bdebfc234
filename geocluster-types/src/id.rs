use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a synthetic cluster.
///
/// A cluster is identified by the zoom level it was created at and its slot in
/// that zoom level's entry list. The pair never changes after the cluster is
/// created, and it never overlaps with a leaf identifier because the two live
/// in different variants of [`EntryId`].
///
/// # Examples
///
/// ```
/// use geocluster_types::ClusterId;
///
/// let id = ClusterId::new(4, 17);
/// assert_eq!(id.to_string(), "4/17");
/// assert_eq!("4/17".parse::<ClusterId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId {
    zoom: u8,
    index: u32,
}

impl ClusterId {
    /// Create an identifier from a creation zoom and a slot index.
    #[inline]
    pub const fn new(zoom: u8, index: u32) -> Self {
        Self { zoom, index }
    }

    /// Zoom level the cluster was created at.
    #[inline]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Slot of the cluster within its creation zoom's entry list.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zoom, self.index)
    }
}

/// Error returned when a string is not a valid `zoom/index` cluster id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClusterIdError {
    input: String,
}

impl fmt::Display for ParseClusterIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid cluster id `{}`, expected `zoom/index`",
            self.input
        )
    }
}

impl std::error::Error for ParseClusterIdError {}

impl FromStr for ClusterId {
    type Err = ParseClusterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseClusterIdError {
            input: s.to_string(),
        };
        let (zoom, index) = s.split_once('/').ok_or_else(err)?;
        let zoom = zoom.trim().parse::<u8>().map_err(|_| err())?;
        let index = index.trim().parse::<u32>().map_err(|_| err())?;
        Ok(Self::new(zoom, index))
    }
}

/// Identifier of an entry stored in a zoom level's spatial index.
///
/// Leaves carry the position of the original point in the loaded batch;
/// clusters carry their [`ClusterId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryId {
    Leaf(usize),
    Cluster(ClusterId),
}

impl EntryId {
    /// Whether this entry is a synthetic cluster.
    #[inline]
    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }

    /// The leaf index, if this is a leaf.
    #[inline]
    pub fn as_leaf(&self) -> Option<usize> {
        match self {
            Self::Leaf(index) => Some(*index),
            Self::Cluster(_) => None,
        }
    }

    /// The cluster id, if this is a cluster.
    #[inline]
    pub fn as_cluster(&self) -> Option<ClusterId> {
        match self {
            Self::Leaf(_) => None,
            Self::Cluster(id) => Some(*id),
        }
    }
}

impl From<ClusterId> for EntryId {
    fn from(id: ClusterId) -> Self {
        Self::Cluster(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(index) => write!(f, "leaf:{}", index),
            Self::Cluster(id) => write!(f, "cluster:{}", id),
        }
    }
}

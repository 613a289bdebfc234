//! # geocluster-types
//!
//! Plain value types shared by the geocluster engine and its callers:
//!
//! - **Identifiers**: `ClusterId`, `EntryId`
//! - **Bounds**: `LngLatBounds`, a geographic box that may cross the antimeridian
//! - **Tiles**: `TileCoord`
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use geocluster_types::{ClusterId, EntryId, LngLatBounds};
//!
//! let id: ClusterId = "3/12".parse().unwrap();
//! assert_eq!(id.zoom(), 3);
//! assert!(EntryId::from(id).is_cluster());
//!
//! let bounds = LngLatBounds::new(170.0, -10.0, -170.0, 10.0);
//! assert_eq!(bounds.parts().len(), 2);
//! ```

pub mod bbox;
pub mod id;
pub mod tile;

pub use bbox::LngLatBounds;
pub use id::{ClusterId, EntryId, ParseClusterIdError};
pub use tile::TileCoord;

//! Compute layer: projection, the static spatial index, and input handling.
//!
//! Everything here is independent of the cluster hierarchy; the `index`
//! module builds on top of it.

pub mod geojson;
pub mod kdtree;
pub mod projection;
pub mod validation;

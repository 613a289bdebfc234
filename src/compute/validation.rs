//! Validation for input coordinates, query bounds and tile addresses.

use crate::error::{ClusterError, Result};
use crate::point::InputPoint;
use geocluster_types::{LngLatBounds, TileCoord};

/// Validates the position of the feature at `index`.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]. Latitudes beyond the
/// Mercator limit are accepted and clamped by the projection.
///
/// # Examples
///
/// ```
/// use geocluster::compute::validation::validate_position;
///
/// assert!(validate_position(0, &geo::Point::new(-74.0060, 40.7128)).is_ok());
/// assert!(validate_position(0, &geo::Point::new(0.0, 89.9)).is_ok());
/// assert!(validate_position(1, &geo::Point::new(200.0, 40.0)).is_err());
/// ```
pub fn validate_position(index: usize, point: &geo::Point<f64>) -> Result<()> {
    let (x, y) = (point.x(), point.y());
    let invalid = |reason: String| ClusterError::InvalidCoordinates { index, reason };

    if !x.is_finite() {
        return Err(invalid(format!("Longitude must be finite, got: {}", x)));
    }

    if !y.is_finite() {
        return Err(invalid(format!("Latitude must be finite, got: {}", y)));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(invalid(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(invalid(format!("Latitude out of range [-90.0, 90.0]: {}", y)));
    }

    Ok(())
}

/// Validates every point of a batch, reporting the first offender.
pub fn validate_points(points: &[InputPoint]) -> Result<()> {
    for (idx, point) in points.iter().enumerate() {
        validate_position(idx, &point.position())?;
    }
    Ok(())
}

/// Validates query bounds. Out-of-range values are normalized later, so only
/// non-finite edges are rejected.
///
/// # Examples
///
/// ```
/// use geocluster::compute::validation::validate_bounds;
/// use geocluster_types::LngLatBounds;
///
/// assert!(validate_bounds(&LngLatBounds::new(170.0, -10.0, -170.0, 10.0)).is_ok());
/// assert!(validate_bounds(&LngLatBounds::new(f64::NAN, -10.0, 10.0, 10.0)).is_err());
/// ```
pub fn validate_bounds(bounds: &LngLatBounds) -> Result<()> {
    if !bounds.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "Bounding box edges must be finite, got: {:?}",
            bounds.to_array()
        )));
    }
    Ok(())
}

/// Validates that a tile lies inside its zoom's grid.
pub fn validate_tile(tile: &TileCoord) -> Result<()> {
    if !tile.is_valid() {
        return Err(ClusterError::InvalidTile {
            z: tile.z,
            x: tile.x,
            y: tile.y,
        });
    }
    Ok(())
}

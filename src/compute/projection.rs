//! Web Mercator projection into the unit square.
//!
//! Longitude maps linearly onto `x ∈ [0, 1]` and latitude through the
//! Mercator transform onto `y ∈ [0, 1]`, with `y = 0` at the north edge. The
//! same projection is used at every zoom level; only the merge radius is
//! scaled.

use std::f64::consts::PI;

/// Project a longitude in degrees onto `x`.
#[inline]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Project a latitude in degrees onto `y`.
///
/// Latitudes outside the Mercator domain (about ±85.05°), the poles included,
/// are clamped to the edges instead of producing infinities.
#[inline]
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Inverse of [`lng_x`].
#[inline]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`lat_y`] for `y ∈ [0, 1]`.
#[inline]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Project a geographic point onto the unit square.
#[inline]
pub fn project(point: &geo::Point<f64>) -> (f64, f64) {
    (lng_x(point.x()), lat_y(point.y()))
}

/// Map a projected position back to a geographic point.
#[inline]
pub fn unproject(x: f64, y: f64) -> geo::Point<f64> {
    geo::Point::new(x_lng(x), y_lat(y))
}

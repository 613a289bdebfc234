//! Clustering options.
//!
//! Every field has a default, so an empty JSON object (or TOML document) is a
//! valid configuration. Options are checked once, when an index or a
//! [`Clusterer`](crate::Clusterer) is created; queries never fail because of
//! configuration.
use crate::error::{ClusterError, Result};

/// Configuration for building a cluster index.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterOptions {
    /// Lowest zoom level clusters are generated for.
    #[serde(default)]
    pub min_zoom: u8,

    /// Highest zoom level clusters are generated for. Raw points are indexed
    /// one level above it.
    #[serde(default = "ClusterOptions::default_max_zoom")]
    pub max_zoom: u8,

    /// Minimum aggregate weight for a merge to be shown as a cluster. Smaller
    /// merges stay in the hierarchy but are displayed as their points.
    #[serde(default = "ClusterOptions::default_min_points")]
    pub min_points: u32,

    /// Merge radius in pixels.
    #[serde(default = "ClusterOptions::default_radius")]
    pub radius: f64,

    /// Tile extent in pixels; the radius is relative to it.
    #[serde(default = "ClusterOptions::default_extent")]
    pub extent: f64,

    /// Leaf bucket size of the KD-tree. Affects performance only.
    #[serde(default = "ClusterOptions::default_node_size")]
    pub node_size: usize,

    /// Log build timings at `info` level instead of `trace`.
    #[serde(default)]
    pub log: bool,

    /// Assign sequential ids to input features that have none.
    #[serde(default)]
    pub generate_id: bool,

    /// Extra margin in pixels collected around each tile. Defaults to `radius`.
    #[serde(default)]
    pub tile_buffer: Option<f64>,
}

impl ClusterOptions {
    /// Highest supported `max_zoom`.
    pub const MAX_ZOOM: u8 = 30;

    const fn default_max_zoom() -> u8 {
        16
    }

    const fn default_min_points() -> u32 {
        2
    }

    const fn default_radius() -> f64 {
        40.0
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_node_size() -> usize {
        64
    }

    pub fn with_min_zoom(mut self, zoom: u8) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, zoom: u8) -> Self {
        self.max_zoom = zoom;
        self
    }

    pub fn with_min_points(mut self, min_points: u32) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_node_size(mut self, node_size: usize) -> Self {
        self.node_size = node_size;
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    pub fn with_generate_id(mut self, generate_id: bool) -> Self {
        self.generate_id = generate_id;
        self
    }

    pub fn with_tile_buffer(mut self, pixels: f64) -> Self {
        self.tile_buffer = Some(pixels);
        self
    }

    /// Merge radius at `zoom` in projected units.
    pub fn radius_at(&self, zoom: u8) -> f64 {
        self.radius / (self.extent * 2f64.powi(i32::from(zoom)))
    }

    /// Tile buffer in pixels.
    pub fn tile_buffer_px(&self) -> f64 {
        self.tile_buffer.unwrap_or(self.radius)
    }

    /// Clamp a query zoom to the indexed range `[min_zoom, max_zoom + 1]`.
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom, self.max_zoom + 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidConfiguration(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.max_zoom > Self::MAX_ZOOM {
            return Err(ClusterError::InvalidConfiguration(format!(
                "max_zoom ({}) must be <= {}",
                self.max_zoom,
                Self::MAX_ZOOM
            )));
        }

        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ClusterError::InvalidConfiguration(format!(
                "radius must be a finite non-negative number, got: {}",
                self.radius
            )));
        }

        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(ClusterError::InvalidConfiguration(format!(
                "extent must be a finite positive number, got: {}",
                self.extent
            )));
        }

        if self.node_size == 0 {
            return Err(ClusterError::InvalidConfiguration(
                "node_size must be greater than zero".to_string(),
            ));
        }

        if let Some(buffer) = self.tile_buffer
            && (!buffer.is_finite() || buffer < 0.0)
        {
            return Err(ClusterError::InvalidConfiguration(format!(
                "tile_buffer must be a finite non-negative number, got: {}",
                buffer
            )));
        }

        if self.radius == 0.0 {
            log::warn!("Cluster radius is zero; only coincident points will be merged");
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: ClusterOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let options: ClusterOptions =
            toml::from_str(toml_str).map_err(|e| ClusterError::Toml(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ClusterError::Toml(e.to_string()))
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: Self::default_max_zoom(),
            min_points: Self::default_min_points(),
            radius: Self::default_radius(),
            extent: Self::default_extent(),
            node_size: Self::default_node_size(),
            log: false,
            generate_id: false,
            tile_buffer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClusterOptions::default();
        assert_eq!(options.min_zoom, 0);
        assert_eq!(options.max_zoom, 16);
        assert_eq!(options.min_points, 2);
        assert_eq!(options.radius, 40.0);
        assert_eq!(options.extent, 512.0);
        assert_eq!(options.node_size, 64);
        assert!(!options.log);
        assert!(!options.generate_id);
        assert_eq!(options.tile_buffer_px(), 40.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let options = ClusterOptions::from_json("{}").unwrap();
        assert_eq!(options, ClusterOptions::default());
    }

    #[test]
    fn test_json_round_trip_keeps_overrides() {
        let options = ClusterOptions::default()
            .with_max_zoom(12)
            .with_radius(60.0)
            .with_tile_buffer(8.0);
        let json = options.to_json().unwrap();
        assert_eq!(ClusterOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(ClusterOptions::from_json(r#"{"radius": 10, "bogus": 1}"#).is_err());
    }

    #[test]
    fn test_invalid_configurations() {
        let cases = [
            ClusterOptions::default().with_min_zoom(5).with_max_zoom(4),
            ClusterOptions::default().with_max_zoom(31),
            ClusterOptions::default().with_radius(-1.0),
            ClusterOptions::default().with_radius(f64::NAN),
            ClusterOptions::default().with_extent(0.0),
            ClusterOptions::default().with_node_size(0),
            ClusterOptions::default().with_tile_buffer(-2.0),
        ];

        for options in cases {
            assert!(
                matches!(
                    options.validate(),
                    Err(ClusterError::InvalidConfiguration(_))
                ),
                "{:?} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_from_json_validates() {
        let err = ClusterOptions::from_json(r#"{"min_zoom": 10, "max_zoom": 2}"#).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_radius_scales_with_zoom() {
        let options = ClusterOptions::default();
        assert_eq!(options.radius_at(0), 40.0 / 512.0);
        assert_eq!(options.radius_at(1), 40.0 / 1024.0);
        assert!(options.radius_at(16) < options.radius_at(15));
    }

    #[test]
    fn test_clamp_zoom() {
        let options = ClusterOptions::default().with_min_zoom(2).with_max_zoom(10);
        assert_eq!(options.clamp_zoom(0), 2);
        assert_eq!(options.clamp_zoom(5), 5);
        assert_eq!(options.clamp_zoom(11), 11);
        assert_eq!(options.clamp_zoom(200), 11);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_round_trip() {
        let options = ClusterOptions::default().with_min_points(3);
        let text = options.to_toml().unwrap();
        assert_eq!(ClusterOptions::from_toml(&text).unwrap(), options);
    }
}

//! Fluent construction of a [`Clusterer`].
//!
//! Collects options and an optional property reducer, then validates the
//! options once in [`ClustererBuilder::build`].

use crate::config::ClusterOptions;
use crate::engine::Clusterer;
use crate::error::Result;
use crate::reduce::PropertyReducer;
use std::sync::Arc;

/// Builder for a clusterer with custom options and property aggregation.
#[derive(Debug)]
pub struct ClustererBuilder {
    options: ClusterOptions,
    reducer: Option<Arc<dyn PropertyReducer>>,
}

impl ClustererBuilder {
    /// Create a new builder with default options and no reducer.
    pub fn new() -> Self {
        Self {
            options: ClusterOptions::default(),
            reducer: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, options: ClusterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn min_zoom(mut self, zoom: u8) -> Self {
        self.options.min_zoom = zoom;
        self
    }

    pub fn max_zoom(mut self, zoom: u8) -> Self {
        self.options.max_zoom = zoom;
        self
    }

    pub fn min_points(mut self, min_points: u32) -> Self {
        self.options.min_points = min_points;
        self
    }

    /// Merge radius in pixels.
    pub fn radius(mut self, radius: f64) -> Self {
        self.options.radius = radius;
        self
    }

    pub fn extent(mut self, extent: f64) -> Self {
        self.options.extent = extent;
        self
    }

    pub fn node_size(mut self, node_size: usize) -> Self {
        self.options.node_size = node_size;
        self
    }

    /// Log build timings at `info` level.
    pub fn log(mut self, log: bool) -> Self {
        self.options.log = log;
        self
    }

    pub fn generate_id(mut self, generate_id: bool) -> Self {
        self.options.generate_id = generate_id;
        self
    }

    /// Tile buffer in pixels; defaults to the radius.
    pub fn tile_buffer(mut self, pixels: f64) -> Self {
        self.options.tile_buffer = Some(pixels);
        self
    }

    /// Aggregate point properties into cluster properties.
    pub fn reducer(mut self, reducer: impl PropertyReducer + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    /// Validate the options and create the clusterer.
    pub fn build(self) -> Result<Clusterer> {
        Ok(Clusterer::new(self.options)?.with_shared_reducer(self.reducer))
    }
}

impl Default for ClustererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClusterError;
    use crate::point::InputPoint;
    use crate::reduce::SumProperties;
    use geocluster_types::LngLatBounds;
    use geojson::JsonObject;
    use serde_json::json;

    #[test]
    fn test_builder_default() {
        let builder = ClustererBuilder::new();
        assert_eq!(builder.options, ClusterOptions::default());
        assert!(builder.reducer.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let clusterer = ClustererBuilder::new()
            .min_zoom(2)
            .max_zoom(12)
            .min_points(3)
            .radius(60.0)
            .extent(256.0)
            .node_size(16)
            .log(true)
            .generate_id(true)
            .tile_buffer(4.0)
            .build()
            .unwrap();

        let options = clusterer.options();
        assert_eq!(options.min_zoom, 2);
        assert_eq!(options.max_zoom, 12);
        assert_eq!(options.min_points, 3);
        assert_eq!(options.radius, 60.0);
        assert_eq!(options.extent, 256.0);
        assert_eq!(options.node_size, 16);
        assert!(options.log);
        assert!(options.generate_id);
        assert_eq!(options.tile_buffer, Some(4.0));
    }

    #[test]
    fn test_builder_validates() {
        assert!(matches!(
            ClustererBuilder::new().node_size(0).build(),
            Err(ClusterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ClustererBuilder::new().max_zoom(31).build(),
            Err(ClusterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_builder_with_reducer() {
        let clusterer = ClustererBuilder::new()
            .max_zoom(8)
            .reducer(SumProperties::new(["n"]))
            .build()
            .unwrap();

        let points = (0..3)
            .map(|i| {
                let mut properties = JsonObject::new();
                properties.insert("n".to_string(), json!(i + 1));
                InputPoint::new(geo::Point::new(5.0 + i as f64 * 0.0001, 5.0), properties)
            })
            .collect();
        clusterer.load_points(points).unwrap();

        let features = clusterer.get_clusters(LngLatBounds::world(), 0).unwrap();
        assert_eq!(features[0].property("n"), Some(&json!(6.0)));
    }
}

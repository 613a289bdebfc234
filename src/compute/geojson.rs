//! GeoJSON conversion for input points and query output.
//!
//! Input features must carry a `Point` geometry. Any other geometry, or a
//! missing one, rejects the whole batch with
//! [`ClusterError::UnsupportedGeometry`] naming the offending feature.

use crate::error::{ClusterError, Result};
use crate::index::feature::{ClusterFeature, ClusterSummary, TileFeature};
use crate::point::InputPoint;
use geojson::feature::Id;
use geojson::{Feature, GeoJson, Geometry, JsonObject, JsonValue, Value};

/// Converts the feature at `index` of a batch into an input point.
pub fn point_from_feature(index: usize, feature: Feature) -> Result<InputPoint> {
    let Feature {
        geometry,
        id,
        properties,
        ..
    } = feature;

    let coords = match geometry.map(|g| g.value) {
        Some(Value::Point(coords)) => coords,
        Some(other) => {
            return Err(ClusterError::UnsupportedGeometry {
                index,
                geometry: geometry_name(&other).to_string(),
            });
        }
        None => {
            return Err(ClusterError::UnsupportedGeometry {
                index,
                geometry: "null".to_string(),
            });
        }
    };

    if coords.len() < 2 {
        return Err(ClusterError::InvalidCoordinates {
            index,
            reason: "Point must have at least 2 coordinates".to_string(),
        });
    }

    let mut point = InputPoint::new(
        geo::Point::new(coords[0], coords[1]),
        properties.unwrap_or_default(),
    );
    if let Some(id) = id {
        point = point.with_id(id);
    }
    Ok(point)
}

/// Converts a batch of features, failing on the first non-point feature.
pub fn points_from_features<I>(features: I) -> Result<Vec<InputPoint>>
where
    I: IntoIterator<Item = Feature>,
{
    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| point_from_feature(index, feature))
        .collect()
}

/// Parses GeoJSON text (a `FeatureCollection` or a single `Feature`) into
/// input points.
///
/// # Examples
///
/// ```
/// use geocluster::compute::geojson::points_from_geojson;
///
/// let text = r#"{
///     "type": "FeatureCollection",
///     "features": [{
///         "type": "Feature",
///         "properties": {"name": "Beijing"},
///         "geometry": {"type": "Point", "coordinates": [116.40, 39.92]}
///     }]
/// }"#;
/// let points = points_from_geojson(text)?;
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].properties()["name"], "Beijing");
/// # Ok::<(), geocluster::ClusterError>(())
/// ```
pub fn points_from_geojson(text: &str) -> Result<Vec<InputPoint>> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e| ClusterError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => points_from_features(collection.features),
        GeoJson::Feature(feature) => Ok(vec![point_from_feature(0, feature)?]),
        GeoJson::Geometry(_) => Err(ClusterError::InvalidInput(
            "Expected a Feature or FeatureCollection, got a bare Geometry".to_string(),
        )),
    }
}

/// Properties attached to cluster output.
///
/// Reduced properties come first; the reserved cluster keys overwrite any
/// reduced value with the same name.
pub fn cluster_properties(summary: &ClusterSummary) -> JsonObject {
    let mut properties = summary.properties.clone().unwrap_or_default();
    properties.insert("cluster".to_string(), JsonValue::Bool(true));
    properties.insert(
        "cluster_id".to_string(),
        JsonValue::String(summary.id.to_string()),
    );
    properties.insert(
        "point_count".to_string(),
        JsonValue::from(summary.point_count),
    );
    properties.insert(
        "point_count_abbreviated".to_string(),
        JsonValue::String(summary.point_count_abbreviated()),
    );
    properties.insert(
        "expansion_zoom".to_string(),
        JsonValue::from(summary.expansion_zoom),
    );
    properties
}

/// Converts a query result into a GeoJSON feature in geographic coordinates.
pub fn cluster_feature_to_geojson(feature: &ClusterFeature<'_>) -> Feature {
    match feature {
        ClusterFeature::Leaf(point) => Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![point.lng(), point.lat()]))),
            id: point.id().cloned(),
            properties: Some(point.properties().clone()),
            foreign_members: None,
        },
        ClusterFeature::Cluster(summary) => Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                summary.position.x(),
                summary.position.y(),
            ]))),
            id: Some(Id::String(summary.id.to_string())),
            properties: Some(cluster_properties(summary)),
            foreign_members: None,
        },
    }
}

/// Converts a tile result into a GeoJSON feature in tile pixel coordinates.
pub fn tile_feature_to_geojson(feature: &TileFeature<'_>) -> Feature {
    let mut out = cluster_feature_to_geojson(&feature.feature);
    out.geometry = Some(Geometry::new(Value::Point(vec![
        feature.x as f64,
        feature.y as f64,
    ])));
    out
}

fn geometry_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

//! Aggregation of point properties into cluster properties.
//!
//! When a reducer is supplied to the build, every cluster starts from the
//! mapped properties of its first member and folds the remaining members in
//! with [`PropertyReducer::reduce`]. Members that are themselves clusters
//! contribute their already reduced properties, so the result covers every
//! point below the cluster.

use geojson::{JsonObject, JsonValue};
use std::fmt;

/// Map/reduce hooks for cluster properties.
///
/// # Examples
///
/// ```
/// use geocluster::PropertyReducer;
/// use geojson::{JsonObject, JsonValue};
///
/// #[derive(Debug)]
/// struct MaxScore;
///
/// impl PropertyReducer for MaxScore {
///     fn map(&self, properties: &JsonObject) -> JsonObject {
///         let mut out = JsonObject::new();
///         if let Some(score) = properties.get("score") {
///             out.insert("max_score".to_string(), score.clone());
///         }
///         out
///     }
///
///     fn reduce(&self, accumulated: &mut JsonObject, properties: &JsonObject) {
///         let current = accumulated.get("max_score").and_then(JsonValue::as_f64);
///         let other = properties.get("max_score").and_then(JsonValue::as_f64);
///         if let (Some(a), Some(b)) = (current, other) {
///             accumulated.insert("max_score".to_string(), JsonValue::from(a.max(b)));
///         }
///     }
/// }
/// ```
pub trait PropertyReducer: Send + Sync + fmt::Debug {
    /// Extract the properties of a single point that take part in reduction.
    fn map(&self, properties: &JsonObject) -> JsonObject {
        properties.clone()
    }

    /// Fold `properties` into `accumulated`.
    fn reduce(&self, accumulated: &mut JsonObject, properties: &JsonObject);
}

/// Sums numeric properties by key. Missing or non-numeric values count as 0.
#[derive(Debug, Clone, Default)]
pub struct SumProperties {
    keys: Vec<String>,
}

impl SumProperties {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl PropertyReducer for SumProperties {
    fn map(&self, properties: &JsonObject) -> JsonObject {
        self.keys
            .iter()
            .map(|key| {
                let value = properties
                    .get(key)
                    .and_then(JsonValue::as_f64)
                    .unwrap_or(0.0);
                (key.clone(), JsonValue::from(value))
            })
            .collect()
    }

    fn reduce(&self, accumulated: &mut JsonObject, properties: &JsonObject) {
        for key in &self.keys {
            let a = accumulated
                .get(key)
                .and_then(JsonValue::as_f64)
                .unwrap_or(0.0);
            let b = properties
                .get(key)
                .and_then(JsonValue::as_f64)
                .unwrap_or(0.0);
            accumulated.insert(key.clone(), JsonValue::from(a + b));
        }
    }
}

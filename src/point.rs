//! Input points.

use geojson::JsonObject;
use geojson::feature::Id;

/// A point loaded into the index, with its caller-supplied payload.
///
/// `properties` is passed through verbatim to leaf output. The `index` is the
/// position of the point in the loaded batch and is assigned by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPoint {
    index: usize,
    id: Option<Id>,
    position: geo::Point<f64>,
    properties: JsonObject,
}

impl InputPoint {
    /// Create a point at `position` (longitude, latitude in degrees).
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster::InputPoint;
    ///
    /// let beijing = InputPoint::new(geo::Point::new(116.40, 39.92), Default::default());
    /// assert_eq!(beijing.lng(), 116.40);
    /// ```
    pub fn new(position: geo::Point<f64>, properties: JsonObject) -> Self {
        Self {
            index: 0,
            id: None,
            position,
            properties,
        }
    }

    /// Create a point from longitude and latitude with no properties.
    pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
        Self::new(geo::Point::new(lng, lat), JsonObject::new())
    }

    /// Attach a caller-supplied feature id.
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Position of the point in the loaded batch.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    pub fn position(&self) -> geo::Point<f64> {
        self.position
    }

    pub fn lng(&self) -> f64 {
        self.position.x()
    }

    pub fn lat(&self) -> f64 {
        self.position.y()
    }

    pub fn properties(&self) -> &JsonObject {
        &self.properties
    }

    pub(crate) fn assign_index(&mut self, index: usize, generate_id: bool) {
        self.index = index;
        if generate_id && self.id.is_none() {
            self.id = Some(Id::Number(serde_json::Number::from(index as u64)));
        }
    }
}

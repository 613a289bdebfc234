use geo::Rect;
use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Unlike `geo::Rect`, the corners are kept as given: a box whose `west` edge
/// lies east of its `east` edge crosses the antimeridian and covers
/// `[west, 180] ∪ [-180, east]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    /// Western longitude
    pub west: f64,
    /// Southern latitude
    pub south: f64,
    /// Eastern longitude
    pub east: f64,
    /// Northern latitude
    pub north: f64,
}

impl LngLatBounds {
    /// Create a box from its west, south, east and north edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::LngLatBounds;
    ///
    /// let bounds = LngLatBounds::new(-74.1, 40.6, -73.8, 40.9);
    /// assert!(!bounds.crosses_antimeridian());
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole world.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Whether all four edges are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite()
    }

    /// Wrap longitudes into `[-180, 180]` and clamp latitudes into `[-90, 90]`.
    ///
    /// A box spanning 360 degrees or more of longitude becomes the full
    /// longitude range. An eastern edge of exactly 180 is kept as 180 when the
    /// western edge lies west of it, so the world box stays intact while a
    /// zero-width box on the antimeridian stays zero-width.
    pub fn normalized(&self) -> Self {
        let south = self.south.clamp(-90.0, 90.0);
        let north = self.north.clamp(-90.0, 90.0);

        if self.east - self.west >= 360.0 {
            return Self::new(-180.0, south, 180.0, north);
        }

        let west = wrap_longitude(self.west);
        let east = if self.east == 180.0 && self.west < 180.0 {
            180.0
        } else {
            wrap_longitude(self.east)
        };

        Self::new(west, south, east, north)
    }

    /// Whether the normalized box crosses the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        let normalized = self.normalized();
        normalized.west > normalized.east
    }

    /// Split the normalized box into one or two non-crossing rectangles.
    ///
    /// A box whose southern edge lies north of its northern edge is empty and
    /// has no parts. Longitudes -180 and 180 are the same meridian, so a part
    /// touching one of them gets a zero-width companion on the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use geocluster_types::LngLatBounds;
    ///
    /// let parts = LngLatBounds::new(170.0, -10.0, -170.0, 10.0).parts();
    /// assert_eq!(parts.len(), 2);
    /// assert_eq!(parts[0].min().x, 170.0);
    /// assert_eq!(parts[1].max().x, -170.0);
    /// ```
    pub fn parts(&self) -> Vec<Rect> {
        let b = self.normalized();
        if b.south > b.north {
            Vec::new()
        } else if b.west > b.east {
            vec![
                rect(b.west, b.south, 180.0, b.north),
                rect(-180.0, b.south, b.east, b.north),
            ]
        } else if b.west == -180.0 && b.east < 180.0 {
            vec![
                rect(b.west, b.south, b.east, b.north),
                rect(180.0, b.south, 180.0, b.north),
            ]
        } else if b.east == 180.0 && b.west > -180.0 {
            vec![
                rect(b.west, b.south, b.east, b.north),
                rect(-180.0, b.south, -180.0, b.north),
            ]
        } else {
            vec![rect(b.west, b.south, b.east, b.north)]
        }
    }

    /// Check whether a longitude/latitude pair lies inside the box.
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.parts().iter().any(|r| {
            lng >= r.min().x && lng <= r.max().x && lat >= r.min().y && lat <= r.max().y
        })
    }

    /// Return the box as a `[west, south, east, north]` array.
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

impl Default for LngLatBounds {
    fn default() -> Self {
        Self::world()
    }
}

impl From<[f64; 4]> for LngLatBounds {
    fn from(b: [f64; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<Rect> for LngLatBounds {
    fn from(r: Rect) -> Self {
        Self::new(r.min().x, r.min().y, r.max().x, r.max().y)
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    (((lng + 180.0) % 360.0) + 360.0) % 360.0 - 180.0
}

fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect {
    Rect::new(
        geo::coord! { x: min_x, y: min_y },
        geo::coord! { x: max_x, y: max_y },
    )
}

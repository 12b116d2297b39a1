use crate::bbox::BoundingBox;
use crate::coordinate::{distance_m, is_valid_coordinate, Coordinate};
use crate::polygon::{Polygon, PolygonError};

const CAMPUS_MIN_LAT: f64 = 27.184198996847442;
const CAMPUS_MAX_LAT: f64 = 27.1864330440241;
const CAMPUS_MIN_LNG: f64 = 78.01822303234167;
const CAMPUS_MAX_LNG: f64 = 78.02335645519469;

#[derive(Debug, Clone)]
pub struct Territory {
    name: String,
    boundary: Polygon,
    centroid: Coordinate,
    area_m2: f64,
}

impl Territory {
    pub fn new(name: impl Into<String>, boundary: Polygon) -> Self {
        let centroid = boundary.centroid();
        let area_m2 = boundary.area_m2();
        Self {
            name: name.into(),
            boundary,
            centroid,
            area_m2,
        }
    }

    pub fn rectangle(name: impl Into<String>, bounds: BoundingBox) -> Result<Self, PolygonError> {
        let boundary = Polygon::from_path(&rectangle_corners(bounds))?;
        Ok(Self::new(name, boundary))
    }

    pub fn college_campus() -> Self {
        let bounds = BoundingBox {
            min_lat: CAMPUS_MIN_LAT,
            max_lat: CAMPUS_MAX_LAT,
            min_lng: CAMPUS_MIN_LNG,
            max_lng: CAMPUS_MAX_LNG,
        };
        Self::new(
            "College Campus",
            Polygon::from_open_trusted(&rectangle_corners(bounds)),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    pub fn centroid(&self) -> Coordinate {
        self.centroid
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn bounds(&self) -> BoundingBox {
        self.boundary.bounds()
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.boundary.contains(Coordinate::new(lat, lng))
    }

    /// Degrees counterclockwise from east, in `[0, 360)`. NaN for invalid coordinates.
    pub fn bearing_from_center(&self, lat: f64, lng: f64) -> f64 {
        if !is_valid_coordinate(lat, lng) {
            return f64::NAN;
        }
        let dx = lng - self.centroid.longitude;
        let dy = lat - self.centroid.latitude;
        normalize_degrees(dy.atan2(dx).to_degrees())
    }

    pub fn distance_from_center(&self, lat: f64, lng: f64) -> f64 {
        distance_m(self.centroid.latitude, self.centroid.longitude, lat, lng)
    }
}

fn rectangle_corners(bounds: BoundingBox) -> [Coordinate; 4] {
    [
        Coordinate::new(bounds.max_lat, bounds.min_lng),
        Coordinate::new(bounds.min_lat, bounds.min_lng),
        Coordinate::new(bounds.min_lat, bounds.max_lng),
        Coordinate::new(bounds.max_lat, bounds.max_lng),
    ]
}

fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

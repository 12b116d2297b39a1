use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lng: first.longitude,
            max_lng: first.longitude,
        };
        for point in &points[1..] {
            bounds.min_lat = bounds.min_lat.min(point.latitude);
            bounds.max_lat = bounds.max_lat.max(point.latitude);
            bounds.min_lng = bounds.min_lng.min(point.longitude);
            bounds.max_lng = bounds.max_lng.max(point.longitude);
        }
        Some(bounds)
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.latitude <= self.max_lat
            && coord.latitude >= self.min_lat
            && coord.longitude <= self.max_lng
            && coord.longitude >= self.min_lng
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn lerp(&self, u: f64, v: f64) -> Coordinate {
        Coordinate::new(
            self.min_lat + u * self.lat_span(),
            self.min_lng + v * self.lng_span(),
        )
    }
}

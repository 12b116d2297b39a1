//! Planar operations treat longitude as x and latitude as y.

mod bbox;
mod coordinate;
mod geojson;
mod polygon;
mod territory;

pub use bbox::BoundingBox;
pub use coordinate::{distance_m, is_valid_coordinate, Coordinate, LocationFix, EARTH_RADIUS_M};
pub use geojson::{FeatureProperties, GeoJsonFeature, GeoJsonPolygon};
pub use polygon::{ring_area_m2, Polygon, PolygonError};
pub use territory::Territory;

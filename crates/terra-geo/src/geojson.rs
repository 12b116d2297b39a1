use crate::coordinate::Coordinate;
use crate::polygon::{Polygon, PolygonError};
use crate::territory::Territory;
use serde::{Deserialize, Serialize};

const POLYGON_TYPE: &str = "Polygon";
const FEATURE_TYPE: &str = "Feature";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonPolygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl GeoJsonPolygon {
    pub fn from_polygon(polygon: &Polygon) -> Self {
        Self {
            kind: POLYGON_TYPE.to_string(),
            coordinates: vec![polygon.ring().iter().map(Coordinate::to_lng_lat).collect()],
        }
    }

    pub fn to_polygon(&self) -> Result<Polygon, PolygonError> {
        if self.kind != POLYGON_TYPE {
            return Err(PolygonError::UnsupportedGeometry(self.kind.clone()));
        }
        let outer = self.coordinates.first().ok_or(PolygonError::MissingRing)?;
        let points: Vec<Coordinate> = outer.iter().copied().map(Coordinate::from_lng_lat).collect();
        Polygon::from_path(&points)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: FeatureProperties,
    pub geometry: GeoJsonPolygon,
}

impl GeoJsonFeature {
    pub fn to_territory(&self) -> Result<Territory, PolygonError> {
        if self.kind != FEATURE_TYPE {
            return Err(PolygonError::UnsupportedGeometry(self.kind.clone()));
        }
        let boundary = self.geometry.to_polygon()?;
        let name = self
            .properties
            .name
            .clone()
            .unwrap_or_else(|| "Territory".to_string());
        Ok(Territory::new(name, boundary))
    }
}

use terra_capture::CapturePathPoint;
use terra_core::{
    EpochMillis, ErrorCode, PlayerId, RegionId, RegionRecord, Team, TerraError, TerraResult,
};
use terra_geo::{Coordinate, GeoJsonPolygon, Polygon};
use tracing::info;

pub const DEFAULT_LOCK_DURATION_MS: u64 = 30 * 60 * 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub owner_team: Team,
    pub captured_by: PlayerId,
    pub polygon: Polygon,
    pub area_m2: f64,
    pub capture_time_ms: EpochMillis,
    pub locked_until_ms: EpochMillis,
}

impl Region {
    pub fn is_locked(&self, now_ms: EpochMillis) -> bool {
        self.locked_until_ms > now_ms
    }

    pub fn lock_remaining_ms(&self, now_ms: EpochMillis) -> u64 {
        self.locked_until_ms.saturating_sub(now_ms)
    }

    pub fn to_record(&self) -> TerraResult<RegionRecord> {
        let polygon_data = serde_json::to_string(&GeoJsonPolygon::from_polygon(&self.polygon))
            .map_err(|err| TerraError::new(ErrorCode::Internal, err.to_string()))?;
        Ok(RegionRecord {
            id: self.id,
            owner_team: self.owner_team,
            captured_by: Some(self.captured_by),
            polygon_data: Some(polygon_data),
            area_m2: self.area_m2,
            capture_time_ms: self.capture_time_ms,
            locked_until_ms: Some(self.locked_until_ms),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionMaterializer {
    lock_duration_ms: u64,
}

impl Default for RegionMaterializer {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_DURATION_MS)
    }
}

impl RegionMaterializer {
    pub fn new(lock_duration_ms: u64) -> Self {
        Self { lock_duration_ms }
    }

    pub fn lock_duration_ms(&self) -> u64 {
        self.lock_duration_ms
    }

    pub fn materialize(
        &self,
        path: &[CapturePathPoint],
        owner_team: Team,
        captured_by: PlayerId,
        capture_time_ms: EpochMillis,
    ) -> TerraResult<Region> {
        if path.is_empty() {
            return Err(TerraError::degenerate("capture path is empty"));
        }
        let points: Vec<Coordinate> = path.iter().map(CapturePathPoint::coordinate).collect();
        let polygon =
            Polygon::from_path(&points).map_err(|err| TerraError::degenerate(err.to_string()))?;
        let area_m2 = polygon.area_m2();
        if !area_m2.is_finite() || area_m2 <= 0.0 {
            return Err(TerraError::degenerate(format!(
                "capture path encloses no area ({area_m2} m^2)"
            )));
        }

        let region = Region {
            id: RegionId::new(),
            owner_team,
            captured_by,
            polygon,
            area_m2,
            capture_time_ms,
            locked_until_ms: capture_time_ms.saturating_add(self.lock_duration_ms),
        };
        info!(
            region_id = %region.id,
            team = %owner_team,
            player = %captured_by,
            area_m2,
            "region materialized"
        );
        Ok(region)
    }
}

use crate::ids::{PlayerId, RegionId};
use crate::team::Team;
use crate::time::EpochMillis;
use serde::{Deserialize, Serialize};

/// `polygon_data` is a GeoJSON `Polygon` of `[lng, lat]` pairs and is not
/// validated on the way back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: RegionId,
    pub owner_team: Team,
    #[serde(default)]
    pub captured_by: Option<PlayerId>,
    #[serde(default)]
    pub polygon_data: Option<String>,
    #[serde(default)]
    pub area_m2: f64,
    pub capture_time_ms: EpochMillis,
    #[serde(default)]
    pub locked_until_ms: Option<EpochMillis>,
}

impl RegionRecord {
    pub fn is_locked(&self, now_ms: EpochMillis) -> bool {
        self.locked_until_ms
            .map(|until| until > now_ms)
            .unwrap_or(false)
    }

    pub fn lock_remaining_ms(&self, now_ms: EpochMillis) -> u64 {
        self.locked_until_ms
            .map(|until| until.saturating_sub(now_ms))
            .unwrap_or(0)
    }
}

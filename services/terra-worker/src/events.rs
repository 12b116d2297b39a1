use serde::Serialize;
use std::collections::BTreeMap;
use terra_capture::CaptureMode;
use terra_collectibles::CollectibleItem;
use terra_core::{EpochMillis, PlayerId, RegionId, Team};
use terra_geo::GeoJsonPolygon;
use terra_regions::Region;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkerEvent {
    Capture {
        mode: CaptureMode,
        region_id: RegionId,
        team: Team,
        player_id: PlayerId,
        area_m2: f64,
        capture_time_ms: EpochMillis,
        locked_until_ms: EpochMillis,
        polygon: GeoJsonPolygon,
    },
    Collected {
        player_id: PlayerId,
        team: Team,
        item: CollectibleItem,
    },
    Spawned {
        item: CollectibleItem,
    },
    Hud(HudSnapshot),
}

impl WorkerEvent {
    pub fn capture(mode: CaptureMode, region: &Region) -> Self {
        Self::Capture {
            mode,
            region_id: region.id,
            team: region.owner_team,
            player_id: region.captured_by,
            area_m2: region.area_m2,
            capture_time_ms: region.capture_time_ms,
            locked_until_ms: region.locked_until_ms,
            polygon: GeoJsonPolygon::from_polygon(&region.polygon),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub tracking: bool,
    pub capture_progress: f64,
    pub angle_span_deg: f64,
    pub elapsed_ms: u64,
    pub percent_by_team: BTreeMap<Team, f64>,
    pub regions_by_team: BTreeMap<Team, usize>,
    pub own_team_regions: usize,
    pub total_regions: usize,
    pub hold_points: u64,
    pub active_gift_boxes: usize,
    pub active_christmas_trees: usize,
}

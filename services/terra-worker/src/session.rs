use crate::events::HudSnapshot;
use rand::rngs::SmallRng;
use std::sync::Arc;
use terra_capture::{CaptureMode, CaptureTracker, HoldTracker, HoldUpdate};
use terra_collectibles::{CollectibleItem, CollectibleKind, Spawner};
use terra_config::GameConfig;
use terra_core::{Clock, PlayerId, RegionRecord, Team, TerraError};
use terra_geo::{LocationFix, Polygon, Territory};
use terra_regions::{area_control, count_regions, record_polygon, Region, RegionMaterializer};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PendingCapture {
    pub mode: CaptureMode,
    pub region: Region,
}

#[derive(Debug, Default)]
pub struct FixOutcome {
    pub accepted: bool,
    pub in_territory: bool,
    pub capture: Option<PendingCapture>,
    pub capture_error: Option<TerraError>,
    pub collected: Vec<CollectibleItem>,
    pub hold: HoldUpdate,
}

pub struct GameSession {
    player_id: PlayerId,
    team: Team,
    territory: Territory,
    clock: Arc<dyn Clock>,
    tracker: CaptureTracker,
    hold: HoldTracker,
    materializer: RegionMaterializer,
    gift_boxes: Spawner,
    christmas_trees: Spawner,
    rng: SmallRng,
    regions: Vec<RegionRecord>,
    own_polygons: Vec<Polygon>,
}

impl GameSession {
    pub fn new(
        config: &GameConfig,
        territory: Territory,
        clock: Arc<dyn Clock>,
        rng: SmallRng,
    ) -> Self {
        let now_ms = clock.now_ms();
        Self {
            player_id: config.player_id,
            team: config.team,
            territory,
            tracker: CaptureTracker::new(config.capture, clock.clone()),
            hold: HoldTracker::new(config.team, config.hold, now_ms),
            materializer: RegionMaterializer::new(config.region_lock_ms),
            gift_boxes: Spawner::new(CollectibleKind::GiftBox, config.gift_boxes),
            christmas_trees: Spawner::new(CollectibleKind::ChristmasTree, config.christmas_trees),
            clock,
            rng,
            regions: Vec::new(),
            own_polygons: Vec::new(),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn handle_fix(&mut self, fix: &LocationFix) -> FixOutcome {
        let update = self.tracker.update(&self.territory, fix);
        if !update.evaluated {
            return FixOutcome::default();
        }

        let mut outcome = FixOutcome {
            accepted: true,
            in_territory: update.in_territory,
            ..FixOutcome::default()
        };

        if let (Some(mode), Some(path)) = (update.verdict.mode(), update.captured_path.as_deref()) {
            match self
                .materializer
                .materialize(path, self.team, self.player_id, fix.timestamp_ms)
            {
                Ok(region) => outcome.capture = Some(PendingCapture { mode, region }),
                Err(err) => {
                    warn!(mode = mode.as_str(), error = %err, "capture could not be materialized");
                    outcome.capture_error = Some(err);
                }
            }
        }

        for spawner in [&mut self.gift_boxes, &mut self.christmas_trees] {
            if let Some(item) = spawner.check_collection(fix.latitude, fix.longitude) {
                outcome.collected.push(item);
            }
        }

        let position = fix.coordinate();
        if self.own_polygons.iter().any(|polygon| polygon.contains(position)) {
            outcome.hold = self.hold.tick(self.clock.now_ms());
        }
        outcome
    }

    pub fn commit_capture(&mut self) {
        self.tracker.reset();
    }

    pub fn set_regions(&mut self, regions: Vec<RegionRecord>) {
        self.own_polygons = regions
            .iter()
            .filter(|record| record.owner_team == self.team)
            .filter_map(|record| record_polygon(record).ok())
            .collect();
        self.regions = regions;
    }

    pub fn spawn(&mut self, kind: CollectibleKind) -> Option<CollectibleItem> {
        let now_ms = self.clock.now_ms();
        let spawner = match kind {
            CollectibleKind::GiftBox => &mut self.gift_boxes,
            CollectibleKind::ChristmasTree => &mut self.christmas_trees,
        };
        spawner.spawn(&self.territory, &mut self.rng, now_ms)
    }

    pub fn sweep_expired(&mut self) -> Vec<(CollectibleKind, usize)> {
        let now_ms = self.clock.now_ms();
        [&mut self.gift_boxes, &mut self.christmas_trees]
            .into_iter()
            .map(|spawner| (spawner.kind(), spawner.remove_expired(now_ms)))
            .collect()
    }

    #[cfg(test)]
    pub fn spawner(&self, kind: CollectibleKind) -> &Spawner {
        match kind {
            CollectibleKind::GiftBox => &self.gift_boxes,
            CollectibleKind::ChristmasTree => &self.christmas_trees,
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        let control = area_control(&self.regions, &self.territory);
        let counts = count_regions(&self.regions);
        HudSnapshot {
            tracking: self.tracker.is_tracking(),
            capture_progress: self.tracker.capture_progress(),
            angle_span_deg: self.tracker.angle_span(),
            elapsed_ms: self.tracker.elapsed_since_entry(),
            percent_by_team: control.percent_by_team,
            own_team_regions: counts.count(self.team),
            total_regions: counts.total,
            regions_by_team: counts.by_team,
            hold_points: self.hold.points(),
            active_gift_boxes: self.gift_boxes.active().len(),
            active_christmas_trees: self.christmas_trees.active().len(),
        }
    }
}

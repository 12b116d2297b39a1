use crate::item::{CollectibleId, CollectibleItem, CollectibleKind, Rarity};
use crate::placement::sample_position;
use crate::rules::{SpawnRules, TREE_BONUS};
use rand::Rng;
use terra_core::EpochMillis;
use terra_geo::{is_valid_coordinate, Coordinate, Territory};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Spawner {
    kind: CollectibleKind,
    rules: SpawnRules,
    active: Vec<CollectibleItem>,
    next_seq: u64,
}

impl Spawner {
    pub fn new(kind: CollectibleKind, rules: SpawnRules) -> Self {
        Self {
            kind,
            rules,
            active: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn gift_boxes() -> Self {
        Self::new(CollectibleKind::GiftBox, SpawnRules::gift_box())
    }

    pub fn christmas_trees() -> Self {
        Self::new(CollectibleKind::ChristmasTree, SpawnRules::christmas_tree())
    }

    pub fn kind(&self) -> CollectibleKind {
        self.kind
    }

    pub fn rules(&self) -> &SpawnRules {
        &self.rules
    }

    pub fn active(&self) -> &[CollectibleItem] {
        &self.active
    }

    pub fn is_full(&self) -> bool {
        self.active.len() >= self.rules.max_active
    }

    /// Below capacity this always yields an item; placement falls back to the
    /// territory centroid.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        territory: &Territory,
        rng: &mut R,
        now_ms: EpochMillis,
    ) -> Option<CollectibleItem> {
        if self.is_full() {
            debug!(kind = %self.kind, active = self.active.len(), "spawn skipped: at capacity");
            return None;
        }

        let occupied: Vec<Coordinate> = self.active.iter().map(CollectibleItem::position).collect();
        let position = sample_position(
            rng,
            territory,
            &occupied,
            self.rules.min_separation_m,
            self.rules.max_placement_attempts,
        )
        .unwrap_or_else(|| {
            debug!(kind = %self.kind, "placement exhausted, using territory centroid");
            territory.centroid()
        });

        let (rarity, reward) = match self.kind {
            CollectibleKind::GiftBox => {
                let rarity = Rarity::draw(rng);
                (Some(rarity), rarity.draw_reward(rng))
            }
            CollectibleKind::ChristmasTree => (None, TREE_BONUS),
        };

        let item = CollectibleItem {
            id: CollectibleId {
                kind: self.kind,
                seq: self.next_seq,
            },
            kind: self.kind,
            latitude: position.latitude,
            longitude: position.longitude,
            rarity,
            reward,
            spawned_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(self.rules.lifetime_ms),
        };
        self.next_seq += 1;
        self.active.push(item.clone());
        info!(
            id = %item.id,
            latitude = item.latitude,
            longitude = item.longitude,
            reward = item.reward,
            "collectible spawned"
        );
        Some(item)
    }

    pub fn check_collection(&mut self, lat: f64, lng: f64) -> Option<CollectibleItem> {
        if !is_valid_coordinate(lat, lng) {
            return None;
        }
        let here = Coordinate::new(lat, lng);
        let index = self
            .active
            .iter()
            .position(|item| item.position().distance_to(here) <= self.rules.collection_radius_m)?;
        let item = self.active.remove(index);
        info!(id = %item.id, reward = item.reward, "collectible collected");
        Some(item)
    }

    pub fn remove_expired(&mut self, now_ms: EpochMillis) -> usize {
        let before = self.active.len();
        self.active.retain(|item| !item.is_expired(now_ms));
        let removed = before - self.active.len();
        if removed > 0 {
            debug!(kind = %self.kind, removed, "collectibles expired");
        }
        removed
    }

    pub fn reset(&mut self) {
        self.active.clear();
    }
}

use crate::item::CollectibleKind;
use serde::{Deserialize, Serialize};

pub const TREE_BONUS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRules {
    pub max_active: usize,
    pub min_separation_m: f64,
    pub collection_radius_m: f64,
    pub lifetime_ms: u64,
    pub spawn_interval_ms: u64,
    pub max_placement_attempts: usize,
}

impl SpawnRules {
    pub fn gift_box() -> Self {
        Self {
            max_active: 10,
            min_separation_m: 50.0,
            collection_radius_m: 15.0,
            lifetime_ms: 120_000,
            spawn_interval_ms: 30_000,
            max_placement_attempts: 50,
        }
    }

    pub fn christmas_tree() -> Self {
        Self {
            max_active: 8,
            min_separation_m: 60.0,
            collection_radius_m: 20.0,
            lifetime_ms: 180_000,
            spawn_interval_ms: 45_000,
            max_placement_attempts: 50,
        }
    }

    pub fn for_kind(kind: CollectibleKind) -> Self {
        match kind {
            CollectibleKind::GiftBox => Self::gift_box(),
            CollectibleKind::ChristmasTree => Self::christmas_tree(),
        }
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use terra_core::EpochMillis;
use terra_geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    GiftBox,
    ChristmasTree,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 2] = [CollectibleKind::GiftBox, CollectibleKind::ChristmasTree];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GiftBox => "gift_box",
            Self::ChristmasTree => "christmas_tree",
        }
    }

    fn id_prefix(&self) -> &'static str {
        match self {
            Self::GiftBox => "gift",
            Self::ChristmasTree => "tree",
        }
    }
}

impl fmt::Display for CollectibleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Rare, Rarity::Epic];

    pub fn weight(&self) -> f64 {
        match self {
            Self::Common => 60.0,
            Self::Rare => 30.0,
            Self::Epic => 10.0,
        }
    }

    pub fn reward_range(&self) -> RangeInclusive<u32> {
        match self {
            Self::Common => 5..=15,
            Self::Rare => 20..=40,
            Self::Epic => 50..=100,
        }
    }

    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Rarity {
        let total: f64 = Self::ALL.iter().map(Rarity::weight).sum();
        let roll = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for rarity in Self::ALL {
            cumulative += rarity.weight();
            if roll <= cumulative {
                return rarity;
            }
        }
        Rarity::Epic
    }

    pub fn draw_reward<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.reward_range())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct CollectibleId {
    pub kind: CollectibleKind,
    pub seq: u64,
}

impl fmt::Display for CollectibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.id_prefix(), self.seq)
    }
}

impl From<CollectibleId> for String {
    fn from(id: CollectibleId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectibleItem {
    pub id: CollectibleId,
    pub kind: CollectibleKind,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    pub reward: u32,
    pub spawned_at_ms: EpochMillis,
    pub expires_at_ms: EpochMillis,
}

impl CollectibleItem {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn is_expired(&self, now_ms: EpochMillis) -> bool {
        self.expires_at_ms <= now_ms
    }

    pub fn remaining_ms(&self, now_ms: EpochMillis) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}

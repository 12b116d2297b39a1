mod item;
mod placement;
mod rules;
mod spawner;

pub use item::{CollectibleId, CollectibleItem, CollectibleKind, Rarity};
pub use placement::sample_position;
pub use rules::{SpawnRules, TREE_BONUS};
pub use spawner::Spawner;

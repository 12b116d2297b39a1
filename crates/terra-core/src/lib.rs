pub mod domain;
pub mod error;
pub mod ids;
pub mod team;
pub mod time;

pub use domain::RegionRecord;
pub use error::{ErrorCode, TerraError, TerraResult};
pub use ids::{PlayerId, RegionId};
pub use team::Team;
pub use time::{now_epoch_millis, Clock, EpochMillis, ManualClock, SystemClock};

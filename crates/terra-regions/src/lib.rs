mod aggregate;
mod materialize;

pub use aggregate::{
    area_control, control_percentage, count_regions, record_polygon, AreaControl, RegionCounts,
};
pub use materialize::{Region, RegionMaterializer, DEFAULT_LOCK_DURATION_MS};

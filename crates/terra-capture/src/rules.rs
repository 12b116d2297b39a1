use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRules {
    pub angle_threshold_deg: f64,
    pub min_angle_duration_ms: u64,
    pub retention_ms: u64,
    pub loop_close_distance_m: f64,
    pub min_loop_points: usize,
    pub min_loop_duration_ms: u64,
    pub min_loop_area_m2: f64,
}

impl Default for CaptureRules {
    fn default() -> Self {
        Self {
            angle_threshold_deg: 160.0,
            min_angle_duration_ms: 60_000,
            retention_ms: 180_000,
            loop_close_distance_m: 30.0,
            min_loop_points: 6,
            min_loop_duration_ms: 30_000,
            min_loop_area_m2: 100.0,
        }
    }
}

use crate::angle::angle_span;
use crate::rules::CaptureRules;
use crate::tracker::CapturePathPoint;
use serde::{Deserialize, Serialize};
use terra_core::EpochMillis;
use terra_geo::{distance_m, ring_area_m2, Coordinate};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Angle,
    Loop,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angle => "angle",
            Self::Loop => "loop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureVerdict {
    #[default]
    None,
    Angle,
    Loop,
}

impl CaptureVerdict {
    pub fn mode(&self) -> Option<CaptureMode> {
        match self {
            Self::None => None,
            Self::Angle => Some(CaptureMode::Angle),
            Self::Loop => Some(CaptureMode::Loop),
        }
    }

    pub fn is_capture(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// When both conditions hold the angle sweep is reported.
pub fn evaluate(
    rules: &CaptureRules,
    path: &[CapturePathPoint],
    entry_ms: Option<EpochMillis>,
    now_ms: EpochMillis,
) -> CaptureVerdict {
    let Some(entry_ms) = entry_ms else {
        return CaptureVerdict::None;
    };
    let elapsed_ms = now_ms.saturating_sub(entry_ms);

    let span = angle_span(path.iter().map(|point| point.bearing_deg));
    let angle_closed =
        span >= rules.angle_threshold_deg && elapsed_ms >= rules.min_angle_duration_ms;
    let loop_closed = loop_closed(rules, path, elapsed_ms);

    if angle_closed {
        CaptureVerdict::Angle
    } else if loop_closed {
        CaptureVerdict::Loop
    } else {
        CaptureVerdict::None
    }
}

pub(crate) fn loop_closed(
    rules: &CaptureRules,
    path: &[CapturePathPoint],
    elapsed_ms: u64,
) -> bool {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return false;
    };
    if path.len() < rules.min_loop_points {
        return false;
    }
    if elapsed_ms < rules.min_loop_duration_ms {
        debug!(
            elapsed_ms,
            required_ms = rules.min_loop_duration_ms,
            "loop rejected: too short"
        );
        return false;
    }

    let closure_m = distance_m(first.latitude, first.longitude, last.latitude, last.longitude);
    if !(closure_m <= rules.loop_close_distance_m) {
        debug!(
            closure_m,
            threshold_m = rules.loop_close_distance_m,
            "loop rejected: not closed"
        );
        return false;
    }

    let mut ring: Vec<Coordinate> = path.iter().map(CapturePathPoint::coordinate).collect();
    ring.push(first.coordinate());
    let area_m2 = ring_area_m2(&ring);
    if !(area_m2 >= rules.min_loop_area_m2) {
        debug!(
            area_m2,
            threshold_m2 = rules.min_loop_area_m2,
            "loop rejected: area too small"
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use terra_geo::EARTH_RADIUS_M;

    const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;
    const ORIGIN_LAT: f64 = 27.185;
    const ORIGIN_LNG: f64 = 78.02;

    fn point_m(east_m: f64, north_m: f64, timestamp_ms: u64, bearing_deg: f64) -> CapturePathPoint {
        CapturePathPoint {
            latitude: ORIGIN_LAT + north_m / METERS_PER_DEGREE,
            longitude: ORIGIN_LNG
                + east_m / (METERS_PER_DEGREE * ORIGIN_LAT.to_radians().cos()),
            timestamp_ms,
            bearing_deg,
        }
    }

    fn square_loop(side_m: f64, end_gap_m: f64, duration_ms: u64) -> Vec<CapturePathPoint> {
        let corners = [
            (0.0, 0.0),
            (side_m, 0.0),
            (side_m, side_m),
            (0.0, side_m),
            (0.0, end_gap_m),
            (0.0, end_gap_m),
        ];
        let step = duration_ms / (corners.len() as u64 - 1);
        corners
            .iter()
            .enumerate()
            .map(|(i, (e, n))| point_m(*e, *n, i as u64 * step, 0.0))
            .collect()
    }

    #[test]
    fn no_entry_means_no_capture() {
        let path = square_loop(20.0, 2.0, 40_000);
        assert_eq!(
            evaluate(&CaptureRules::default(), &path, None, 40_000),
            CaptureVerdict::None
        );
    }

    #[test]
    fn angle_needs_both_sweep_and_duration() {
        let rules = CaptureRules::default();
        let path: Vec<_> = [0.0, 90.0, 180.0]
            .iter()
            .map(|b| point_m(1_000.0, 0.0, 0, *b))
            .collect();
        assert_eq!(evaluate(&rules, &path, Some(0), 60_000), CaptureVerdict::Angle);
        assert_eq!(evaluate(&rules, &path, Some(0), 59_999), CaptureVerdict::None);

        let narrow: Vec<_> = [0.0, 90.0, 150.0]
            .iter()
            .map(|b| point_m(1_000.0, 0.0, 0, *b))
            .collect();
        assert_eq!(evaluate(&rules, &narrow, Some(0), 600_000), CaptureVerdict::None);
    }

    #[test]
    fn closed_square_is_a_loop() {
        let path = square_loop(20.0, 2.0, 40_000);
        assert_eq!(
            evaluate(&CaptureRules::default(), &path, Some(0), 40_000),
            CaptureVerdict::Loop
        );
    }

    #[test]
    fn loop_gates() {
        let rules = CaptureRules::default();
        let path = square_loop(20.0, 2.0, 40_000);
        // too soon
        assert_eq!(evaluate(&rules, &path, Some(0), 29_999), CaptureVerdict::None);
        // too few points
        assert_eq!(evaluate(&rules, &path[..5], Some(0), 40_000), CaptureVerdict::None);
        // not closed
        let open = square_loop(20.0, 45.0, 40_000);
        assert_eq!(evaluate(&rules, &open, Some(0), 40_000), CaptureVerdict::None);
        // too small: 8 m square is 64 m^2
        let tiny = square_loop(8.0, 1.0, 40_000);
        assert_eq!(evaluate(&rules, &tiny, Some(0), 40_000), CaptureVerdict::None);
    }

    #[test]
    fn angle_wins_when_both_hold() {
        let rules = CaptureRules::default();
        let mut path = square_loop(20.0, 2.0, 70_000);
        for (point, bearing) in path.iter_mut().zip([0.0, 60.0, 120.0, 180.0, 240.0, 300.0]) {
            point.bearing_deg = bearing;
        }
        assert_eq!(evaluate(&rules, &path, Some(0), 70_000), CaptureVerdict::Angle);
    }

    #[test]
    fn verdict_modes() {
        assert_eq!(CaptureVerdict::None.mode(), None);
        assert_eq!(CaptureVerdict::Loop.mode(), Some(CaptureMode::Loop));
        assert!(CaptureVerdict::Angle.is_capture());
        assert_eq!(CaptureMode::Angle.as_str(), "angle");
    }
}

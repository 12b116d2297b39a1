use crate::angle::angle_span;
use crate::evaluate::{evaluate, CaptureVerdict};
use crate::rules::CaptureRules;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use terra_core::{Clock, EpochMillis, SystemClock};
use terra_geo::{Coordinate, LocationFix, Territory};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapturePathPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: EpochMillis,
    pub bearing_deg: f64,
}

impl CapturePathPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Tracking { entry_ms: EpochMillis },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureUpdate {
    pub evaluated: bool,
    pub in_territory: bool,
    pub angle_span_deg: f64,
    pub elapsed_ms: u64,
    pub verdict: CaptureVerdict,
    pub captured_path: Option<Vec<CapturePathPoint>>,
}

impl CaptureUpdate {
    fn ignored() -> Self {
        Self {
            evaluated: false,
            in_territory: false,
            angle_span_deg: 0.0,
            elapsed_ms: 0,
            verdict: CaptureVerdict::None,
            captured_path: None,
        }
    }

    fn outside() -> Self {
        Self {
            evaluated: true,
            ..Self::ignored()
        }
    }

    pub fn captured(&self) -> bool {
        self.verdict.is_capture()
    }
}

/// After a capture the path is kept until [`CaptureTracker::reset`], so the
/// host can retry a failed commit.
pub struct CaptureTracker {
    rules: CaptureRules,
    clock: Arc<dyn Clock>,
    entry_ms: Option<EpochMillis>,
    path: Vec<CapturePathPoint>,
    min_bearing: Option<f64>,
    max_bearing: Option<f64>,
}

impl CaptureTracker {
    pub fn new(rules: CaptureRules, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules,
            clock,
            entry_ms: None,
            path: Vec::new(),
            min_bearing: None,
            max_bearing: None,
        }
    }

    pub fn with_system_clock(rules: CaptureRules) -> Self {
        Self::new(rules, Arc::new(SystemClock))
    }

    pub fn update(&mut self, territory: &Territory, fix: &LocationFix) -> CaptureUpdate {
        if !fix.is_valid() {
            debug!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                "ignoring invalid fix"
            );
            return CaptureUpdate::ignored();
        }

        if !territory.contains(fix.latitude, fix.longitude) {
            if self.is_tracking() {
                debug!(
                    points = self.path.len(),
                    "left territory, capture progress reset"
                );
            }
            self.reset();
            return CaptureUpdate::outside();
        }

        let bearing_deg = territory.bearing_from_center(fix.latitude, fix.longitude);
        let entry_ms = *self.entry_ms.get_or_insert(fix.timestamp_ms);
        self.path.push(CapturePathPoint {
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp_ms: fix.timestamp_ms,
            bearing_deg,
        });

        let cutoff = fix.timestamp_ms.saturating_sub(self.rules.retention_ms);
        self.path.retain(|point| point.timestamp_ms >= cutoff);
        self.refresh_bearing_bounds();

        let angle_span_deg = self.angle_span();
        let elapsed_ms = fix.timestamp_ms.saturating_sub(entry_ms);
        let verdict = evaluate(&self.rules, &self.path, Some(entry_ms), fix.timestamp_ms);
        let captured_path = verdict.mode().map(|mode| {
            info!(
                mode = mode.as_str(),
                points = self.path.len(),
                angle_span_deg,
                elapsed_ms,
                "capture triggered"
            );
            self.path.clone()
        });

        CaptureUpdate {
            evaluated: true,
            in_territory: true,
            angle_span_deg,
            elapsed_ms,
            verdict,
            captured_path,
        }
    }

    pub fn reset(&mut self) {
        self.path.clear();
        self.entry_ms = None;
        self.min_bearing = None;
        self.max_bearing = None;
    }

    pub fn state(&self) -> TrackerState {
        match self.entry_ms {
            Some(entry_ms) => TrackerState::Tracking { entry_ms },
            None => TrackerState::Idle,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.entry_ms.is_some()
    }

    pub fn elapsed_since_entry(&self) -> u64 {
        self.entry_ms
            .map(|entry| self.clock.now_ms().saturating_sub(entry))
            .unwrap_or(0)
    }

    pub fn angle_span(&self) -> f64 {
        angle_span(self.path.iter().map(|point| point.bearing_deg))
    }

    pub fn capture_progress(&self) -> f64 {
        let time_progress =
            (self.elapsed_since_entry() as f64 / self.rules.min_angle_duration_ms as f64).min(1.0);
        let angle_progress = (self.angle_span() / self.rules.angle_threshold_deg).min(1.0);
        time_progress.min(angle_progress)
    }

    pub fn bearing_bounds(&self) -> Option<(f64, f64)> {
        self.min_bearing.zip(self.max_bearing)
    }

    pub fn path(&self) -> &[CapturePathPoint] {
        &self.path
    }

    pub fn path_ring(&self) -> Vec<[f64; 2]> {
        self.path
            .iter()
            .map(|point| point.coordinate().to_lng_lat())
            .collect()
    }

    pub fn rules(&self) -> &CaptureRules {
        &self.rules
    }

    fn refresh_bearing_bounds(&mut self) {
        let mut bearings = self.path.iter().map(|point| point.bearing_deg);
        let Some(first) = bearings.next() else {
            self.min_bearing = None;
            self.max_bearing = None;
            return;
        };
        let (min, max) = bearings.fold((first, first), |(min, max), b| (min.min(b), max.max(b)));
        self.min_bearing = Some(min);
        self.max_bearing = Some(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureMode;
    use std::f64::consts::PI;
    use terra_core::ManualClock;
    use terra_geo::EARTH_RADIUS_M;

    const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * PI / 180.0;

    fn tracker(clock: Arc<ManualClock>) -> CaptureTracker {
        CaptureTracker::new(CaptureRules::default(), clock)
    }

    fn at_bearing(territory: &Territory, bearing_deg: f64, radius_deg: f64, t: u64) -> LocationFix {
        let c = territory.centroid();
        let theta = bearing_deg.to_radians();
        LocationFix::new(
            c.latitude + radius_deg * theta.sin(),
            c.longitude + radius_deg * theta.cos(),
            t,
        )
    }

    fn offset_m(territory: &Territory, east_m: f64, north_m: f64, t: u64) -> LocationFix {
        let c = territory.centroid();
        LocationFix::new(
            c.latitude + north_m / METERS_PER_DEGREE,
            c.longitude + east_m / (METERS_PER_DEGREE * c.latitude.to_radians().cos()),
            t,
        )
    }

    fn outside(t: u64) -> LocationFix {
        LocationFix::new(27.30, 78.02, t)
    }

    #[test]
    fn enters_tracking_on_first_inside_fix() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        assert_eq!(tracker.state(), TrackerState::Idle);

        let update = tracker.update(&territory, &at_bearing(&territory, 30.0, 0.0005, 1_000));
        assert!(update.in_territory);
        assert!(!update.captured());
        assert_eq!(tracker.state(), TrackerState::Tracking { entry_ms: 1_000 });
        assert_eq!(tracker.path().len(), 1);
        let (min, max) = tracker.bearing_bounds().unwrap();
        assert!((min - 30.0).abs() < 1e-6 && (max - 30.0).abs() < 1e-6);
    }

    #[test]
    fn exit_resets_everything() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        tracker.update(&territory, &at_bearing(&territory, 0.0, 0.0005, 0));
        tracker.update(&territory, &at_bearing(&territory, 90.0, 0.0005, 1_000));
        assert_eq!(tracker.path().len(), 2);

        let update = tracker.update(&territory, &outside(2_000));
        assert!(update.evaluated);
        assert!(!update.in_territory);
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.path().is_empty());
        assert!(tracker.bearing_bounds().is_none());
    }

    #[test]
    fn alternating_inside_outside_never_accumulates() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        for i in 0..20u64 {
            let fix = if i % 2 == 0 {
                at_bearing(&territory, i as f64 * 18.0, 0.0008, i * 5_000)
            } else {
                outside(i * 5_000)
            };
            let update = tracker.update(&territory, &fix);
            assert!(!update.captured());
            assert!(tracker.path().len() <= 1);
        }
    }

    #[test]
    fn invalid_fix_leaves_state_alone() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        tracker.update(&territory, &at_bearing(&territory, 0.0, 0.0005, 0));

        let update = tracker.update(&territory, &LocationFix::new(f64::NAN, 78.02, 1_000));
        assert!(!update.evaluated);
        assert!(tracker.is_tracking());
        assert_eq!(tracker.path().len(), 1);

        let update = tracker.update(&territory, &LocationFix::new(95.0, 78.02, 2_000));
        assert!(!update.evaluated);
        assert_eq!(tracker.path().len(), 1);
    }

    #[test]
    fn prunes_points_outside_retention_window() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        tracker.update(&territory, &at_bearing(&territory, 0.0, 0.0005, 0));
        tracker.update(&territory, &at_bearing(&territory, 10.0, 0.0005, 100_000));
        tracker.update(&territory, &at_bearing(&territory, 20.0, 0.0005, 200_000));

        assert_eq!(tracker.path().len(), 2);
        assert_eq!(tracker.path()[0].timestamp_ms, 100_000);
        let (min, _) = tracker.bearing_bounds().unwrap();
        assert!((min - 10.0).abs() < 1e-6);
        // entry time survives pruning
        assert_eq!(tracker.state(), TrackerState::Tracking { entry_ms: 0 });
    }

    #[test]
    fn eight_bearings_over_61_seconds_is_an_angle_capture() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        let bearings = [0.0, 45.0, 90.0, 135.0, 181.0, 225.0, 270.0, 315.0];

        let mut updates = Vec::new();
        for (i, bearing) in bearings.iter().enumerate() {
            let fix = at_bearing(&territory, *bearing, 0.0008, 10_000 + i as u64 * 8_715);
            updates.push(tracker.update(&territory, &fix));
        }

        let (last, earlier) = updates.split_last().unwrap();
        assert!(earlier.iter().all(|update| !update.captured()));
        assert_eq!(last.verdict.mode(), Some(CaptureMode::Angle));
        assert_eq!(last.elapsed_ms, 61_005);
        assert!(last.angle_span_deg >= 160.0);
        assert_eq!(last.captured_path.as_ref().map(Vec::len), Some(8));

        // The sweep never closes on itself, so this is an angle capture only.
        let path = last.captured_path.as_deref().unwrap();
        let (first, end) = (path[0].coordinate(), path[path.len() - 1].coordinate());
        assert!(first.distance_to(end) > tracker.rules().loop_close_distance_m);
        assert!(!crate::evaluate::loop_closed(tracker.rules(), path, last.elapsed_ms));
    }

    #[test]
    fn twenty_meter_square_in_35_seconds_is_a_loop_capture() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        let legs = [
            (0.0, 0.0, 0),
            (10.0, 0.0, 5_000),
            (20.0, 0.0, 10_000),
            (20.0, 10.0, 15_000),
            (20.0, 20.0, 20_000),
            (10.0, 20.0, 25_000),
            (0.0, 20.0, 29_000),
            (0.0, 3.0, 35_000),
        ];

        let mut updates = Vec::new();
        for (east, north, t) in legs {
            updates.push(tracker.update(&territory, &offset_m(&territory, east, north, t)));
        }

        let (last, earlier) = updates.split_last().unwrap();
        assert!(earlier.iter().all(|update| !update.captured()));
        assert_eq!(last.verdict, CaptureVerdict::Loop);
        assert!(last.elapsed_ms < 60_000);
        assert!(last.angle_span_deg < 160.0);
    }

    #[test]
    fn tracker_keeps_path_until_reset_after_capture() {
        let territory = Territory::college_campus();
        let mut tracker = tracker(Arc::new(ManualClock::new(0)));
        for (i, bearing) in [0.0, 90.0, 180.0].iter().enumerate() {
            let fix = at_bearing(&territory, *bearing, 0.0008, i as u64 * 30_000);
            tracker.update(&territory, &fix);
        }
        assert!(tracker.is_tracking());
        assert_eq!(tracker.path_ring().len(), 3);

        tracker.reset();
        assert_eq!(tracker.state(), TrackerState::Idle);
        assert!(tracker.path_ring().is_empty());
    }

    #[test]
    fn progress_is_the_slower_of_time_and_sweep() {
        let territory = Territory::college_campus();
        let clock = Arc::new(ManualClock::new(0));
        let mut tracker = tracker(clock.clone());
        assert_eq!(tracker.capture_progress(), 0.0);
        assert_eq!(tracker.elapsed_since_entry(), 0);

        tracker.update(&territory, &at_bearing(&territory, 0.0, 0.0008, 1_000));
        tracker.update(&territory, &at_bearing(&territory, 80.0, 0.0008, 2_000));

        clock.set(31_000);
        assert_eq!(tracker.elapsed_since_entry(), 30_000);
        assert!((tracker.capture_progress() - 0.5).abs() < 1e-6);

        clock.set(200_000);
        assert!((tracker.capture_progress() - 0.5).abs() < 1e-6);

        tracker.update(&territory, &at_bearing(&territory, 200.0, 0.0008, 3_000));
        assert!((tracker.capture_progress() - 1.0).abs() < 1e-9);
    }
}

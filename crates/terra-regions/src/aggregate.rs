use serde::Serialize;
use std::collections::BTreeMap;
use terra_core::{ErrorCode, RegionRecord, Team, TerraError, TerraResult};
use terra_geo::{GeoJsonPolygon, Polygon, Territory};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaControl {
    pub territory_area_m2: f64,
    pub area_by_team: BTreeMap<Team, f64>,
    pub percent_by_team: BTreeMap<Team, f64>,
    pub skipped: usize,
}

impl AreaControl {
    pub fn area_m2(&self, team: Team) -> f64 {
        self.area_by_team.get(&team).copied().unwrap_or(0.0)
    }

    pub fn percent(&self, team: Team) -> f64 {
        self.percent_by_team.get(&team).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCounts {
    pub by_team: BTreeMap<Team, usize>,
    pub total: usize,
}

impl RegionCounts {
    pub fn count(&self, team: Team) -> usize {
        self.by_team.get(&team).copied().unwrap_or(0)
    }
}

pub fn area_control(regions: &[RegionRecord], territory: &Territory) -> AreaControl {
    let mut area_by_team: BTreeMap<Team, f64> = Team::ALL.iter().map(|team| (*team, 0.0)).collect();
    let mut skipped = 0;

    for record in regions {
        let polygon = match record_polygon(record) {
            Ok(polygon) => polygon,
            Err(err) => {
                warn!(region_id = %record.id, error = %err, "skipping malformed region polygon");
                skipped += 1;
                continue;
            }
        };
        let overlap_m2 = polygon.intersection_area_m2(territory.boundary());
        *area_by_team.entry(record.owner_team).or_insert(0.0) += overlap_m2;
    }

    let territory_area_m2 = territory.area_m2();
    let percent_by_team = area_by_team
        .iter()
        .map(|(team, area)| (*team, control_percentage(*area, territory_area_m2)))
        .collect();

    AreaControl {
        territory_area_m2,
        area_by_team,
        percent_by_team,
        skipped,
    }
}

pub fn count_regions(regions: &[RegionRecord]) -> RegionCounts {
    let mut by_team: BTreeMap<Team, usize> = Team::ALL.iter().map(|team| (*team, 0)).collect();
    for record in regions {
        *by_team.entry(record.owner_team).or_insert(0) += 1;
    }
    RegionCounts {
        by_team,
        total: regions.len(),
    }
}

/// `min(100, round(area / territory * 1000) / 10)`. An empty territory counts as 1 m^2.
pub fn control_percentage(area_m2: f64, territory_area_m2: f64) -> f64 {
    let territory_area_m2 = if territory_area_m2 > 0.0 {
        territory_area_m2
    } else {
        1.0
    };
    ((area_m2 / territory_area_m2 * 1000.0).round() / 10.0).min(100.0)
}

pub fn record_polygon(record: &RegionRecord) -> TerraResult<Polygon> {
    let invalid = |message: String| TerraError::new(ErrorCode::InvalidInput, message);
    let data = record
        .polygon_data
        .as_deref()
        .ok_or_else(|| invalid("missing polygon".to_string()))?;
    let geometry: GeoJsonPolygon =
        serde_json::from_str(data).map_err(|err| invalid(err.to_string()))?;
    geometry.to_polygon().map_err(|err| invalid(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::RegionId;
    use terra_geo::{BoundingBox, Coordinate};

    fn record(team: Team, polygon_data: Option<String>) -> RegionRecord {
        RegionRecord {
            id: RegionId::new(),
            owner_team: team,
            captured_by: None,
            polygon_data,
            area_m2: 0.0,
            capture_time_ms: 0,
            locked_until_ms: None,
        }
    }

    fn strip(territory: &Territory, team: Team, from: f64, to: f64) -> RegionRecord {
        let b = territory.bounds();
        let west = b.min_lng + from * b.lng_span();
        let east = b.min_lng + to * b.lng_span();
        let polygon = Polygon::from_path(&[
            Coordinate::new(b.max_lat, west),
            Coordinate::new(b.min_lat, west),
            Coordinate::new(b.min_lat, east),
            Coordinate::new(b.max_lat, east),
        ])
        .unwrap();
        let json = serde_json::to_string(&GeoJsonPolygon::from_polygon(&polygon)).unwrap();
        record(team, Some(json))
    }

    #[test]
    fn hand_computed_percentage() {
        assert_eq!(control_percentage(5_000.0, 50_000.0), 10.0);
        assert_eq!(control_percentage(1_234.0, 50_000.0), 2.5);
        assert_eq!(control_percentage(0.0, 50_000.0), 0.0);
        assert_eq!(control_percentage(75_000.0, 50_000.0), 100.0);
        assert_eq!(control_percentage(0.5, 0.0), 50.0);
    }

    #[test]
    fn tenth_of_the_territory_is_ten_percent() {
        let territory = Territory::college_campus();
        let regions = vec![strip(&territory, Team::Red, 0.0, 0.1)];
        let control = area_control(&regions, &territory);
        assert_eq!(control.percent(Team::Red), 10.0);
        assert_eq!(control.percent(Team::Blue), 0.0);
        assert_eq!(control.percent(Team::Green), 0.0);
        assert_eq!(control.skipped, 0);
    }

    #[test]
    fn three_regions_sum_per_team() {
        let territory = Territory::college_campus();
        let regions = vec![
            strip(&territory, Team::Red, 0.0, 0.1),
            strip(&territory, Team::Blue, 0.2, 0.45),
            strip(&territory, Team::Red, 0.5, 0.55),
        ];
        let control = area_control(&regions, &territory);
        assert_eq!(control.percent(Team::Red), 15.0);
        assert_eq!(control.percent(Team::Blue), 25.0);
        let total: f64 = control.percent_by_team.values().sum();
        assert!(total <= 100.0);
        let red_expected = control_percentage(control.area_m2(Team::Red), territory.area_m2());
        assert_eq!(control.percent(Team::Red), red_expected);
    }

    #[test]
    fn only_the_part_inside_the_territory_counts() {
        let territory = Territory::college_campus();
        // 0.9..1.1 of the span: half of it hangs off the east edge.
        let regions = vec![strip(&territory, Team::Green, 0.9, 1.1)];
        let control = area_control(&regions, &territory);
        assert_eq!(control.percent(Team::Green), 10.0);
    }

    #[test]
    fn percentage_is_capped() {
        let territory = Territory::college_campus();
        let regions = vec![
            strip(&territory, Team::Blue, 0.0, 1.0),
            strip(&territory, Team::Blue, 0.0, 1.0),
        ];
        let control = area_control(&regions, &territory);
        assert_eq!(control.percent(Team::Blue), 100.0);
    }

    #[test]
    fn malformed_polygons_are_skipped_not_fatal() {
        let territory = Territory::college_campus();
        let regions = vec![
            record(Team::Blue, None),
            record(Team::Blue, Some("{not json".to_string())),
            record(Team::Blue, Some(r#"{"type":"Polygon"}"#.to_string())),
            record(Team::Blue, Some(r#"{"type":"Point","coordinates":[[[1,2]]]}"#.to_string())),
            record(Team::Blue, Some(r#"{"type":"Polygon","coordinates":[[[78.02,27.185],[78.02,27.185]]]}"#.to_string())),
            strip(&territory, Team::Red, 0.0, 0.1),
        ];
        let control = area_control(&regions, &territory);
        assert_eq!(control.skipped, 5);
        assert_eq!(control.percent(Team::Red), 10.0);
        assert_eq!(control.percent(Team::Blue), 0.0);
    }

    #[test]
    fn regions_outside_contribute_nothing() {
        let territory = Territory::college_campus();
        let far = Territory::rectangle(
            "elsewhere",
            BoundingBox {
                min_lat: 10.0,
                max_lat: 10.01,
                min_lng: 10.0,
                max_lng: 10.01,
            },
        )
        .unwrap();
        let json = serde_json::to_string(&GeoJsonPolygon::from_polygon(far.boundary())).unwrap();
        let control = area_control(&[record(Team::Red, Some(json))], &territory);
        assert_eq!(control.area_m2(Team::Red), 0.0);
        assert_eq!(control.skipped, 0);
    }

    fn lat_lng_polygon(points: &[(f64, f64)]) -> Polygon {
        let points: Vec<Coordinate> = points
            .iter()
            .map(|(lat, lng)| Coordinate::new(*lat, *lng))
            .collect();
        Polygon::from_path(&points).unwrap()
    }

    #[test]
    fn concave_region_inside_concave_territory_counts_in_full() {
        let territory = Territory::new(
            "ell",
            lat_lng_polygon(&[
                (0.0, 0.0),
                (0.0, 0.02),
                (0.01, 0.02),
                (0.01, 0.01),
                (0.02, 0.01),
                (0.02, 0.0),
            ]),
        );
        let region = lat_lng_polygon(&[
            (0.002, 0.002),
            (0.002, 0.018),
            (0.008, 0.018),
            (0.008, 0.008),
            (0.018, 0.008),
            (0.018, 0.002),
        ]);
        assert!(region.vertices().iter().all(|vertex| territory.boundary().contains(*vertex)));
        let json = serde_json::to_string(&GeoJsonPolygon::from_polygon(&region)).unwrap();

        let control = area_control(&[record(Team::Green, Some(json))], &territory);
        let expected = region.area_m2();
        let counted = control.area_m2(Team::Green);
        assert!(
            (counted - expected).abs() < 1e-6 * expected,
            "region area {expected} counted {counted}"
        );
        assert_eq!(
            control.percent(Team::Green),
            control_percentage(expected, territory.area_m2())
        );
    }

    #[test]
    fn counts_are_not_area_weighted() {
        let territory = Territory::college_campus();
        let regions = vec![
            strip(&territory, Team::Red, 0.0, 0.8),
            strip(&territory, Team::Blue, 0.8, 0.81),
            strip(&territory, Team::Blue, 0.81, 0.82),
            record(Team::Blue, None),
        ];
        let counts = count_regions(&regions);
        assert_eq!(counts.count(Team::Red), 1);
        assert_eq!(counts.count(Team::Blue), 3);
        assert_eq!(counts.count(Team::Green), 0);
        assert_eq!(counts.total, 4);

        let control = area_control(&regions, &territory);
        assert!(control.area_m2(Team::Red) > control.area_m2(Team::Blue));
    }
}

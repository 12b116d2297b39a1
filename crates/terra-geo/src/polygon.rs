use crate::bbox::BoundingBox;
use crate::coordinate::{Coordinate, EARTH_RADIUS_M};
use std::fmt;

const ON_EDGE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub enum PolygonError {
    InvalidCoordinate { index: usize },
    TooFewVertices { distinct: usize },
    UnsupportedGeometry(String),
    MissingRing,
}

impl fmt::Display for PolygonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate { index } => write!(f, "invalid coordinate at index {index}"),
            Self::TooFewVertices { distinct } => {
                write!(f, "polygon needs 3 distinct vertices, got {distinct}")
            }
            Self::UnsupportedGeometry(kind) => write!(f, "unsupported geometry type {kind:?}"),
            Self::MissingRing => write!(f, "polygon has no outer ring"),
        }
    }
}

impl std::error::Error for PolygonError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Coordinate>,
    bounds: BoundingBox,
}

impl Polygon {
    pub fn from_path(points: &[Coordinate]) -> Result<Self, PolygonError> {
        if let Some(index) = points.iter().position(|point| !point.is_valid()) {
            return Err(PolygonError::InvalidCoordinate { index });
        }
        let open = match (points.first(), points.last()) {
            (Some(first), Some(last)) if points.len() > 1 && first == last => {
                &points[..points.len() - 1]
            }
            _ => points,
        };
        let distinct = count_distinct(open);
        if distinct < 3 {
            return Err(PolygonError::TooFewVertices { distinct });
        }
        Ok(Self::from_open_trusted(open))
    }

    pub(crate) fn from_open_trusted(open: &[Coordinate]) -> Self {
        let mut ring = Vec::with_capacity(open.len() + 1);
        ring.extend_from_slice(open);
        ring.push(open[0]);
        let bounds = BoundingBox::from_points(open).unwrap_or(BoundingBox {
            min_lat: 0.0,
            max_lat: 0.0,
            min_lng: 0.0,
            max_lng: 0.0,
        });
        Self { ring, bounds }
    }

    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.ring[..self.ring.len() - 1]
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn area_m2(&self) -> f64 {
        ring_area_m2(&self.ring)
    }

    // Vertex mean, not the area centroid.
    pub fn centroid(&self) -> Coordinate {
        let vertices = self.vertices();
        let count = vertices.len() as f64;
        let (lat, lng) = vertices.iter().fold((0.0, 0.0), |(lat, lng), vertex| {
            (lat + vertex.latitude, lng + vertex.longitude)
        });
        Coordinate::new(lat / count, lng / count)
    }

    /// Ray casting. Points on an edge count as inside.
    pub fn contains(&self, point: Coordinate) -> bool {
        if !point.is_valid() || !self.bounds.contains(point) {
            return false;
        }
        let mut inside = false;
        for edge in self.ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if on_segment(a, b, point) {
                return true;
            }
            if (a.latitude > point.latitude) != (b.latitude > point.latitude) {
                let crossing = (b.longitude - a.longitude) * (point.latitude - a.latitude)
                    / (b.latitude - a.latitude)
                    + a.longitude;
                if point.longitude < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn is_convex(&self) -> bool {
        let vertices = self.vertices();
        let n = vertices.len();
        let mut sign = 0.0f64;
        for i in 0..n {
            let turn = cross(vertices[i], vertices[(i + 1) % n], vertices[(i + 2) % n]);
            if turn.abs() <= ON_EDGE_EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = turn.signum();
            } else if turn.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Overlap as pieces with disjoint interiors. `other` is split into convex
    /// parts and `self` is clipped against each one.
    pub fn intersection(&self, other: &Polygon) -> Vec<Polygon> {
        if !bounds_overlap(&self.bounds, &other.bounds) {
            return Vec::new();
        }
        let windows = if other.is_convex() {
            vec![other.vertices().to_vec()]
        } else {
            triangulate(other.vertices())
        };
        windows
            .iter()
            .filter_map(|window| Polygon::from_path(&clip_to_convex(self.vertices(), window)).ok())
            .filter(|piece| piece.area_m2() > 0.0)
            .collect()
    }

    pub fn intersection_area_m2(&self, other: &Polygon) -> f64 {
        self.intersection(other).iter().map(Polygon::area_m2).sum()
    }
}

pub fn ring_area_m2(ring: &[Coordinate]) -> f64 {
    let n = ring.len();
    if n <= 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        total += (ring[upper].longitude.to_radians() - ring[lower].longitude.to_radians())
            * ring[middle].latitude.to_radians().sin();
    }
    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

fn count_distinct(points: &[Coordinate]) -> usize {
    let mut seen: Vec<Coordinate> = Vec::with_capacity(points.len());
    for point in points {
        if !seen.contains(point) {
            seen.push(*point);
        }
    }
    seen.len()
}

// z of (b - a) x (c - a), longitude as x.
fn cross(a: Coordinate, b: Coordinate, c: Coordinate) -> f64 {
    (b.longitude - a.longitude) * (c.latitude - a.latitude)
        - (b.latitude - a.latitude) * (c.longitude - a.longitude)
}

fn on_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> bool {
    if cross(a, b, p).abs() > ON_EDGE_EPSILON {
        return false;
    }
    p.longitude >= a.longitude.min(b.longitude)
        && p.longitude <= a.longitude.max(b.longitude)
        && p.latitude >= a.latitude.min(b.latitude)
        && p.latitude <= a.latitude.max(b.latitude)
}

fn bounds_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_lat <= b.max_lat && b.min_lat <= a.max_lat && a.min_lng <= b.max_lng && b.min_lng <= a.max_lng
}

fn signed_planar_area(vertices: &[Coordinate]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            a.longitude * b.latitude - b.longitude * a.latitude
        })
        .sum::<f64>()
        / 2.0
}

fn in_triangle(a: Coordinate, b: Coordinate, c: Coordinate, p: Coordinate) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

// Ear clipping. Once no ear is left (self-intersecting ring) the rest is cut as a fan.
fn triangulate(vertices: &[Coordinate]) -> Vec<Vec<Coordinate>> {
    let mut remaining = vertices.to_vec();
    if signed_planar_area(&remaining) < 0.0 {
        remaining.reverse();
    }
    let mut triangles = Vec::with_capacity(remaining.len().saturating_sub(2));
    while remaining.len() >= 3 {
        let n = remaining.len();
        let corner = |i: usize| (remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]);
        let is_ear = |i: usize| {
            let (prev, current, next) = corner(i);
            cross(prev, current, next) > 0.0
                && remaining.iter().all(|&point| {
                    point == prev
                        || point == current
                        || point == next
                        || !in_triangle(prev, current, next, point)
                })
        };
        let cut = (0..n)
            .find(|&i| {
                let (prev, current, next) = corner(i);
                cross(prev, current, next).abs() <= ON_EDGE_EPSILON
            })
            .or_else(|| (0..n).find(|&i| is_ear(i)))
            .unwrap_or(1);
        let (prev, current, next) = corner(cut);
        if cross(prev, current, next).abs() > ON_EDGE_EPSILON {
            triangles.push(vec![prev, current, next]);
        }
        remaining.remove(cut);
    }
    triangles
}

fn clip_to_convex(subject: &[Coordinate], window: &[Coordinate]) -> Vec<Coordinate> {
    let orientation = signed_planar_area(window).signum();
    let inside = |a: Coordinate, b: Coordinate, p: Coordinate| cross(a, b, p) * orientation >= 0.0;

    let mut output = subject.to_vec();
    for i in 0..window.len() {
        if output.is_empty() {
            break;
        }
        let (a, b) = (window[i], window[(i + 1) % window.len()]);
        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];
        for &current in &input {
            let current_in = inside(a, b, current);
            let previous_in = inside(a, b, previous);
            if current_in {
                if !previous_in {
                    output.push(line_intersection(previous, current, a, b));
                }
                output.push(current);
            } else if previous_in {
                output.push(line_intersection(previous, current, a, b));
            }
            previous = current;
        }
    }
    output
}

// Where segment s -> e crosses the line through a and b.
fn line_intersection(s: Coordinate, e: Coordinate, a: Coordinate, b: Coordinate) -> Coordinate {
    let (x1, y1, x2, y2) = (s.longitude, s.latitude, e.longitude, e.latitude);
    let (x3, y3, x4, y4) = (a.longitude, a.latitude, b.longitude, b.latitude);
    let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denominator.abs() < f64::EPSILON * f64::EPSILON {
        return e;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denominator;
    Coordinate::new(y1 + t * (y2 - y1), x1 + t * (x2 - x1))
}

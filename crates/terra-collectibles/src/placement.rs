use rand::Rng;
use terra_geo::{Coordinate, Territory};

pub fn sample_position<R: Rng + ?Sized>(
    rng: &mut R,
    territory: &Territory,
    occupied: &[Coordinate],
    min_separation_m: f64,
    max_attempts: usize,
) -> Option<Coordinate> {
    let bounds = territory.bounds();
    for _ in 0..max_attempts {
        let candidate = bounds.lerp(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        if !territory.boundary().contains(candidate) {
            continue;
        }
        let clear = occupied
            .iter()
            .all(|other| other.distance_to(candidate) >= min_separation_m);
        if clear {
            return Some(candidate);
        }
    }
    None
}

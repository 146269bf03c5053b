use crate::core::distance::haversine_distance;
use crate::models::{MatchRecord, Point};

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<MatchRecord>,
    pub pairs_evaluated: usize,
}

/// Find every pair of points within `radius_m` meters of each other
///
/// This is an exhaustive cross-join: each point of `set_a` is compared with
/// each point of `set_b`, so cost grows as `|A| * |B|`. There is no spatial
/// index; that quadratic cost is the ceiling on usable dataset sizes.
///
/// Output order is the outer loop over `set_a` then the inner loop over
/// `set_b`, both in input order. Duplicate points each produce their own
/// record. A negative (or NaN) radius matches nothing.
///
/// # Arguments
/// * `set_a` - Points from the first dataset
/// * `set_b` - Points from the second dataset
/// * `radius_m` - Inclusive radius in meters
pub fn find_matches(set_a: &[Point], set_b: &[Point], radius_m: f64) -> MatchResult {
    let mut matches = Vec::new();

    for a in set_a {
        for b in set_b {
            let distance_meters = haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude);

            if distance_meters <= radius_m {
                matches.push(MatchRecord {
                    source_a: a.clone(),
                    source_b: b.clone(),
                    distance_meters,
                });
            }
        }
    }

    MatchResult {
        matches,
        pairs_evaluated: set_a.len() * set_b.len(),
    }
}

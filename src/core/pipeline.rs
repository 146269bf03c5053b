use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::core::loader::{load_points, load_points_from_path};
use crate::core::matcher::find_matches;
use crate::error::{MatchError, Result};
use crate::models::{LoadedPoints, MatchRecord};

/// Everything produced by one batch run
#[derive(Debug, Clone)]
pub struct MatchRun {
    pub data1: LoadedPoints,
    pub data2: LoadedPoints,
    pub matches: Vec<MatchRecord>,
}

/// Parse a radius given as text
///
/// Negative values are accepted; they simply match nothing.
pub fn parse_radius(input: &str) -> Result<f64> {
    input
        .parse::<f64>()
        .map_err(|_| MatchError::InvalidRadius(input.to_string()))
}

/// Load both datasets and match them
///
/// Steps run strictly in sequence: load A, load B, then match.
pub fn run<A: Read, B: Read>(data1: A, data2: B, radius_m: f64) -> Result<MatchRun> {
    let data1 = load_points(data1)?;
    let data2 = load_points(data2)?;

    Ok(match_loaded(data1, data2, radius_m))
}

/// Same as [`run`] but reading both datasets from disk
pub fn run_files<P: AsRef<Path>, Q: AsRef<Path>>(path1: P, path2: Q, radius_m: f64) -> Result<MatchRun> {
    info!(
        "Processing files: {} {}",
        path1.as_ref().display(),
        path2.as_ref().display()
    );
    let data1 = load_points_from_path(path1)?;
    let data2 = load_points_from_path(path2)?;

    Ok(match_loaded(data1, data2, radius_m))
}

fn match_loaded(data1: LoadedPoints, data2: LoadedPoints, radius_m: f64) -> MatchRun {
    let result = find_matches(&data1.points, &data2.points, radius_m);

    info!(
        "Matched {} of {} pairs within {} m",
        result.matches.len(),
        result.pairs_evaluated,
        radius_m
    );

    MatchRun {
        data1,
        data2,
        matches: result.matches,
    }
}

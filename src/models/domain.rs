use serde::{Deserialize, Serialize};

/// Named coordinate loaded from an input table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point in meters
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        crate::core::distance::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// A pair of points from the two datasets that fell within the radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "sourceA")]
    pub source_a: Point,
    #[serde(rename = "sourceB")]
    pub source_b: Point,
    #[serde(rename = "distanceMeters")]
    pub distance_meters: f64,
}

/// Field separator of an input table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

/// Why a row was left out of a point set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    TooFewFields { found: usize },
    InvalidLatitude { value: String },
    InvalidLongitude { value: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewFields { found } => {
                write!(f, "expected at least 3 fields, found {}", found)
            }
            SkipReason::InvalidLatitude { value } => write!(f, "invalid latitude {:?}", value),
            SkipReason::InvalidLongitude { value } => write!(f, "invalid longitude {:?}", value),
        }
    }
}

/// Diagnostic for a single skipped input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based record number, the header being row 1
    pub row: usize,
    pub reason: SkipReason,
}

/// Output of loading one input table
#[derive(Debug, Clone)]
pub struct LoadedPoints {
    pub points: Vec<Point>,
    pub skipped: Vec<SkippedRow>,
    pub delimiter: Delimiter,
}

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::MatchRecord;

/// Column header of every results table
pub const RESULT_HEADER: [&str; 7] = [
    "data1_name",
    "lat1",
    "lon1",
    "data2_name",
    "lat2",
    "lon2",
    "distance_meters",
];

/// Write match records as comma-separated text
///
/// The header is always written, even for an empty match set. Coordinates
/// get 6 decimals and distances 2; rows keep the order of `matches`.
pub fn write_matches<W: Write>(writer: W, matches: &[MatchRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(RESULT_HEADER)?;

    for record in matches {
        csv_writer.write_record(&[
            record.source_a.name.clone(),
            format!("{:.6}", record.source_a.latitude),
            format!("{:.6}", record.source_a.longitude),
            record.source_b.name.clone(),
            format!("{:.6}", record.source_b.latitude),
            format!("{:.6}", record.source_b.longitude),
            format!("{:.2}", record.distance_meters),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Serialize match records into an in-memory buffer
pub fn serialize_matches(matches: &[MatchRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_matches(&mut buf, matches)?;
    Ok(buf)
}

/// Write match records to a file, replacing any previous content
pub fn write_matches_to_path<P: AsRef<Path>>(path: P, matches: &[MatchRecord]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut buffered = BufWriter::new(file);
    write_matches(&mut buffered, matches)?;
    buffered.flush()?;
    Ok(())
}

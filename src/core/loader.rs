//! Tolerant loader for `name, latitude, longitude` tables.
//!
//! The field separator is sniffed from the first [`SNIFF_WINDOW`] bytes of
//! the stream: any `;` in that window selects semicolon for the whole file,
//! otherwise comma is used. A semicolon that first appears past the window
//! (for example inside a quoted value further down) is not seen.
//!
//! The sniffed bytes are buffered and replayed in front of the rest of the
//! stream, so the loader works on pipes and sockets as well as files.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::models::{Delimiter, LoadedPoints, Point, SkipReason, SkippedRow};

/// Number of leading bytes inspected when choosing the delimiter
pub const SNIFF_WINDOW: usize = 1024;

/// Pick the delimiter for a table from its leading bytes
#[inline]
pub fn detect_delimiter(prefix: &[u8]) -> Delimiter {
    let window = &prefix[..prefix.len().min(SNIFF_WINDOW)];
    if window.contains(&b';') {
        Delimiter::Semicolon
    } else {
        Delimiter::Comma
    }
}

/// Load points from any byte stream
///
/// The first record is a header and is always dropped. Rows with fewer than
/// three fields or with an unparseable latitude/longitude are skipped and
/// reported in [`LoadedPoints::skipped`]; they never fail the load. Bytes
/// that aren't valid UTF-8 are replaced in names, and make a coordinate
/// unparseable.
///
/// # Errors
/// * [`MatchError::Io`](crate::error::MatchError::Io) if the stream can't be read
/// * [`MatchError::Format`](crate::error::MatchError::Format) if the table itself
///   is broken (a quoted field still open at end of input)
pub fn load_points<R: Read>(mut reader: R) -> Result<LoadedPoints> {
    let mut prefix = Vec::with_capacity(SNIFF_WINDOW);
    reader
        .by_ref()
        .take(SNIFF_WINDOW as u64)
        .read_to_end(&mut prefix)?;

    let delimiter = detect_delimiter(&prefix);
    info!("Using delimiter '{}'", delimiter);

    let source = QuoteTracker::new(Cursor::new(prefix).chain(reader), delimiter.as_byte());
    let mut table = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(source);

    let mut points = Vec::new();
    let mut skipped = Vec::new();
    let mut last_row = 0;

    for (index, record) in table.byte_records().enumerate() {
        let record = record?;
        let row = index + 1;
        last_row = row;

        // Header
        if index == 0 {
            continue;
        }

        match parse_row(&record) {
            Ok(point) => points.push(point),
            Err(reason) => {
                debug!("Skipping row {}: {}", row, reason);
                skipped.push(SkippedRow { row, reason });
            }
        }
    }

    if table.get_ref().in_open_quote() {
        return Err(MatchError::Format(format!(
            "unterminated quoted field in row {}",
            last_row
        )));
    }

    info!(
        "Loaded {} valid points ({} rows skipped)",
        points.len(),
        skipped.len()
    );

    Ok(LoadedPoints {
        points,
        skipped,
        delimiter,
    })
}

/// Load points from a file on disk
pub fn load_points_from_path<P: AsRef<Path>>(path: P) -> Result<LoadedPoints> {
    let path = path.as_ref();
    debug!("Loading points from {}", path.display());
    let file = File::open(path)?;
    load_points(file)
}

fn parse_row(record: &ByteRecord) -> std::result::Result<Point, SkipReason> {
    if record.len() < 3 {
        return Err(SkipReason::TooFewFields {
            found: record.len(),
        });
    }

    let latitude = parse_coordinate(&record[1]).ok_or_else(|| SkipReason::InvalidLatitude {
        value: String::from_utf8_lossy(&record[1]).into_owned(),
    })?;
    let longitude = parse_coordinate(&record[2]).ok_or_else(|| SkipReason::InvalidLongitude {
        value: String::from_utf8_lossy(&record[2]).into_owned(),
    })?;

    Ok(Point::new(String::from_utf8_lossy(&record[0]), latitude, longitude))
}

#[inline]
fn parse_coordinate(field: &[u8]) -> Option<f64> {
    std::str::from_utf8(field).ok()?.parse::<f64>().ok()
}

/// Where the parser stands relative to quoting after the bytes seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either an escaped quote or the close
    QuoteInQuoted,
}

impl QuoteState {
    #[inline]
    fn advance(self, byte: u8, delimiter: u8) -> Self {
        match (self, byte) {
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (_, b) if b == delimiter || b == b'\n' || b == b'\r' => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        }
    }
}

/// Reader that follows the quoting of everything handed to the csv parser
///
/// The parser reads an unterminated quoted field to end of input without
/// complaint; this lets the loader tell that apart from a complete table.
/// Quotes only open a field at its start, as in the parser.
struct QuoteTracker<R> {
    inner: R,
    delimiter: u8,
    state: QuoteState,
}

impl<R: Read> QuoteTracker<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            state: QuoteState::FieldStart,
        }
    }

    fn in_open_quote(&self) -> bool {
        self.state == QuoteState::Quoted
    }
}

impl<R: Read> Read for QuoteTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            self.state = self.state.advance(byte, self.delimiter);
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_comma_by_default() {
        assert_eq!(detect_delimiter(b"name,lat,lon\nA,1,2\n"), Delimiter::Comma);
        assert_eq!(detect_delimiter(b""), Delimiter::Comma);
    }

    #[test]
    fn test_detect_semicolon() {
        assert_eq!(detect_delimiter(b"name;lat;lon\n"), Delimiter::Semicolon);
    }

    #[test]
    fn test_detect_ignores_bytes_past_window() {
        let mut data = vec![b'a'; SNIFF_WINDOW];
        data.push(b';');
        assert_eq!(detect_delimiter(&data), Delimiter::Comma);
    }

    #[test]
    fn test_parse_row_too_few_fields() {
        let record = ByteRecord::from(vec!["A", "1.0"]);
        assert_eq!(
            parse_row(&record),
            Err(SkipReason::TooFewFields { found: 2 })
        );
    }

    #[test]
    fn test_parse_row_keeps_name_verbatim() {
        let record = ByteRecord::from(vec!["  Spaced Name ", "1.5", "-2.25", "extra"]);
        let point = parse_row(&record).unwrap();
        assert_eq!(point.name, "  Spaced Name ");
        assert_eq!(point.latitude, 1.5);
        assert_eq!(point.longitude, -2.25);
    }

    #[test]
    fn test_parse_row_rejects_padded_number() {
        let record = ByteRecord::from(vec!["A", " 1.5", "2.0"]);
        assert_eq!(
            parse_row(&record),
            Err(SkipReason::InvalidLatitude { value: " 1.5".to_string() })
        );
    }

    #[test]
    fn test_load_skips_and_reports_rows() {
        let data = "name,lat,lon\nA,1.0,2.0\nB,x,2.0\nC,1.0,y\nD,1.0\nE,3.0,4.0\n";
        let loaded = load_points(data.as_bytes()).unwrap();

        let names: Vec<_> = loaded.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "E"]);
        assert_eq!(loaded.delimiter, Delimiter::Comma);

        let rows: Vec<_> = loaded.skipped.iter().map(|s| s.row).collect();
        assert_eq!(rows, vec![3, 4, 5]);
        assert!(matches!(loaded.skipped[0].reason, SkipReason::InvalidLatitude { .. }));
        assert!(matches!(loaded.skipped[1].reason, SkipReason::InvalidLongitude { .. }));
        assert!(matches!(loaded.skipped[2].reason, SkipReason::TooFewFields { found: 2 }));
    }

    #[test]
    fn test_load_empty_stream() {
        let loaded = load_points(&b""[..]).unwrap();
        assert!(loaded.points.is_empty());
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_load_header_only() {
        let loaded = load_points(&b"name,lat,lon\n"[..]).unwrap();
        assert!(loaded.points.is_empty());
    }

    #[test]
    fn test_load_latin1_row_is_kept() {
        let data: &[u8] = b"name,lat,lon\nA,1.0,1.0\nCaf\xe9,2.0,2.0\nB,3.0,3.0\n";
        let loaded = load_points(data).unwrap();

        let names: Vec<_> = loaded.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "Caf\u{FFFD}", "B"]);
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_load_non_utf8_coordinate_is_skipped() {
        let data: &[u8] = b"name,lat,lon\nA,1.0,1.0\nB,2.\xff,2.0\nC,3.0,3.0\n";
        let loaded = load_points(data).unwrap();

        assert_eq!(loaded.points.len(), 2);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].row, 3);
        assert!(matches!(loaded.skipped[0].reason, SkipReason::InvalidLatitude { .. }));
    }

    #[test]
    fn test_load_unterminated_quote_is_format_error() {
        let data = "name,lat,lon\nA,1.0,1.0\n\"B,2.0,2.0\nC,3.0,3.0\nD,4.0,4.0\n";

        match load_points(data.as_bytes()) {
            Err(MatchError::Format(message)) => assert!(message.contains("row 3"), "{}", message),
            other => panic!("expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_closed_quotes_are_fine() {
        let data = "name,lat,lon\n\"Say \"\"hi\"\"\nthere\",1.0,2.0\nmid\"quote,3.0,4.0\n\"\",5.0,6.0\n";
        let loaded = load_points(data.as_bytes()).unwrap();

        let names: Vec<_> = loaded.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Say \"hi\"\nthere", "mid\"quote", ""]);
    }

    #[test]
    fn test_quote_state_tracks_fields() {
        let mut state = QuoteState::FieldStart;
        for &byte in b"a,\"b,c" {
            state = state.advance(byte, b',');
        }
        assert_eq!(state, QuoteState::Quoted);

        state = state.advance(b'"', b',');
        assert_eq!(state, QuoteState::QuoteInQuoted);
        state = state.advance(b'\n', b',');
        assert_eq!(state, QuoteState::FieldStart);
    }
}

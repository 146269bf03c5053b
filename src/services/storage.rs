use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone};
use tempfile::NamedTempFile;

use crate::core::serializer::write_matches;
use crate::error::{MatchError, Result};
use crate::models::MatchRecord;

/// Keeper of the single results artifact
///
/// Writes go through a mutex so two requests never interleave output into
/// the same file; reads take the same lock so a download never sees a
/// half-written table.
pub struct ResultStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultStore {
    /// Create a store writing to `dir/file_name`
    pub fn new<P: AsRef<Path>>(dir: P, file_name: &str) -> Self {
        Self {
            path: dir.as_ref().join(file_name),
            lock: Mutex::new(()),
        }
    }

    /// Location of the artifact on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored artifact with `matches`
    pub fn save(&self, matches: &[MatchRecord]) -> Result<PathBuf> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        replace_file(&self.path, |out| write_matches(out, matches))?;
        tracing::debug!("Wrote {} matches to {}", matches.len(), self.path.display());

        Ok(self.path.clone())
    }

    /// Contents of the stored artifact, or `None` if nothing was saved yet
    pub fn read_latest(&self) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `path` through a sibling temp file renamed into place
///
/// If `write` fails the temp file is removed and the previous contents of
/// `path` stay untouched.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut buffered = BufWriter::new(tmp.as_file_mut());
        write(&mut buffered)?;
        buffered.flush()?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// File name offered to the client when downloading results
pub fn download_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Result_{}.csv", at.format("%Y-%m-%d_%H-%M-%S"))
}

fn poisoned() -> MatchError {
    MatchError::Io(std::io::Error::new(
        ErrorKind::Other,
        "result store lock poisoned",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use chrono::Utc;

    #[test]
    fn test_read_before_save_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path(), "results.csv");

        assert!(store.read_latest().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("nested"), "results.csv");

        let a = Point::new("A", 0.0, 0.0);
        let b = Point::new("B", 0.0, 0.0);
        let record = MatchRecord {
            source_a: a,
            source_b: b,
            distance_meters: 0.0,
        };

        store.save(&[record]).unwrap();
        let first = String::from_utf8(store.read_latest().unwrap().unwrap()).unwrap();
        assert_eq!(first.lines().count(), 2);

        store.save(&[]).unwrap();
        let second = String::from_utf8(store.read_latest().unwrap().unwrap()).unwrap();
        assert_eq!(second.lines().count(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path(), "results.csv");
        store.save(&[]).unwrap();
        let before = store.read_latest().unwrap().unwrap();

        let result = replace_file(store.path(), |out| {
            out.write_all(b"data1_name,lat1")?;
            Err(MatchError::Io(std::io::Error::new(ErrorKind::Other, "disk full")))
        });

        assert!(result.is_err());
        assert_eq!(store.read_latest().unwrap().unwrap(), before);

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file left behind");
    }

    #[test]
    fn test_download_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(download_file_name(&at), "Result_2024-03-09_07-05-01.csv");
    }
}

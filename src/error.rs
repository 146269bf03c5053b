use thiserror::Error;

/// Errors that abort a matching run
///
/// Row-level problems never show up here; the loader reports them as
/// [`SkippedRow`](crate::models::SkippedRow) diagnostics instead.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed table: {0}")]
    Format(String),

    #[error("Invalid radius: {0:?}")]
    InvalidRadius(String),
}

impl From<csv::Error> for MatchError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return MatchError::Format(err.to_string());
        }

        match err.into_kind() {
            csv::ErrorKind::Io(io) => MatchError::Io(io),
            other => MatchError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{:?}", other),
            )),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Delimiter, LoadedPoints, MatchRecord, Point, SkipReason, SkippedRow};
pub use requests::ProcessRequest;
pub use responses::{ErrorResponse, HealthResponse, ProcessResponse};

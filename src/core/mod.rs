// Core algorithm exports
pub mod distance;
pub mod loader;
pub mod matcher;
pub mod pipeline;
pub mod serializer;

pub use distance::{haversine_distance, EARTH_RADIUS_M};
pub use loader::{detect_delimiter, load_points, load_points_from_path, SNIFF_WINDOW};
pub use matcher::{find_matches, MatchResult};
pub use pipeline::{parse_radius, run, run_files, MatchRun};
pub use serializer::{serialize_matches, write_matches, write_matches_to_path, RESULT_HEADER};

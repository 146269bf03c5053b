// Service exports
pub mod storage;

pub use storage::{download_file_name, ResultStore};

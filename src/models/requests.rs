use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to match two uploaded datasets
///
/// `radius` is kept as text so that an unparseable value can be reported
/// as an invalid radius rather than a generic JSON error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessRequest {
    #[validate(length(min = 1))]
    pub data1: String,
    #[validate(length(min = 1))]
    pub data2: String,
    #[validate(length(min = 1))]
    pub radius: String,
}

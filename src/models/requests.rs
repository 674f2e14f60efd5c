use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sidebar control values as submitted by the console page
///
/// Every field is optional; missing values fall back to the configured
/// slider defaults and out-of-range values are clamped, see
/// [`crate::core::controls::resolve_configuration`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ConsoleParams {
    pub top_n: Option<u32>,
    pub candidate_pool: Option<u32>,
    pub semantic_weight: Option<f64>,
    pub use_ocr: Option<bool>,
    pub vienna_threshold: Option<f64>,
    #[validate(length(max = 500))]
    pub query: Option<String>,
}

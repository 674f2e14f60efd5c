use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Serialize the prediction list exactly as the service returned it
pub fn vienna_export_json(raw: &[Value]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(raw)
}

/// Download file name, stamped with the time of the classification
pub fn vienna_export_file_name(at: DateTime<Utc>) -> String {
    format!("vienna_predictions_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// `href` for a download link carrying the export inline
pub fn json_download_href(json: &str) -> String {
    format!("data:application/json;base64,{}", BASE64.encode(json.as_bytes()))
}

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

/// Parameters threaded into every request the console issues
///
/// Rebuilt from the sidebar controls on each request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchConfiguration {
    #[validate(range(min = 1))]
    pub result_count: u32,
    #[validate(range(min = 1))]
    pub candidate_pool: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub semantic_weight: f64,
    pub ocr_enabled: bool,
    #[validate(range(min = 0.0, max = 1.0))]
    pub vienna_threshold: f64,
}

/// An image uploaded through one of the console panels
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "file".to_string(),
            content_type: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline copy of the upload for the "Query Image" preview
    pub fn preview(&self) -> EmbeddedImage {
        EmbeddedImage {
            content_type: self
                .content_type
                .clone()
                .unwrap_or_else(|| "image/png".to_string()),
            bytes: self.bytes.clone(),
        }
    }
}

/// Reduce a `Content-Type` value to a bare `image/<subtype>` media type
///
/// Parameters after `;` are dropped. Anything that is not an image type, or
/// whose subtype holds characters outside `[A-Za-z0-9.+-]`, yields `None`.
pub fn image_media_type(value: &str) -> Option<String> {
    let essence = value.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    if !kind.eq_ignore_ascii_case("image") || subtype.is_empty() {
        return None;
    }
    if !subtype
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
    {
        return None;
    }
    Some(format!("image/{}", subtype.to_ascii_lowercase()))
}

/// Image bytes ready to be inlined into the page as a `data:` URI
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, BASE64.encode(&self.bytes))
    }
}

/// One ranked trademark returned by the search service
///
/// Every field is optional on the wire. String-like fields also accept
/// numbers, since the service is not consistent about e.g. `class`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub application_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub verbal_element: Option<String>,
    #[serde(rename = "class", default, deserialize_with = "lenient_string")]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trade_mark_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tmr_application_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub application_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trade_mark_reg_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text_score: Option<f64>,
    #[serde(default)]
    pub semantic_score_norm: Option<f64>,
    #[serde(default)]
    pub text_score_norm: Option<f64>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Response of `POST /search/image`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub cleaned_ocr_text: Option<String>,
    #[serde(default)]
    pub semantic_weight: Option<f64>,
    #[serde(default)]
    pub shape_focus_active: Option<bool>,
}

/// Results for one semantic weight of an automated search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedResultGroup {
    pub semantic_weight: f64,
    pub text_weight: f64,
    #[serde(default)]
    pub shape_focus_active: bool,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Response of `POST /search/automated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatedSearchResponse {
    #[serde(default)]
    pub weights_searched: Vec<f64>,
    #[serde(default)]
    pub gpus_used: Option<u32>,
    #[serde(default)]
    pub candidate_pool: Option<u32>,
    #[serde(default)]
    pub top_n: Option<u32>,
    #[serde(default)]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub cleaned_ocr_text: Option<String>,
    pub results_by_weight: Vec<WeightedResultGroup>,
}

/// Response of `GET /search/text`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub cleaned_query: Option<String>,
}

/// One Vienna class predicted for an uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViennaClassification {
    #[serde(deserialize_with = "required_string")]
    pub category_code: String,
    #[serde(default)]
    pub category_type: String,
    #[serde(default)]
    pub description: String,
    pub probability: f64,
}

fn required_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Parsed predictions together with the list exactly as the service sent it
#[derive(Debug, Clone, PartialEq)]
pub struct ViennaPredictions {
    pub predictions: Vec<ViennaClassification>,
    pub raw: Vec<Value>,
}

/// Outcome of probing the search service
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy(Value),
    Unhealthy(u16),
    Unreachable(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy(_))
    }
}

/// Thumbnail state for one result row
#[derive(Debug, Clone, PartialEq)]
pub enum Thumbnail {
    /// The result carries no image URL
    Missing,
    Loaded(EmbeddedImage),
    /// The image host answered with something other than 200
    NotAvailable(u16),
    /// Transport error or timeout
    LoadFailed,
}

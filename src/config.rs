use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8501 }

/// Remote search service endpoint and per-call time bounds
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
    #[serde(default = "default_automated_timeout")]
    pub automated_timeout_secs: u64,
    #[serde(default = "default_text_timeout")]
    pub text_timeout_secs: u64,
    #[serde(default = "default_vienna_timeout")]
    pub vienna_timeout_secs: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
    #[serde(default = "default_thumbnail_timeout")]
    pub thumbnail_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_timeout_secs: default_image_timeout(),
            automated_timeout_secs: default_automated_timeout(),
            text_timeout_secs: default_text_timeout(),
            vienna_timeout_secs: default_vienna_timeout(),
            health_timeout_secs: default_health_timeout(),
            thumbnail_timeout_secs: default_thumbnail_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_timeout_secs)
    }
}

fn default_base_url() -> String { "https://tmsearchapi.beyondatagroup.com".to_string() }
fn default_image_timeout() -> u64 { 60 }
fn default_automated_timeout() -> u64 { 120 }
fn default_text_timeout() -> u64 { 30 }
fn default_vienna_timeout() -> u64 { 60 }
fn default_health_timeout() -> u64 { 10 }
fn default_thumbnail_timeout() -> u64 { 10 }

/// Bounds and default for an integer slider
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct IntegerControl {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Default and step for a slider over [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WeightControl {
    pub default: f64,
    pub step: f64,
}

/// Sidebar controls shared by every console panel
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_top_n")]
    pub top_n: IntegerControl,
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: IntegerControl,
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: WeightControl,
    #[serde(default = "default_vienna_threshold")]
    pub vienna_threshold: WeightControl,
    #[serde(default = "default_use_ocr")]
    pub use_ocr: bool,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            candidate_pool: default_candidate_pool(),
            semantic_weight: default_semantic_weight(),
            vienna_threshold: default_vienna_threshold(),
            use_ocr: default_use_ocr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_top_n() -> IntegerControl { IntegerControl { min: 5, max: 50, default: 10 } }
fn default_candidate_pool() -> IntegerControl { IntegerControl { min: 50, max: 2000, default: 200 } }
fn default_semantic_weight() -> WeightControl { WeightControl { default: 0.5, step: 0.25 } }
fn default_vienna_threshold() -> WeightControl { WeightControl { default: 0.5, step: 0.05 } }
fn default_use_ocr() -> bool { true }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Formatter used by the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
    Pretty,
}

impl LoggingSettings {
    /// Unknown format names fall back to compact text
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TMSC_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TMSC__API__BASE_URL -> api.base_url
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Parse settings from an inline TOML document, without environment overrides
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("TMSC")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply shortcut environment variables on top of the layered config
///
/// `TMSC_API_URL` points the console at another search service and
/// `LOG_LEVEL`/`LOG_FORMAT` override the logging section.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("TMSC_API_URL") {
        builder = builder.set_override("api.base_url", url)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let api = ApiSettings::default();
        assert_eq!(api.image_timeout_secs, 60);
        assert_eq!(api.automated_timeout_secs, 120);
        assert_eq!(api.text_timeout_secs, 30);
        assert_eq!(api.vienna_timeout_secs, 60);
        assert_eq!(api.thumbnail_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_controls() {
        let search = SearchSettings::default();
        assert_eq!(search.top_n, IntegerControl { min: 5, max: 50, default: 10 });
        assert_eq!(search.candidate_pool.default, 200);
        assert_eq!(search.semantic_weight.step, 0.25);
        assert!(search.use_ocr);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
        assert_eq!(LoggingSettings::default().log_format(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_names() {
        let with = |format: &str| LoggingSettings {
            level: default_log_level(),
            format: format.to_string(),
        };
        assert_eq!(with("JSON").log_format(), LogFormat::Json);
        assert_eq!(with("pretty").log_format(), LogFormat::Pretty);
        assert_eq!(with("compact").log_format(), LogFormat::Compact);
        assert_eq!(with("plain").log_format(), LogFormat::Compact);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [api]
            base_url = "http://localhost:9000"
            text_timeout_secs = 5

            [search.top_n]
            min = 1
            max = 20
            default = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:9000");
        assert_eq!(settings.api.text_timeout_secs, 5);
        assert_eq!(settings.api.image_timeout_secs, 60);
        assert_eq!(settings.search.top_n.max, 20);
        assert_eq!(settings.search.candidate_pool.max, 2000);
        assert_eq!(settings.server.port, 8501);
    }
}

use crate::config::{IntegerControl, SearchSettings, WeightControl};
use crate::models::{ConsoleParams, SearchConfiguration};
use validator::{Validate, ValidationErrors};

impl IntegerControl {
    /// Submitted value, or the default, clamped into `[min, max]` (never below 1)
    pub fn resolve(&self, value: Option<u32>) -> u32 {
        let lo = self.min.max(1);
        let hi = self.max.max(lo);
        value.unwrap_or(self.default).clamp(lo, hi)
    }
}

impl WeightControl {
    /// Submitted value, or the default, snapped to the step and kept in `[0, 1]`
    pub fn resolve(&self, value: Option<f64>) -> f64 {
        let value = value.filter(|v| v.is_finite()).unwrap_or(self.default);
        let snapped = if self.step > 0.0 {
            (value / self.step).round() * self.step
        } else {
            value
        };
        // drop float noise such as 0.30000000000000004
        ((snapped * 10_000.0).round() / 10_000.0).clamp(0.0, 1.0)
    }
}

/// Build the configuration for one request from the submitted controls
pub fn resolve_configuration(
    params: &ConsoleParams,
    search: &SearchSettings,
) -> Result<SearchConfiguration, ValidationErrors> {
    let config = SearchConfiguration {
        result_count: search.top_n.resolve(params.top_n),
        candidate_pool: search.candidate_pool.resolve(params.candidate_pool),
        semantic_weight: search.semantic_weight.resolve(params.semantic_weight),
        ocr_enabled: params.use_ocr.unwrap_or(search.use_ocr),
        vienna_threshold: search.vienna_threshold.resolve(params.vienna_threshold),
    };

    config.validate()?;
    Ok(config)
}

/// Scores at or above this are shown as "high"
pub const HIGH_SCORE_THRESHOLD: f64 = 0.7;

/// Scores at or above this (and below high) are shown as "medium"
pub const MEDIUM_SCORE_THRESHOLD: f64 = 0.4;

/// Presentation bucket for a similarity score or probability
///
/// Only used for styling; never for ordering or filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreClass {
    High,
    Medium,
    Low,
}

impl ScoreClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreClass::High => "high",
            ScoreClass::Medium => "medium",
            ScoreClass::Low => "low",
        }
    }

    /// CSS class used by the console stylesheet
    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreClass::High => "score-high",
            ScoreClass::Medium => "score-medium",
            ScoreClass::Low => "score-low",
        }
    }
}

/// Bucket a score; both thresholds are inclusive and NaN is "low"
#[inline]
pub fn classify_score(score: f64) -> ScoreClass {
    if score >= HIGH_SCORE_THRESHOLD {
        ScoreClass::High
    } else if score >= MEDIUM_SCORE_THRESHOLD {
        ScoreClass::Medium
    } else {
        ScoreClass::Low
    }
}

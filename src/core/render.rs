use crate::core::scoring::{classify_score, ScoreClass};
use crate::models::{
    AutomatedSearchResponse, SearchResult, Thumbnail, ViennaClassification, WeightedResultGroup,
};

/// Which score field headlines a result card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    /// Hybrid searches: `final_score`, then `score`
    Final,
    /// Text search: `text_score`, then `score`
    Text,
}

impl ScoreSource {
    pub fn score_of(&self, result: &SearchResult) -> f64 {
        let primary = match self {
            ScoreSource::Final => result.final_score,
            ScoreSource::Text => result.text_score,
        };
        primary.or(result.score).unwrap_or(0.0)
    }
}

/// Display-ready view of one result, borrowing the parsed response
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow<'a> {
    pub rank: usize,
    pub result: &'a SearchResult,
    pub score: f64,
    pub score_class: ScoreClass,
    pub thumbnail: Option<&'a Thumbnail>,
}

/// Map results to rows, preserving server order and leaving the data untouched
pub fn result_rows<'a>(
    results: &'a [SearchResult],
    thumbnails: &'a [Thumbnail],
    source: ScoreSource,
) -> Vec<ResultRow<'a>> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let score = source.score_of(result);
            ResultRow {
                rank: i + 1,
                result,
                score,
                score_class: classify_score(score),
                thumbnail: thumbnails.get(i),
            }
        })
        .collect()
}

/// OCR text extracted by the service from the query image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrSummary<'a> {
    pub raw: &'a str,
    pub cleaned: Option<&'a str>,
}

/// OCR block, shown only when the raw text is present and non-empty
pub fn ocr_summary<'a>(raw: Option<&'a str>, cleaned: Option<&'a str>) -> Option<OcrSummary<'a>> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    Some(OcrSummary {
        raw,
        cleaned: cleaned.filter(|s| !s.trim().is_empty()),
    })
}

/// Weight whose group starts expanded
pub const DEFAULT_EXPANDED_WEIGHT: f64 = 0.5;

pub fn is_default_expanded(semantic_weight: f64) -> bool {
    (semantic_weight - DEFAULT_EXPANDED_WEIGHT).abs() < 1e-9
}

/// One collapsible section of an automated search
#[derive(Debug, Clone, PartialEq)]
pub struct GroupView<'a> {
    pub group: &'a WeightedResultGroup,
    pub expanded: bool,
    pub rows: Vec<ResultRow<'a>>,
}

/// One view per weight entry, in the order the service returned them
///
/// `thumbnails[i]` holds the thumbnails of group `i`; missing entries render
/// without images.
pub fn weight_groups<'a>(
    response: &'a AutomatedSearchResponse,
    thumbnails: &'a [Vec<Thumbnail>],
) -> Vec<GroupView<'a>> {
    response
        .results_by_weight
        .iter()
        .enumerate()
        .map(|(i, group)| GroupView {
            group,
            expanded: is_default_expanded(group.semantic_weight),
            rows: result_rows(
                &group.results,
                thumbnails.get(i).map(Vec::as_slice).unwrap_or(&[]),
                ScoreSource::Final,
            ),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow<'a> {
    pub prediction: &'a ViennaClassification,
    pub score_class: ScoreClass,
}

pub fn prediction_rows(predictions: &[ViennaClassification]) -> Vec<PredictionRow<'_>> {
    predictions
        .iter()
        .map(|prediction| PredictionRow {
            prediction,
            score_class: classify_score(prediction.probability),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(number: &str, final_score: f64) -> SearchResult {
        SearchResult {
            application_number: Some(number.to_string()),
            final_score: Some(final_score),
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_keep_server_order() {
        // deliberately not sorted by score
        let results = vec![result("A", 0.2), result("B", 0.9), result("C", 0.5)];
        let rows = result_rows(&results, &[], ScoreSource::Final);

        let numbers: Vec<_> = rows
            .iter()
            .map(|r| r.result.application_number.as_deref().unwrap())
            .collect();
        assert_eq!(numbers, vec!["A", "B", "C"]);
        assert_eq!(rows[1].score_class, ScoreClass::High);
        assert_eq!(rows[2].rank, 3);
        assert!(rows.iter().all(|r| r.thumbnail.is_none()));
    }

    #[test]
    fn test_score_fallbacks() {
        let mut r = SearchResult {
            score: Some(0.45),
            ..Default::default()
        };
        assert_eq!(ScoreSource::Final.score_of(&r), 0.45);
        assert_eq!(ScoreSource::Text.score_of(&r), 0.45);

        r.text_score = Some(0.8);
        assert_eq!(ScoreSource::Text.score_of(&r), 0.8);
        assert_eq!(ScoreSource::Final.score_of(&SearchResult::default()), 0.0);
    }

    #[test]
    fn test_ocr_summary_requires_text() {
        assert_eq!(ocr_summary(None, Some("nike")), None);
        assert_eq!(ocr_summary(Some("  "), None), None);

        let summary = ocr_summary(Some("NIKE!"), Some("")).unwrap();
        assert_eq!(summary.raw, "NIKE!");
        assert_eq!(summary.cleaned, None);
    }

    #[test]
    fn test_only_half_weight_expanded() {
        assert!(is_default_expanded(0.5));
        assert!(!is_default_expanded(0.25));
        assert!(!is_default_expanded(1.0));
    }
}

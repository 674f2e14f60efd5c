// Unit tests for the trademark search console

use serde_json::json;
use tm_search_console::config::{IntegerControl, SearchSettings, Settings};
use tm_search_console::core::{
    classify_score, html, ocr_summary, prediction_rows, resolve_configuration, result_rows,
    weight_groups, ScoreClass, ScoreSource,
};
use tm_search_console::models::{
    AutomatedSearchResponse, ConsoleParams, ImageSearchResponse, ImageUpload, SearchResult,
    Thumbnail, ViennaClassification,
};
use tm_search_console::services::ApiError;

fn result(number: &str, score: f64) -> SearchResult {
    SearchResult {
        application_number: Some(number.to_string()),
        final_score: Some(score),
        ..Default::default()
    }
}

#[test]
fn test_score_classes() {
    assert_eq!(classify_score(0.75), ScoreClass::High);
    assert_eq!(classify_score(0.45), ScoreClass::Medium);
    assert_eq!(classify_score(0.1), ScoreClass::Low);
    assert_eq!(classify_score(0.7), ScoreClass::High);
    assert_eq!(classify_score(0.4), ScoreClass::Medium);
}

#[test]
fn test_controls_stay_in_bounds_in_any_order() {
    let search = SearchSettings::default();
    let submissions = [
        (Some(0), Some(0)),
        (Some(u32::MAX), Some(u32::MAX)),
        (Some(4), Some(2001)),
        (Some(51), Some(49)),
        (None, Some(1_000)),
        (Some(25), None),
    ];

    for (top_n, candidate_pool) in submissions {
        let params = ConsoleParams {
            top_n,
            candidate_pool,
            ..Default::default()
        };
        let config = resolve_configuration(&params, &search).unwrap();

        assert!((5..=50).contains(&config.result_count), "top_n {:?}", top_n);
        assert!((50..=2000).contains(&config.candidate_pool), "pool {:?}", candidate_pool);
    }
}

#[test]
fn test_weights_stay_in_unit_interval() {
    let search = SearchSettings::default();
    for weight in [-1.0, 0.0, 0.12, 0.5, 0.88, 1.0, 7.5, f64::INFINITY] {
        let params = ConsoleParams {
            semantic_weight: Some(weight),
            vienna_threshold: Some(weight),
            ..Default::default()
        };
        let config = resolve_configuration(&params, &search).unwrap();

        assert!((0.0..=1.0).contains(&config.semantic_weight));
        assert!((0.0..=1.0).contains(&config.vienna_threshold));
    }
}

#[test]
fn test_custom_bounds_from_settings() {
    let mut search = SearchSettings::default();
    search.top_n = IntegerControl { min: 1, max: 3, default: 2 };

    let params = ConsoleParams {
        top_n: Some(9),
        ..Default::default()
    };
    assert_eq!(resolve_configuration(&params, &search).unwrap().result_count, 3);
}

#[test]
fn test_n_results_give_n_rows_unmodified() {
    let results: Vec<_> = (0..7).map(|i| result(&format!("TM{}", i), 0.1 * i as f64)).collect();
    let original = results.clone();

    let rows = result_rows(&results, &[], ScoreSource::Final);

    assert_eq!(rows.len(), 7);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.rank, i + 1);
        assert_eq!(row.result, &original[i]);
    }
    assert_eq!(results, original);
}

#[test]
fn test_image_fragment_rows() {
    let response = ImageSearchResponse {
        results: vec![result("X", 0.2), result("Y", 0.8)],
        ocr_text: Some("ACME".to_string()),
        cleaned_ocr_text: None,
        semantic_weight: Some(0.5),
        shape_focus_active: Some(true),
    };
    let thumbnails = vec![Thumbnail::LoadFailed, Thumbnail::Missing];
    let rows = result_rows(&response.results, &thumbnails, ScoreSource::Final);
    let ocr = ocr_summary(response.ocr_text.as_deref(), response.cleaned_ocr_text.as_deref());

    let fragment = html::image_search(&ImageUpload::new(b"img".to_vec()), &response, ocr, &rows);

    assert_eq!(fragment.matches("class=\"result-card").count(), 2);
    assert!(fragment.contains("Image load failed"));
    assert!(fragment.contains("Shape focus active"));
    assert!(fragment.contains("OCR Text:</strong> ACME"));
    assert!(!fragment.contains("Cleaned:"));
    assert!(fragment.find(">X<").unwrap() < fragment.find(">Y<").unwrap());
}

#[test]
fn test_ocr_hidden_when_empty() {
    let response = ImageSearchResponse {
        results: vec![],
        ocr_text: Some(String::new()),
        cleaned_ocr_text: Some("ignored".to_string()),
        semantic_weight: None,
        shape_focus_active: None,
    };
    let ocr = ocr_summary(response.ocr_text.as_deref(), response.cleaned_ocr_text.as_deref());
    let fragment = html::image_search(&ImageUpload::new(b"img".to_vec()), &response, ocr, &[]);

    assert!(!fragment.contains("OCR Text"));
    assert!(fragment.contains("Found 0 results!"));
}

#[test]
fn test_automated_groups() {
    let response: AutomatedSearchResponse = serde_json::from_value(json!({
        "weights_searched": [0.0, 0.25, 0.5, 0.75, 1.0],
        "candidate_pool": 200,
        "top_n": 10,
        "results_by_weight": [
            {"semantic_weight": 0.0, "text_weight": 1.0, "shape_focus_active": false, "results": []},
            {"semantic_weight": 0.25, "text_weight": 0.75, "shape_focus_active": false, "results": [{"application_number": "B"}, {"application_number": "A"}]},
            {"semantic_weight": 0.5, "text_weight": 0.5, "shape_focus_active": false, "results": []},
            {"semantic_weight": 0.75, "text_weight": 0.25, "shape_focus_active": true, "results": []},
            {"semantic_weight": 1.0, "text_weight": 0.0, "shape_focus_active": true, "results": []}
        ]
    }))
    .unwrap();

    let groups = weight_groups(&response, &[]);

    assert_eq!(groups.len(), 5);
    let expanded: Vec<bool> = groups.iter().map(|g| g.expanded).collect();
    assert_eq!(expanded, vec![false, false, true, false, false]);

    let order: Vec<_> = groups[1]
        .rows
        .iter()
        .map(|r| r.result.application_number.as_deref().unwrap())
        .collect();
    assert_eq!(order, vec!["B", "A"]);

    for group in &groups {
        assert!((group.group.semantic_weight + group.group.text_weight - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_vienna_rows_and_table() {
    let predictions = vec![
        ViennaClassification {
            category_code: "26.01.01".to_string(),
            category_type: "section".to_string(),
            description: "Circles <plain>".to_string(),
            probability: 0.7,
        },
        ViennaClassification {
            category_code: "01.01.01".to_string(),
            category_type: "division".to_string(),
            description: "Stars".to_string(),
            probability: 0.39,
        },
    ];
    let rows = prediction_rows(&predictions);
    assert_eq!(rows[0].score_class, ScoreClass::High);
    assert_eq!(rows[1].score_class, ScoreClass::Low);

    let fragment = html::vienna(&ImageUpload::new(b"img".to_vec()), &rows, None);
    assert!(fragment.contains("Circles &lt;plain&gt;"));
    assert!(fragment.contains("70.0%"));
    assert_eq!(fragment.matches("<tr><td>").count(), 2);
    assert!(!fragment.contains("download="));
}

#[test]
fn test_error_fragments() {
    let status = html::error(&ApiError::Status {
        status: 500,
        body: r#"{"detail":"internal error"}"#.to_string(),
    });
    assert!(status.contains("API Error"));
    assert!(status.contains("500"));
    assert!(status.contains("{\"detail\":\"internal error\"}"));

    assert!(html::error(&ApiError::BlankQuery).contains("Enter trademark text"));
    assert!(html::error(&ApiError::InvalidResponse("bad".into())).contains("Error: bad"));
}

#[test]
fn test_settings_from_toml() {
    let settings = Settings::from_toml(
        r#"
        [server]
        port = 9000

        [logging]
        format = "pretty"
        "#,
    )
    .unwrap();

    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.logging.format, "pretty");
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.api.automated_timeout_secs, 120);
}

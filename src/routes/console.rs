use actix_web::{http::header::CONTENT_TYPE, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;
use crate::config::SearchSettings;
use crate::core::{export, html, ocr_summary, prediction_rows, resolve_configuration, result_rows, weight_groups, ScoreSource};
use crate::models::{image_media_type, ConsoleParams, HealthResponse, ImageUpload, SearchConfiguration};
use crate::services::{ApiError, SearchApiClient, ThumbnailFetcher};
use std::sync::Arc;

/// Application state shared across all handlers
///
/// Read-only: the per-request search configuration travels in the query string.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<SearchApiClient>,
    pub thumbnails: Arc<ThumbnailFetcher>,
    pub search: Arc<SearchSettings>,
}

/// Configure the console page and its panel endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/console")
                .route("/search/image", web::post().to(search_image))
                .route("/search/automated", web::post().to(search_automated))
                .route("/search/text", web::get().to(search_text))
                .route("/vienna", web::post().to(classify_vienna))
                .route("/health", web::get().to(probe_api)),
        );
}

fn fragment(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn error_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::EmptyUpload | ApiError::BlankQuery | ApiError::InvalidUpload(_) => {
            StatusCode::BAD_REQUEST
        }
        e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn api_error(panel: &str, request_id: Uuid, err: &ApiError) -> HttpResponse {
    if err.is_rejected_input() {
        tracing::info!("[{}] {} rejected: {}", request_id, panel, err);
    } else {
        tracing::warn!("[{}] {} failed: {}", request_id, panel, err);
    }
    fragment(error_status(err), html::error(err))
}

/// Validate the submitted controls and resolve them into a configuration
fn configuration(
    state: &AppState,
    params: &ConsoleParams,
) -> Result<SearchConfiguration, HttpResponse> {
    if let Err(errors) = params.validate() {
        tracing::info!("Validation failed for console parameters: {:?}", errors);
        return Err(fragment(StatusCode::BAD_REQUEST, html::invalid_parameters(&errors.to_string())));
    }

    resolve_configuration(params, &state.search).map_err(|errors| {
        tracing::info!("Resolved configuration out of bounds: {:?}", errors);
        fragment(StatusCode::BAD_REQUEST, html::invalid_parameters(&errors.to_string()))
    })
}

/// Build the upload from a raw request body
///
/// The console page posts the file itself as the body, with its MIME type in
/// `Content-Type` and its name in `X-File-Name`.
fn upload_from(req: &HttpRequest, body: web::Bytes) -> ImageUpload {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut upload = ImageUpload::new(body.to_vec());
    upload.content_type = header(CONTENT_TYPE.as_str()).and_then(|ct| image_media_type(&ct));
    if let Some(name) = header("x-file-name") {
        upload.file_name = name;
    }
    upload
}

/// Console page
async fn index(state: web::Data<AppState>) -> impl Responder {
    fragment(StatusCode::OK, html::page(&state.search))
}

/// Liveness of the console itself
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Image search panel
///
/// POST /console/search/image?top_n=10&semantic_weight=0.5&use_ocr=true&candidate_pool=200
async fn search_image(
    state: web::Data<AppState>,
    params: web::Query<ConsoleParams>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let config = match configuration(&state, &params) {
        Ok(config) => config,
        Err(response) => return response,
    };
    let upload = upload_from(&req, body);
    let request_id = Uuid::new_v4();

    tracing::info!(
        "[{}] Image search: {} bytes, top_n={}, semantic_weight={}, use_ocr={}, candidate_pool={}",
        request_id,
        upload.bytes.len(),
        config.result_count,
        config.semantic_weight,
        config.ocr_enabled,
        config.candidate_pool
    );

    let response = match state.api.search_image(&config, &upload).await {
        Ok(response) => response,
        Err(e) => return api_error("Image search", request_id, &e),
    };

    let thumbnails = state.thumbnails.fetch_all(&response.results).await;
    let rows = result_rows(&response.results, &thumbnails, ScoreSource::Final);
    let ocr = ocr_summary(response.ocr_text.as_deref(), response.cleaned_ocr_text.as_deref());

    tracing::info!("[{}] Rendering {} image search results", request_id, rows.len());

    fragment(StatusCode::OK, html::image_search(&upload, &response, ocr, &rows))
}

/// Automated multi-weight search panel
async fn search_automated(
    state: web::Data<AppState>,
    params: web::Query<ConsoleParams>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let config = match configuration(&state, &params) {
        Ok(config) => config,
        Err(response) => return response,
    };
    let upload = upload_from(&req, body);
    let request_id = Uuid::new_v4();

    tracing::info!(
        "[{}] Automated search: {} bytes, top_n={}, use_ocr={}, candidate_pool={}",
        request_id,
        upload.bytes.len(),
        config.result_count,
        config.ocr_enabled,
        config.candidate_pool
    );

    let response = match state.api.search_automated(&config, &upload).await {
        Ok(response) => response,
        Err(e) => return api_error("Automated search", request_id, &e),
    };

    let mut thumbnails = Vec::with_capacity(response.results_by_weight.len());
    for group in &response.results_by_weight {
        thumbnails.push(state.thumbnails.fetch_all(&group.results).await);
    }
    let groups = weight_groups(&response, &thumbnails);
    let ocr = ocr_summary(response.ocr_text.as_deref(), response.cleaned_ocr_text.as_deref());

    tracing::info!("[{}] Rendering {} weight groups", request_id, groups.len());

    fragment(StatusCode::OK, html::automated_search(&upload, &response, ocr, &groups))
}

/// Text search panel
///
/// GET /console/search/text?query=nike&top_n=10
async fn search_text(
    state: web::Data<AppState>,
    params: web::Query<ConsoleParams>,
) -> impl Responder {
    let config = match configuration(&state, &params) {
        Ok(config) => config,
        Err(response) => return response,
    };
    let query = params.query.as_deref().unwrap_or("").trim();
    let request_id = Uuid::new_v4();

    tracing::info!("[{}] Text search: {:?}, top_n={}", request_id, query, config.result_count);

    let response = match state.api.search_text(&config, query).await {
        Ok(response) => response,
        Err(e) => return api_error("Text search", request_id, &e),
    };

    let thumbnails = state.thumbnails.fetch_all(&response.results).await;
    let rows = result_rows(&response.results, &thumbnails, ScoreSource::Text);

    tracing::info!("[{}] Rendering {} text search results", request_id, rows.len());

    fragment(StatusCode::OK, html::text_search(query, &response, &rows))
}

/// Vienna classification panel
async fn classify_vienna(
    state: web::Data<AppState>,
    params: web::Query<ConsoleParams>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let config = match configuration(&state, &params) {
        Ok(config) => config,
        Err(response) => return response,
    };
    let upload = upload_from(&req, body);
    let request_id = Uuid::new_v4();

    tracing::info!(
        "[{}] Vienna classification: {} bytes, threshold={}",
        request_id,
        upload.bytes.len(),
        config.vienna_threshold
    );

    let predictions = match state.api.classify_vienna(&config, &upload).await {
        Ok(predictions) => predictions,
        Err(e) => return api_error("Vienna classification", request_id, &e),
    };

    let export_link = match export::vienna_export_json(&predictions.raw) {
        Ok(json) => Some(html::ExportLink {
            href: export::json_download_href(&json),
            file_name: export::vienna_export_file_name(Utc::now()),
        }),
        Err(e) => {
            tracing::warn!("[{}] Vienna export unavailable: {}", request_id, e);
            None
        }
    };

    let rows = prediction_rows(&predictions.predictions);

    tracing::info!("[{}] Rendering {} Vienna predictions", request_id, rows.len());

    fragment(StatusCode::OK, html::vienna(&upload, &rows, export_link.as_ref()))
}

/// Sidebar health check of the search service
async fn probe_api(state: web::Data<AppState>) -> impl Responder {
    let status = state.api.health().await;

    tracing::info!("Search API health probe: healthy={}", status.is_healthy());

    fragment(StatusCode::OK, html::health(&status))
}

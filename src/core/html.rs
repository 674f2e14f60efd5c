//! HTML for the console page and the fragments its panels swap in.
//!
//! Every function here is pure: it takes parsed responses or view rows and
//! returns markup. Text that came from the user or the search service goes
//! through `encode_text`; attribute values through `encode_double_quoted_attribute`.

use crate::config::{IntegerControl, SearchSettings, WeightControl};
use crate::core::render::{GroupView, OcrSummary, PredictionRow, ResultRow};
use crate::models::{
    AutomatedSearchResponse, HealthStatus, ImageSearchResponse, ImageUpload, TextSearchResponse,
    Thumbnail,
};
use crate::services::ApiError;
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const PAGE_TITLE: &str = "Trademark Hybrid Search Tester";

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => encode_text(v).into_owned(),
        _ => "N/A".to_string(),
    }
}

fn caption(label: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => {
            format!("<p class=\"caption\">{}: {}</p>", label, encode_text(v))
        }
        _ => String::new(),
    }
}

fn format_weight(weight: f64) -> String {
    format!("{:.2}", weight)
}

fn success(message: &str) -> String {
    format!("<div class=\"alert success\">{}</div>", message)
}

fn info(message: &str) -> String {
    format!("<div class=\"alert info\">{}</div>", message)
}

fn query_image(upload: &ImageUpload) -> String {
    format!(
        "<figure class=\"query-image\"><img src=\"{}\" alt=\"Query Image\"><figcaption>Query Image</figcaption></figure>",
        encode_double_quoted_attribute(&upload.preview().data_uri())
    )
}

fn ocr_block(summary: Option<OcrSummary<'_>>) -> String {
    let Some(summary) = summary else {
        return String::new();
    };

    let mut out = info(&format!("<strong>OCR Text:</strong> {}", encode_text(summary.raw)));
    if let Some(cleaned) = summary.cleaned {
        out.push_str(&info(&format!("<strong>Cleaned:</strong> {}", encode_text(cleaned))));
    }
    out
}

fn thumbnail_cell(thumbnail: Option<&Thumbnail>) -> String {
    match thumbnail {
        Some(Thumbnail::Loaded(image)) => {
            format!(
                "<img class=\"thumbnail\" src=\"{}\" alt=\"Trademark image\">",
                encode_double_quoted_attribute(&image.data_uri())
            )
        }
        Some(Thumbnail::NotAvailable(_)) => {
            "<p class=\"placeholder\">Image not available</p>".to_string()
        }
        Some(Thumbnail::LoadFailed) => "<p class=\"placeholder\">Image load failed</p>".to_string(),
        Some(Thumbnail::Missing) | None => String::new(),
    }
}

/// One result card
pub fn result_card(row: &ResultRow<'_>) -> String {
    let result = row.result;
    let mut details = format!(
        "<strong class=\"app-number\">{}</strong>",
        or_na(result.application_number.as_deref())
    );

    if let Some(verbal) = result.verbal_element.as_deref() {
        details.push_str(&format!("<p class=\"caption verbal\">{}</p>", encode_text(verbal)));
    }
    details.push_str(&format!(
        "<p class=\"caption\">Class: {}</p>",
        or_na(result.class.as_deref())
    ));
    details.push_str(&caption("Type", result.trade_mark_type.as_deref()));
    details.push_str(&caption("Status", result.tmr_application_status.as_deref()));
    details.push_str(&caption("Filed", result.application_date.as_deref()));
    details.push_str(&caption("Registered", result.trade_mark_reg_date.as_deref()));

    let mut components = Vec::new();
    if let Some(semantic) = result.semantic_score_norm {
        components.push(format!("semantic {:.4}", semantic));
    }
    if let Some(text) = result.text_score_norm {
        components.push(format!("text {:.4}", text));
    }
    if !components.is_empty() {
        details.push_str(&format!("<p class=\"caption components\">{}</p>", components.join(" · ")));
    }

    format!(
        concat!(
            "<div class=\"result-card {class}\" data-rank=\"{rank}\">",
            "<div class=\"score\"><span class=\"metric-label\">Score</span>",
            "<span class=\"metric-value\">{score:.4}</span>",
            "<span class=\"badge {class}\">{label}</span></div>",
            "<div class=\"details\">{details}</div>",
            "<div class=\"thumb\">{thumb}</div>",
            "</div>"
        ),
        class = row.score_class.css_class(),
        rank = row.rank,
        score = row.score,
        label = row.score_class.as_str(),
        details = details,
        thumb = thumbnail_cell(row.thumbnail),
    )
}

fn result_list(rows: &[ResultRow<'_>]) -> String {
    let cards: String = rows.iter().map(result_card).collect();
    format!("<div class=\"results\">{}</div>", cards)
}

fn found(count: usize) -> String {
    success(&format!("Found {} results!", count))
}

/// Fragment for the image search panel
pub fn image_search(
    upload: &ImageUpload,
    response: &ImageSearchResponse,
    ocr: Option<OcrSummary<'_>>,
    rows: &[ResultRow<'_>],
) -> String {
    let mut out = query_image(upload);
    out.push_str(&found(response.results.len()));
    out.push_str(&ocr_block(ocr));
    if response.shape_focus_active == Some(true) {
        out.push_str(&info("Shape focus active"));
    }
    out.push_str(&result_list(rows));
    out
}

/// Fragment for the automated search panel: one `<details>` per weight
pub fn automated_search(
    upload: &ImageUpload,
    response: &AutomatedSearchResponse,
    ocr: Option<OcrSummary<'_>>,
    groups: &[GroupView<'_>],
) -> String {
    let mut out = query_image(upload);

    let weights = response
        .weights_searched
        .iter()
        .map(|w| format_weight(*w))
        .collect::<Vec<_>>()
        .join(", ");
    let mut summary = format!("Searched {} weights: {}", response.weights_searched.len(), weights);
    if let Some(gpus) = response.gpus_used {
        summary.push_str(&format!(" · GPUs used: {}", gpus));
    }
    if let Some(pool) = response.candidate_pool {
        summary.push_str(&format!(" · Candidate pool: {}", pool));
    }
    if let Some(top_n) = response.top_n {
        summary.push_str(&format!(" · Top N: {}", top_n));
    }
    out.push_str(&success(&summary));
    out.push_str(&ocr_block(ocr));

    for view in groups {
        let group = view.group;
        let shape = if group.shape_focus_active {
            " <span class=\"badge shape\">shape focus</span>"
        } else {
            ""
        };
        out.push_str(&format!(
            concat!(
                "<details class=\"weight-group\" data-weight=\"{weight}\"{open}>",
                "<summary>Semantic {weight} / Text {text} ({count} results){shape}</summary>",
                "{results}</details>"
            ),
            weight = format_weight(group.semantic_weight),
            text = format_weight(group.text_weight),
            open = if view.expanded { " open" } else { "" },
            count = group.results.len(),
            shape = shape,
            results = result_list(&view.rows),
        ));
    }
    out
}

/// Fragment for the text search panel
pub fn text_search(query: &str, response: &TextSearchResponse, rows: &[ResultRow<'_>]) -> String {
    let cleaned = response
        .cleaned_query
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .unwrap_or(query);

    let mut out = found(response.results.len());
    out.push_str(&info(&format!("<strong>Cleaned Query:</strong> {}", encode_text(cleaned))));
    out.push_str(&result_list(rows));
    out
}

/// Link that downloads the unmodified prediction list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLink {
    pub href: String,
    pub file_name: String,
}

/// Fragment for the Vienna panel: rows, a table view and the export link
pub fn vienna(upload: &ImageUpload, rows: &[PredictionRow<'_>], export: Option<&ExportLink>) -> String {
    let mut out = query_image(upload);

    if rows.is_empty() {
        out.push_str(&info("No Vienna classes above the threshold"));
    } else {
        out.push_str(&success(&format!("Predicted {} Vienna classes", rows.len())));
    }

    out.push_str("<div class=\"predictions\">");
    for row in rows {
        let p = row.prediction;
        out.push_str(&format!(
            concat!(
                "<div class=\"prediction {class}\">",
                "<strong>{code}</strong> <span class=\"caption\">{kind}</span>",
                "<p>{description}</p>",
                "<span class=\"badge {class}\">{probability:.1}%</span>",
                "</div>"
            ),
            class = row.score_class.css_class(),
            code = encode_text(&p.category_code),
            kind = encode_text(&p.category_type),
            description = encode_text(&p.description),
            probability = p.probability * 100.0,
        ));
    }
    out.push_str("</div>");

    out.push_str(
        "<table class=\"prediction-table\"><thead><tr><th>Code</th><th>Type</th><th>Description</th><th>Probability</th></tr></thead><tbody>",
    );
    for row in rows {
        let p = row.prediction;
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td></tr>",
            encode_text(&p.category_code),
            encode_text(&p.category_type),
            encode_text(&p.description),
            p.probability
        ));
    }
    out.push_str("</tbody></table>");

    if let Some(link) = export {
        out.push_str(&format!(
            "<a class=\"button download\" href=\"{}\" download=\"{}\">Download predictions (JSON)</a>",
            encode_double_quoted_attribute(&link.href),
            encode_double_quoted_attribute(&link.file_name)
        ));
    }
    out
}

/// Sidebar fragment for the health check button
pub fn health(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy(payload) => {
            let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            format!(
                "<div class=\"alert success\">✅ API Healthy!</div><pre class=\"json\">{}</pre>",
                encode_text(&pretty)
            )
        }
        HealthStatus::Unhealthy(_) => "<div class=\"alert error\">❌ API Unhealthy</div>".to_string(),
        HealthStatus::Unreachable(_) => {
            "<div class=\"alert error\">❌ Cannot connect to API</div>".to_string()
        }
    }
}

/// Inline error for the panel that triggered the request
pub fn error(err: &ApiError) -> String {
    match err {
        ApiError::EmptyUpload => {
            "<div class=\"alert warning\">Choose an image first.</div>".to_string()
        }
        ApiError::BlankQuery => {
            "<div class=\"alert warning\">Enter trademark text to search.</div>".to_string()
        }
        ApiError::InvalidUpload(_) => {
            "<div class=\"alert warning\">The uploaded file is not a usable image.</div>".to_string()
        }
        ApiError::Status { status, body } => format!(
            "<div class=\"alert error\">API Error: <span class=\"status\">{}</span> - <code class=\"body\">{}</code></div>",
            status,
            encode_text(body)
        ),
        ApiError::Connection(e) => format!(
            "<div class=\"alert error\">Connection error: {}</div>",
            encode_text(&e.to_string())
        ),
        ApiError::InvalidResponse(message) => {
            format!("<div class=\"alert error\">Error: {}</div>", encode_text(message))
        }
    }
}

/// Inline error for control values that failed validation
pub fn invalid_parameters(message: &str) -> String {
    format!("<div class=\"alert warning\">Invalid settings: {}</div>", encode_text(message))
}

fn integer_slider(id: &str, label: &str, control: &IntegerControl) -> String {
    format!(
        concat!(
            "<label for=\"{id}\">{label} <output id=\"{id}-value\">{default}</output></label>",
            "<input type=\"range\" id=\"{id}\" name=\"{id}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{default}\">"
        ),
        id = id,
        label = label,
        min = control.min,
        max = control.max,
        default = control.default,
    )
}

fn weight_slider(id: &str, label: &str, control: &WeightControl) -> String {
    format!(
        concat!(
            "<label for=\"{id}\">{label} <output id=\"{id}-value\">{default}</output></label>",
            "<input type=\"range\" id=\"{id}\" name=\"{id}\" min=\"0\" max=\"1\" step=\"{step}\" value=\"{default}\">"
        ),
        id = id,
        label = label,
        step = control.step,
        default = control.default,
    )
}

fn upload_panel(id: &str, title: &str, button: &str, active: bool) -> String {
    format!(
        concat!(
            "<section class=\"panel{active}\" id=\"panel-{id}\"><h2>{title}</h2>",
            "<input type=\"file\" id=\"{id}-file\" accept=\".png,.jpg,.jpeg,image/png,image/jpeg\">",
            "<button class=\"primary\" data-upload=\"{id}\">{button}</button>",
            "<div class=\"output\" id=\"{id}-output\"></div></section>"
        ),
        active = if active { " active" } else { "" },
        id = id,
        title = title,
        button = button,
    )
}

/// The full console page
pub fn page(search: &SearchSettings) -> String {
    let sidebar = [
        "<h2>⚙️ Search Settings</h2>".to_string(),
        weight_slider("semantic_weight", "Semantic Weight (Image Similarity)", &search.semantic_weight),
        "<p class=\"help\">0.0 = Text only, 1.0 = Image only</p>".to_string(),
        integer_slider("top_n", "Top N Results", &search.top_n),
        format!(
            "<label><input type=\"checkbox\" id=\"use_ocr\"{}> Use OCR (for image search)</label>",
            if search.use_ocr { " checked" } else { "" }
        ),
        integer_slider("candidate_pool", "Candidate Pool", &search.candidate_pool),
        weight_slider("vienna_threshold", "Vienna Threshold", &search.vienna_threshold),
        "<button id=\"health-button\">🩺 Check API Health</button><div id=\"health-output\"></div>".to_string(),
    ]
    .concat();

    let panels = [
        upload_panel("image", "Image Search", "🔍 Search Similar Trademarks", true),
        upload_panel("automated", "Automated Search", "🔍 Search All Weights", false),
        concat!(
            "<section class=\"panel\" id=\"panel-text\"><h2>Text Search</h2>",
            "<input type=\"text\" id=\"text-query\" placeholder=\"e.g., Nike swoosh, Apple logo, etc.\">",
            "<button class=\"primary\" id=\"text-button\">🔍 Search by Text</button>",
            "<div class=\"output\" id=\"text-output\"></div></section>"
        )
        .to_string(),
        upload_panel("vienna", "Vienna Classification", "🏷️ Classify", false),
    ]
    .concat();

    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<title>{title}</title><style>{style}</style></head><body>",
            "<aside class=\"sidebar\">{sidebar}</aside>",
            "<main><h1>🔍 Trademark Hybrid Search V2 Tester</h1>",
            "<p>Upload an image or enter text to search trademarks using CLIP + TF-IDF</p>",
            "<nav class=\"tabs\">",
            "<button data-tab=\"image\" class=\"active\">🖼️ Image Search</button>",
            "<button data-tab=\"automated\">🤖 Automated Search</button>",
            "<button data-tab=\"text\">📝 Text Search</button>",
            "<button data-tab=\"vienna\">🏷️ Vienna Classes</button>",
            "</nav>{panels}<hr></main><script>{script}</script></body></html>"
        ),
        title = PAGE_TITLE,
        style = STYLE,
        sidebar = sidebar,
        panels = panels,
        script = SCRIPT,
    )
}

const STYLE: &str = r#"
body{font-family:sans-serif;margin:0;display:flex}
.sidebar{width:18rem;padding:1rem;background:#f0f2f6;min-height:100vh}
.sidebar label{display:block;margin-top:.75rem}
.sidebar input[type=range]{width:100%}
main{flex:1;padding:1rem 2rem}
.panel{display:none}.panel.active{display:block}
.tabs button.active{border-bottom:2px solid #ff4b4b}
.alert{padding:.5rem 1rem;margin:.5rem 0;border-radius:.25rem}
.alert.success{background:#e6f4ea}.alert.info{background:#e8f0fe}
.alert.warning{background:#fff4e5}.alert.error{background:#fde8e8}
.result-card{display:grid;grid-template-columns:1fr 3fr 1fr;gap:1rem;border-bottom:1px solid #ddd;padding:.5rem 0}
.metric-value{display:block;font-size:1.5rem}
.badge{padding:0 .4rem;border-radius:.25rem;font-size:.8rem}
.score-high{--accent:#1e8e3e}.score-medium{--accent:#f9ab00}.score-low{--accent:#d93025}
.badge.score-high,.badge.score-medium,.badge.score-low{background:var(--accent);color:#fff}
.caption{color:#666;margin:.1rem 0}
.thumbnail,.query-image img{max-width:100%}
.query-image{max-width:12rem}
.placeholder{color:#d93025}
table{border-collapse:collapse}td,th{border:1px solid #ddd;padding:.25rem .5rem}
"#;

const SCRIPT: &str = r#"
const $ = (id) => document.getElementById(id);
for (const id of ['semantic_weight', 'top_n', 'candidate_pool', 'vienna_threshold']) {
  $(id).addEventListener('input', () => { $(id + '-value').textContent = $(id).value; });
}
function settings(extra) {
  const p = new URLSearchParams({
    semantic_weight: $('semantic_weight').value,
    top_n: $('top_n').value,
    candidate_pool: $('candidate_pool').value,
    vienna_threshold: $('vienna_threshold').value,
    use_ocr: $('use_ocr').checked,
  });
  for (const [k, v] of Object.entries(extra || {})) p.set(k, v);
  return p.toString();
}
async function show(out, request) {
  out.innerHTML = '<p class="spinner">Searching...</p>';
  try {
    const response = await request;
    out.innerHTML = await response.text();
  } catch (e) {
    out.innerHTML = '<div class="alert error">Connection error: ' + e + '</div>';
  }
}
const uploadPaths = {
  image: '/console/search/image',
  automated: '/console/search/automated',
  vienna: '/console/vienna',
};
document.querySelectorAll('[data-upload]').forEach((button) => {
  button.addEventListener('click', () => {
    const panel = button.dataset.upload;
    const input = $(panel + '-file');
    const out = $(panel + '-output');
    if (!input.files.length) {
      out.innerHTML = '<div class="alert warning">Choose an image first.</div>';
      return;
    }
    const file = input.files[0];
    show(out, fetch(uploadPaths[panel] + '?' + settings(), {
      method: 'POST',
      headers: { 'Content-Type': file.type || 'application/octet-stream', 'X-File-Name': file.name },
      body: file,
    }));
  });
});
$('text-button').addEventListener('click', () => {
  const query = $('text-query').value;
  if (!query.trim()) return;
  show($('text-output'), fetch('/console/search/text?' + settings({ query: query.trim() })));
});
$('health-button').addEventListener('click', () => {
  show($('health-output'), fetch('/console/health'));
});
document.querySelectorAll('[data-tab]').forEach((tab) => {
  tab.addEventListener('click', () => {
    document.querySelectorAll('[data-tab]').forEach((t) => t.classList.toggle('active', t === tab));
    document.querySelectorAll('.panel').forEach((p) => p.classList.toggle('active', p.id === 'panel-' + tab.dataset.tab));
  });
});
"#;

// Console core exports
pub mod controls;
pub mod export;
pub mod html;
pub mod render;
pub mod scoring;

pub use controls::resolve_configuration;
pub use render::{result_rows, weight_groups, prediction_rows, ocr_summary, ResultRow, GroupView, ScoreSource};
pub use scoring::{classify_score, ScoreClass};

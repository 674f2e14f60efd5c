// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    image_media_type,
    AutomatedSearchResponse, EmbeddedImage, HealthStatus, ImageSearchResponse, ImageUpload,
    SearchConfiguration, SearchResult, TextSearchResponse, Thumbnail, ViennaClassification,
    ViennaPredictions, WeightedResultGroup,
};
pub use requests::ConsoleParams;
pub use responses::HealthResponse;

// Service exports
pub mod search_api;
pub mod thumbnails;

pub use search_api::{ApiError, ApiTimeouts, SearchApiClient};
pub use thumbnails::{ThumbnailError, ThumbnailFetcher};

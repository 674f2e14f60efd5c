//! Trademark Search Console - browser console for the trademark search API
//!
//! This library hosts the dashboard used to exercise the remote trademark
//! hybrid search and Vienna classification service: it turns control values
//! and uploads into API calls and renders the responses as HTML.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{classify_score, ScoreClass};
pub use models::{SearchConfiguration, SearchResult, ViennaClassification, WeightedResultGroup};
pub use services::{ApiError, SearchApiClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(classify_score(0.7), ScoreClass::High);
    }
}

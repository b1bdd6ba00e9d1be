use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad error category used for user-facing handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GalleryErrorCategory {
    /// Invalid input such as page 0 or an unknown selection target.
    Config,
    /// Feed transport, status, or body failure.
    Network,
}

/// Stable gallery error payload emitted across the command/event boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{category:?}:{code}: {message}")]
pub struct GalleryError {
    /// High-level error category.
    pub category: GalleryErrorCategory,
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl GalleryError {
    /// Construct a new gallery error.
    pub fn new(
        category: GalleryErrorCategory,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build a feed failure. Every feed failure is a network error to callers.
    pub fn network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(GalleryErrorCategory::Network, code, message)
    }

    /// Build a standard invalid-page-request error.
    pub fn invalid_page(page_num: u32, page_size: u32) -> Self {
        Self::new(
            GalleryErrorCategory::Config,
            "invalid_page_request",
            format!("page {page_num} with size {page_size} is not addressable"),
        )
    }

    /// Whether this error came from the remote feed.
    pub fn is_network(&self) -> bool {
        self.category == GalleryErrorCategory::Network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_invalid_page_error_code_stable() {
        let err = GalleryError::invalid_page(0, 12);
        assert_eq!(err.code, "invalid_page_request");
        assert_eq!(err.category, GalleryErrorCategory::Config);
        assert!(!err.is_network());
    }

    #[test]
    fn display_includes_category_and_code() {
        let err = GalleryError::network("feed_transport_error", "connection reset");
        assert_eq!(
            err.to_string(),
            "Network:feed_transport_error: connection reset"
        );
    }
}

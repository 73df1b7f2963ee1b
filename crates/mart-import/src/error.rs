//! Importer errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Only http and https URLs can be imported")]
    UnsupportedScheme,

    #[error("Could not reach the page: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Page responded with HTTP {0}")]
    Status(u16),

    #[error("Expected an HTML page, got '{0}'")]
    NotHtml(String),

    #[error("Page exceeds the {0} byte limit")]
    TooLarge(usize),
}

impl ImportError {
    /// Caller supplied a bad URL, as opposed to the remote side failing
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::UnsupportedScheme)
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The API answered with a non-success status.
    #[error("request failed with HTTP {status}: {}", shared::error::summarize_error_body(body))]
    RequestFailed { status: u16, body: String },
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    /// Unexpected body shape. Listing reads recover from this locally.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// A newer catalog request was issued while this one was in flight.
    #[error("catalog response {ticket} superseded by request {latest}")]
    Superseded { ticket: u64, latest: u64 },
}

impl CatalogError {
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::RequestFailed { status, .. } => Some(*status),
            CatalogError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, CatalogError::Superseded { .. })
    }
}

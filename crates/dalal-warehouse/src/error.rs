use dalal_util::SessionError;
use reqwest::StatusCode;

/// Why a live fetch could not produce data; always recovered by serving a fallback.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("context acquisition failed: {0}")]
    ContextAcquisition(#[from] SessionError),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot build a request URL from {url}")]
    InvalidUrl { url: String },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },

    #[error("undecodable JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered, but nothing usable survived unwrapping and filtering.
    #[error("no usable records: {0}")]
    Empty(String),
}

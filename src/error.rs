//! Error type shared by the fetcher, formatter and host

use thiserror::Error;

/// Errors raised while fetching or formatting content
#[derive(Error, Debug)]
pub enum Error {
    /// The content repository could not be reached
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The content repository answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// A cursor pointing outside the configured repository
    #[error("Refusing to follow cursor outside of {endpoint}")]
    ForeignCursor { endpoint: String },

    /// The response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    /// A post without a publication date reached the formatter
    #[error("Post {id} has no publication date")]
    NullDate { id: String },

    #[error("Post {id} has an unparseable publication date {value:?}")]
    InvalidDate { id: String, value: String },

    #[error("Unknown locale: {0}")]
    UnknownLocale(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure happened while talking to the repository
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Status { .. } | Error::ForeignCursor { .. }
        )
    }
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

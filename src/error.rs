//! Error types for blockpage.
//!
//! Nothing here is fatal to an editing session. Callers in the store and the
//! content loader catch these, log them, and fall back to a defined value.

use thiserror::Error;

/// The crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure (storage directory, media file, export target).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input was not syntactically valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure while fetching remote content.
    #[error("network error: {0}")]
    Network(String),

    /// The remote server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A dotted document path or block field that the model does not know.
    #[error("unknown field path '{path}'")]
    UnknownField {
        /// The rejected path
        path: String,
    },

    /// A block index outside the current section.
    #[error("block index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of blocks in the section
        len: usize,
    },

    /// A block type tag outside the closed set of variants.
    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    /// The storage backend refused a read or write.
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message_includes_url_and_code() {
        let err = Error::HttpStatus {
            url: "https://example.org/data/content.json".to_string(),
            status: 404,
        };
        let message = err.to_string();
        assert!(message.contains("example.org/data/content.json"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_json_errors_convert_with_question_mark() {
        fn parse(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }
        assert!(matches!(parse("{not json"), Err(Error::Json(_))));
    }
}

//! Domain-level error types for whatsapp-export.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Source export file could not be parsed as JSON.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Source backup file could not be parsed as XML.
    #[error("XML parse error: {message}")]
    XmlParse {
        message: String,
        #[source]
        source: Option<roxmltree::Error>,
    },

    /// Structurally valid input carrying unusable values.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// No sender could be determined for a message.
    #[error("No sender found for message at {timestamp_millis}")]
    NoSender { timestamp_millis: i64 },

    /// A media name that does not follow the expected naming scheme.
    #[error("Unrecognized media name: {name}")]
    MediaName { name: String },

    /// Downloading an attachment failed.
    #[error("Download failed for {url}: {message}")]
    Download {
        url: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an XML parse error.
    pub fn xml_parse(err: roxmltree::Error) -> Self {
        Self::XmlParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an invalid-data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a download error with the failing URL.
    pub fn download(url: impl Into<String>, err: reqwest::Error) -> Self {
        Self::Download {
            url: url.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

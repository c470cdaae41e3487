//! Error types for VideoAlpha Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid attribute `{attribute}`: {message}")]
    InvalidAttribute { attribute: String, message: String },

    #[error("Invalid stream entry: {0}")]
    InvalidStreamEntry(String),

    #[error("Invalid speed label: {0}")]
    InvalidSpeed(String),

    #[error("Unknown player mode: {0}")]
    UnknownPlayerMode(String),

    #[error("Unknown playback quality: {0}")]
    UnknownQuality(String),

    #[error("Unknown visibility state: {0}")]
    UnknownVisibility(String),

    // Metadata errors
    #[cfg(feature = "youtube")]
    #[error("Failed to fetch metadata for {id}")]
    MetadataFetch { id: String, source: reqwest::Error },

    #[error("Failed to decode metadata for {id}: {message}")]
    MetadataDecode { id: String, message: String },

    #[cfg(feature = "youtube")]
    #[error("Invalid metadata endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[cfg(feature = "youtube")]
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("No async runtime to run metadata lookups on")]
    NoRuntime,

    // Backend errors
    #[error("Playback backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Playback backend rejected embed: {0}")]
    BackendEmbed(String),

    // Preference errors
    #[error("Failed to parse preference store: {0}")]
    PreferenceParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an attribute error
    pub fn attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            #[cfg(feature = "youtube")]
            Error::MetadataFetch { .. } => true,
            Error::BackendUnavailable(_) | Error::NoRuntime | Error::Io(_) => true,
            _ => false,
        }
    }

    /// Returns the error code used in log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidAttribute { .. } => "INVALID_ATTRIBUTE",
            Error::InvalidStreamEntry(_) => "INVALID_STREAM",
            Error::InvalidSpeed(_) => "INVALID_SPEED",
            Error::UnknownPlayerMode(_) => "UNKNOWN_MODE",
            Error::UnknownQuality(_) => "UNKNOWN_QUALITY",
            Error::UnknownVisibility(_) => "UNKNOWN_VISIBILITY",
            #[cfg(feature = "youtube")]
            Error::MetadataFetch { .. } => "METADATA_FETCH",
            Error::MetadataDecode { .. } => "METADATA_DECODE",
            #[cfg(feature = "youtube")]
            Error::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            #[cfg(feature = "youtube")]
            Error::HttpClient(_) => "HTTP_CLIENT",
            Error::NoRuntime => "NO_RUNTIME",
            Error::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            Error::BackendEmbed(_) => "BACKEND_EMBED",
            Error::PreferenceParse(_) => "PREFERENCE_PARSE",
            Error::Io(_) => "IO",
        }
    }
}

//! Error handling for trackscan
//!
//! Both tools collapse every failure into exit code 1; the error kind only
//! decides which line ends up on stderr.

use thiserror::Error;

/// Result type alias for trackscan operations
pub type Result<T> = std::result::Result<T, TrackscanError>;

/// Main error type for trackscan operations
#[derive(Error, Debug)]
pub enum TrackscanError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Analysis Errors
    #[error("Analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    // Configuration Errors
    #[error("{var} environment variable not set")]
    MissingCredential { var: &'static str },

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    // Lyrics Errors
    #[error("Genius lyrics support not available: {reason}")]
    LyricsUnavailable { reason: String },

    #[error("No lyrics found for '{title}' by '{artist}'")]
    LyricsNotFound { artist: String, title: String },

    #[error("HTTP request failed: {message}")]
    Http { message: String },

    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrackscanError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TrackscanError::FileNotFound { .. } => "FILE_NOT_FOUND",
            TrackscanError::InvalidAudio { .. } => "INVALID_AUDIO",
            TrackscanError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            TrackscanError::EmptyAudio => "EMPTY_AUDIO",
            TrackscanError::AnalysisFailed { .. } => "ANALYSIS_FAILED",
            TrackscanError::MissingCredential { .. } => "MISSING_CREDENTIAL",
            TrackscanError::InvalidConfig { .. } => "INVALID_CONFIG",
            TrackscanError::LyricsUnavailable { .. } => "LYRICS_UNAVAILABLE",
            TrackscanError::LyricsNotFound { .. } => "LYRICS_NOT_FOUND",
            TrackscanError::Http { .. } => "HTTP_ERROR",
            TrackscanError::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            TrackscanError::Io(_) => "IO_ERROR",
            TrackscanError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this is the expected negative result of a lyrics lookup
    /// rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackscanError::LyricsNotFound { .. })
    }

    /// The line printed on stderr before exiting with code 1.
    pub fn report_line(&self) -> String {
        match self {
            TrackscanError::LyricsNotFound { .. } => self.to_string(),
            _ => format!("Error: {}", self),
        }
    }
}

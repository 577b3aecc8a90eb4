use thiserror::Error;

/// Centralized error types for the application
///
/// All errors in the application are converted to this enum for consistent error handling.
/// Uses `thiserror` for automatic error conversion and display formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input validation errors (missing URL, bad format value) — never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// yt-dlp extraction errors; message text feeds the retry classifier
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// DRM/protected content — non-retryable, user-actionable
    #[error("This video is DRM-protected and cannot be downloaded. Try another video.")]
    DrmProtected,

    /// Two independent clients hit the same site-wide block signature
    #[error(
        "The source site is blocking downloads from this network. \
         Possible causes: bot detection, a blocked IP, or expired cookies. \
         Try refreshing the cookies or downloading from a different network."
    )]
    SystemicBlock,

    /// Downloaded file exceeds the configured maximum size
    #[error("The file is too large ({0} bytes)")]
    FileTooLarge(u64),

    /// Requested artifact is not in the store
    #[error("File not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed JSON from yt-dlp metadata probes
    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to convert String to AppError::Extraction
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Extraction(err)
    }
}

/// Helper function to convert &str to AppError::Extraction
impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Extraction(err.to_string())
    }
}

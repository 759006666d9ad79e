use thiserror::Error;

/// Errors produced while turning an input source into plain text
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("fetch failed: {message}")]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    #[error("not a recognized video link: {0}")]
    InvalidLink(String),

    #[error("no transcript available for video {0}")]
    NoTranscript(String),
}

impl ExtractError {
    /// Fetch error for a non-success HTTP status
    pub fn http_status(status: u16, url: &str) -> Self {
        Self::Fetch {
            status: Some(status),
            message: format!("HTTP {} fetching {}", status, url),
        }
    }

    /// Fetch error for a transport-level failure
    pub fn transport(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            status: None,
            message: format!("request to {} failed: {}", url, err),
        }
    }
}

/// Errors produced by the conversation client
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("no API key configured: set GEMINI_API_KEY or add [gemini].api_key to settings.toml")]
    MissingCredential,

    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("response contained no candidate text")]
    NoCandidate,

    #[error("failed to parse response: {0}")]
    InvalidResponse(String),
}

/// Errors produced by the session state machine
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no content loaded yet: load a document, page or video first")]
    NoContext,

    #[error("extracted text was empty")]
    EmptyExtraction,
}

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, Error>;

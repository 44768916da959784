use thiserror::Error;

/// Tagged error taxonomy. Each variant carries exactly the fields callers
/// need to react to it — no shared base class, no downcasting.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no scraper strategy registered for `{url}`")]
    NoStrategy { url: String },

    #[error("fetch failed for `{url}` ({status:?}): {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    #[error("redirect blocked: {original_url} -> {redirect_url} ({status_code})")]
    Redirect {
        original_url: String,
        redirect_url: String,
        status_code: u16,
    },

    #[error("processing error on `{source}`: {message}")]
    Processing { source: String, message: String },

    #[error("chunk cannot fit within max_chunk_size={max}: {detail}")]
    MinimumChunkSize { max: usize, detail: String },

    #[error("embedding dimension {actual} exceeds store dimension {expected} and truncation is not allowed")]
    Dimension { expected: usize, actual: usize },

    #[error("library `{library}` not found; did you mean one of: {suggestions:?}")]
    LibraryNotFound {
        library: String,
        suggestions: Vec<String>,
    },

    #[error("version `{requested}` not found for `{library}`; available: {available:?}")]
    VersionNotFound {
        library: String,
        requested: String,
        available: Vec<String>,
    },

    #[error("job {job_id} cancelled")]
    Cancellation { job_id: String },

    #[error("store error: {0}")]
    Store(String),
}

impl IndexerError {
    pub fn retryable(&self) -> bool {
        matches!(self, IndexerError::Fetch { retryable: true, .. })
    }
}

impl From<rusqlite::Error> for IndexerError {
    fn from(e: rusqlite::Error) -> Self {
        IndexerError::Store(e.to_string())
    }
}

impl From<url::ParseError> for IndexerError {
    fn from(e: url::ParseError) -> Self {
        IndexerError::InvalidUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexerError>;

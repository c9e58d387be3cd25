use thiserror::Error;

/// Every failure a translation call or the pipe loop can surface.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// `error.code == -32600`, message taken from `error.data.what`
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// One of the service-specific numeric error codes, message from `error.message`
    #[error("service error {code}: {message}")]
    Service { code: i64, message: String },

    #[error("too many requests: {0}")]
    TooManyRequests(String),

    #[error("failed to decompress {encoding} body: {source}")]
    Decompress {
        encoding: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;

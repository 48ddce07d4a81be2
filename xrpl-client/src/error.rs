use thiserror::Error;

#[derive(Error, Debug)]
pub enum XrplClientError {
    #[error("transport error after exhausting retries: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("rippled returned HTTP {status}, not retryable")]
    HttpStatus { status: u16 },

    #[error("rippled json-rpc error: {0}")]
    RpcError(String),

    #[error("malformed rippled response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("submit rejected with engine result {code}: {message}")]
    SubmitRejected { code: String, message: String },

    #[error("binary codec error: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, XrplClientError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validity lookup returned status {0}")]
    Status(u16),

    #[error("Malformed validity response: {0}")]
    Malformed(String),

    #[error("Validity lookup timed out after {0} seconds")]
    Timeout(u64),

    #[error("Validity oracle unavailable: {0}")]
    Unavailable(String),
}

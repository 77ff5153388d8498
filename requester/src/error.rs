use thiserror::Error;

pub const FALLBACK_ERROR_BODY: &str = "error communicating with the service";

#[derive(Debug, Error)]
pub enum RequesterError {
    #[error("http transport error: {0}")]
    Transport(String),
    #[error("service responded with status `{status}`: {body}")]
    Status { status: u16, body: String },
    #[error("could not marshall/unmarshall given argument: {0}")]
    Json(String),
    #[error("service responded without a body where one was expected")]
    EmptyBody,
    #[error("could not build valid URL from given argument: {0}")]
    InvalidUrl(String),
}

impl RequesterError {
    /// Builds the error for a non-success response. An empty body is replaced
    /// by a generic detail so the message is never blank.
    pub fn status(status: u16, body: String) -> Self {
        let body = if body.trim().is_empty() {
            FALLBACK_ERROR_BODY.to_string()
        } else {
            body
        };
        Self::Status { status, body }
    }
}

impl From<reqwest::Error> for RequesterError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for RequesterError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value.to_string())
    }
}

impl From<url::ParseError> for RequesterError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}

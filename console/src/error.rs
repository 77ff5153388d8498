use requester::error::RequesterError;
use thiserror::Error;

/// Failure of one catalog population attempt. Cloned to every caller that
/// was waiting on that attempt.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogFetchError {
    #[error("city catalog request failed: {0}")]
    Request(String),
    #[error("city catalog payload is malformed: {0}")]
    Malformed(String),
}

impl From<RequesterError> for CatalogFetchError {
    fn from(value: RequesterError) -> Self {
        match value {
            RequesterError::Json(e) => Self::Malformed(e),
            other => Self::Request(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("at least one image url is required")]
    MissingImage,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("cities unavailable: {0}")]
    LookupDisplay(#[from] CatalogFetchError),
    #[error("property list fetch failed: {0}")]
    ListFetch(RequesterError),
    #[error("property mutation failed: {0}")]
    Mutation(RequesterError),
    #[error("property form is invalid: {0}")]
    Form(#[from] FormError),
}

impl ConsoleError {
    /// Short message meant for the operator, without transport details.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::LookupDisplay(_) => "cities unavailable",
            Self::ListFetch(_) => "could not load properties",
            Self::Mutation(_) => "could not save the property",
            Self::Form(FormError::MissingImage) => "add at least one image of the property",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_are_malformed_payloads() {
        let err: CatalogFetchError = RequesterError::Json("expected value".into()).into();
        assert_eq!(err, CatalogFetchError::Malformed("expected value".into()));

        let err: CatalogFetchError = RequesterError::status(502, String::new()).into();
        assert!(matches!(err, CatalogFetchError::Request(_)));
    }

    #[test]
    fn test_user_messages_hide_details() {
        let err = ConsoleError::ListFetch(RequesterError::Transport("connection refused".into()));
        assert_eq!(err.user_message(), "could not load properties");
        assert!(err.to_string().contains("connection refused"));
    }
}

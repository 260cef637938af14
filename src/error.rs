//! Error type shared by every fallible operation in the crate

use thiserror::Error;

/// Errors raised while building programs, parsing input, or persisting
/// programs. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    /// A selector string could not be compiled
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The input cannot be tokenized at all
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A saved program could not be encoded or decoded
    #[error("program persistence failed: {0}")]
    Persist(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Error::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::invalid_selector("div > p", "combinators are not supported");
        assert_eq!(
            err.to_string(),
            "invalid selector \"div > p\": combinators are not supported"
        );
        assert_eq!(
            Error::MalformedInput("empty input".into()).to_string(),
            "malformed input: empty input"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Persist(_)));
    }
}

//! Error types used across the crate.
//!
//! Internally everything is an `anyhow::Error`. When an error crosses the public command
//! boundary it is classified with an `ErrorType` using `IntoResult::pub_result`, so that callers
//! can tell a rejected input apart from a broken data directory.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad class of a public error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or its `config.json` is missing or invalid.
    Config,
    /// The user's input was rejected before anything was changed.
    Validation,
    /// Reading or writing one of the data files failed.
    Storage,
    /// The request could not be carried out against the current data.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that has been classified with an `ErrorType`.
#[derive(Debug)]
pub struct PubError {
    error_type: ErrorType,
    source: Error,
}

impl PubError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for PubError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:#}", self.error_type, self.source)
    }
}

impl std::error::Error for PubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Converts any result into a crate `Result` whose error carries an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let source: Error = e.into();
            // An error is only ever classified once, by the innermost caller.
            if source.is::<PubError>() {
                source
            } else {
                Error::new(PubError { error_type, source })
            }
        })
    }
}

/// Returns the `ErrorType` of `e` if it has been classified.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<PubError>().map(PubError::error_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_classifies() {
        let r: std::result::Result<(), Error> = Err(anyhow!("Amount must be greater than zero"));
        let e = r.pub_result(ErrorType::Validation).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(e.to_string().contains("validation error"));
        assert!(e.to_string().contains("Amount must be greater than zero"));
    }

    #[test]
    fn test_pub_result_keeps_first_classification() {
        let r: std::result::Result<(), Error> = Err(anyhow!("bad"));
        let e = r
            .pub_result(ErrorType::Validation)
            .pub_result(ErrorType::Storage)
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }

    #[test]
    fn test_unclassified() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }
}

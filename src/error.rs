//! Error types for the public API.
//!
//! Internally the crate uses `anyhow` through the `Res<T>` alias so that context can be attached
//! freely with `Context`. At command boundaries errors are converted into the public `Error` type,
//! which classifies the failure with an `ErrorType`, using `IntoResult::pub_result`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The result type used inside the crate.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The result type returned by public functions.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an error, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration file or home directory is missing or invalid.
    Config,
    /// Fetching records from the backend failed.
    Request,
    /// Reading or writing local files failed.
    Filesystem,
    /// The user asked for something that does not exist or cannot be done.
    Input,
    /// Something went wrong that is not the user's fault.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// What kind of error this is.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // The alternate form prints the whole context chain.
        write!(f, "{} error: {:#}", self.error_type, self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ error_type: {:?}, inner: {:?} }}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = &*self.inner;
        Some(source)
    }
}

/// Converts internal results into public results.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

//! The public error type. Internally the crate uses `anyhow` for plumbing and context; at the
//! boundaries those errors are tagged with an `ErrorType` so that callers (the controllers, the
//! CLI) can react to the kind of failure without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type used for plumbing before errors are classified.
pub(crate) type Res<T> = std::result::Result<T, anyhow::Error>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an `Error` so that callers can decide how to recover.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// A bad or missing field. Recoverable by correcting the input; never sent to the network.
    Validation,
    /// The target record no longer exists on the server.
    NotFound,
    /// The request did not reach the server or the response could not be read.
    Network,
    /// The server failed while handling the request.
    Server,
    /// There is no logged-in user.
    Session,
    /// The configuration directory or file is missing or invalid.
    Config,
    /// A mutation for the same form or record is still in flight.
    Pending,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type: an `anyhow::Error` carrying its `ErrorType`.
pub struct Error {
    kind: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(kind: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            inner: inner.into(),
        }
    }

    /// Create an error from a plain message.
    pub fn msg<M>(kind: ErrorType, message: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Self::new(kind, anyhow::Error::msg(message))
    }

    pub fn kind(&self) -> ErrorType {
        self.kind
    }

    /// Network and server failures are transient: retrying the same action may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorType::Network | ErrorType::Server)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.kind, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Tags an internal result with an `ErrorType`, converting it into the public `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, kind: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, kind: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(kind, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let res: Res<()> = Err(anyhow::anyhow!("connection refused")).context("Unable to list");
        let err = res.pub_result(ErrorType::Network).unwrap_err();
        assert_eq!(err.kind(), ErrorType::Network);
        let message = err.to_string();
        assert!(message.contains("Unable to list"), "{message}");
        assert!(message.contains("connection refused"), "{message}");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::NotFound.to_string(), "not_found");
        assert_eq!(ErrorType::Validation.to_string(), "validation");
    }

    #[test]
    fn test_transient() {
        assert!(Error::msg(ErrorType::Server, "boom").is_transient());
        assert!(Error::msg(ErrorType::Network, "down").is_transient());
        assert!(!Error::msg(ErrorType::NotFound, "gone").is_transient());
    }
}

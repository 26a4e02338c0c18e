//! Domain-level error type.
//!
//! Errors are transport agnostic. Record-service and lookup failures are
//! mapped onto a stable [`ErrorCode`] once, at the port boundary, so the
//! components reporting outcomes through notices only deal with this type.

use std::fmt;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Input failed local validation; nothing was sent to a remote service.
    InvalidRequest,
    /// The addressed record does not exist.
    NotFound,
    /// The record service refused the mutation (duplicate association,
    /// duplicate tax id, stale entity).
    Conflict,
    /// A remote service could not be reached or answered with a failure.
    ServiceUnavailable,
    /// An unexpected internal failure.
    InternalError,
}

impl ErrorCode {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::NotFound => "record not found",
            Self::Conflict => "request conflicts with the current record state",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// Domain error carrying a code and a human-readable message.
///
/// ## Invariants
/// - `message` is never blank; a blank message is replaced by a generic
///   message for the code.
///
/// # Examples
/// ```
/// use registry_client::domain::{Error, ErrorCode};
///
/// let err = Error::conflict("counterparty already linked");
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(err.message(), "counterparty already linked");
///
/// let blank = Error::not_found("   ");
/// assert_eq!(blank.message(), "record not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, "invalid request")]
    #[case(ErrorCode::NotFound, "record not found")]
    #[case(ErrorCode::ServiceUnavailable, "service unavailable")]
    fn blank_messages_fall_back_to_code_message(#[case] code: ErrorCode, #[case] expected: &str) {
        let err = Error::new(code, "");
        assert_eq!(err.message(), expected);
        assert_eq!(err.code(), code);
    }

    #[test]
    fn display_renders_message_only() {
        let err = Error::internal("snapshot lock poisoned");
        assert_eq!(err.to_string(), "snapshot lock poisoned");
    }
}

//! Error contract shared by the organization and counterparty record ports.

use super::define_port_error;
use crate::domain::{Error, ErrorCode};

define_port_error! {
    /// Errors surfaced by the remote record service.
    pub enum RecordServiceError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "record service transport failed: {message}",
        /// The addressed record or association does not exist.
        NotFound { message: String } => "{message}",
        /// The service refused the mutation because of existing state.
        Conflict { message: String } => "{message}",
        /// Any other non-success answer.
        Rejected { status: u16, message: String } =>
            "record service rejected the request with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "record service response decode failed: {message}",
    }
}

impl RecordServiceError {
    /// Message written by the record service itself, when it sent one.
    ///
    /// Transport and decode failures never carry a server message.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            Self::NotFound { message } | Self::Conflict { message } => message,
            Self::Rejected { message, .. } => message,
            Self::Transport { .. } | Self::Decode { .. } => return None,
        };
        let trimmed = message.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Stable domain code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Rejected { status, .. } if (400..500).contains(status) => {
                ErrorCode::InvalidRequest
            }
            Self::Rejected { .. } | Self::Transport { .. } => ErrorCode::ServiceUnavailable,
            Self::Decode { .. } => ErrorCode::InternalError,
        }
    }

    /// Convert into a domain error, preferring the server's own message and
    /// using `fallback` otherwise.
    pub fn to_domain(&self, fallback: &str) -> Error {
        let message = self.server_message().unwrap_or(fallback);
        Error::new(self.code(), message)
    }
}

impl From<RecordServiceError> for Error {
    fn from(value: RecordServiceError) -> Self {
        value.to_domain("")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for record-service error mapping.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RecordServiceError::conflict("Fornecedor já vinculado"), ErrorCode::Conflict)]
    #[case(RecordServiceError::not_found("Empresa não encontrada"), ErrorCode::NotFound)]
    #[case(RecordServiceError::rejected(400_u16, "CNPJ inválido"), ErrorCode::InvalidRequest)]
    #[case(RecordServiceError::rejected(500_u16, "boom"), ErrorCode::ServiceUnavailable)]
    #[case(RecordServiceError::transport("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RecordServiceError::decode("eof"), ErrorCode::InternalError)]
    fn maps_to_stable_codes(#[case] error: RecordServiceError, #[case] code: ErrorCode) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn conflict_message_is_surfaced_verbatim() {
        let error = RecordServiceError::conflict("Fornecedor já vinculado a esta empresa");
        let domain = error.to_domain("failed to link counterparty");
        assert_eq!(domain.message(), "Fornecedor já vinculado a esta empresa");
    }

    #[rstest]
    #[case(RecordServiceError::transport("connection refused"))]
    #[case(RecordServiceError::conflict("  "))]
    fn generic_message_is_used_without_server_text(#[case] error: RecordServiceError) {
        let domain = error.to_domain("failed to link counterparty");
        assert_eq!(domain.message(), "failed to link counterparty");
    }

    #[test]
    fn plain_conversion_falls_back_to_code_message() {
        let domain: Error = RecordServiceError::transport("connection refused").into();
        assert_eq!(domain.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(domain.message(), "service unavailable");
    }
}

//! Driven port for postal code lookup services.
//!
//! Both the primary lookup service and the public fallback provider implement
//! this port; the resolver decides which one to call and how to interpret the
//! outcome.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::postal::{AddressParts, PostalCode};

define_port_error! {
    /// Errors surfaced by a postal lookup service.
    pub enum PostalLookupError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "postal lookup transport failed: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "postal lookup answered with status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "postal lookup response decode failed: {message}",
        /// The service explicitly reported the code as unknown.
        NotFound => "postal code not found",
        /// The service answered but refused the code with its own message.
        Rejected { message: String } => "{message}",
    }
}

impl PostalLookupError {
    /// Whether the service was unable to answer at all.
    ///
    /// Only these failures send the resolver on to the fallback provider.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }
}

/// Port for resolving a normalized postal code into address parts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostalLookupSource: Send + Sync {
    /// Look up one normalized postal code.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use registry_client::domain::PostalCode;
    /// use registry_client::domain::ports::PostalLookupSource;
    ///
    /// let code = PostalCode::parse("01310-100")?;
    /// let parts = source.lookup(&code).await?;
    /// assert_eq!(parts.state_code, "SP");
    /// ```
    async fn lookup(&self, code: &PostalCode) -> Result<AddressParts, PostalLookupError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for fallback classification.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PostalLookupError::transport("refused"), true)]
    #[case(PostalLookupError::status(502_u16, "bad gateway"), true)]
    #[case(PostalLookupError::decode("expected value"), true)]
    #[case(PostalLookupError::not_found(), false)]
    #[case(PostalLookupError::rejected("CEP inválido"), false)]
    fn classifies_service_failures(#[case] error: PostalLookupError, #[case] expected: bool) {
        assert_eq!(error.is_service_failure(), expected, "{error}");
    }
}

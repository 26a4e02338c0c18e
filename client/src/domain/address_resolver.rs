//! Postal code resolution with a single fallback hop.
//!
//! The resolver normalizes the input, asks the primary lookup service, and
//! only when that service fails to answer asks the public fallback provider.
//! Every call yields a fresh [`PostalAddress`]; nothing is cached.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::{PostalLookupError, PostalLookupSource};
use super::postal::{AddressFailure, PostalAddress, PostalCode};

/// Resolves raw postal codes into tagged address results.
#[derive(Clone)]
pub struct AddressResolver {
    primary: Arc<dyn PostalLookupSource>,
    fallback: Arc<dyn PostalLookupSource>,
}

impl AddressResolver {
    /// Create a resolver over a primary service and its fallback provider.
    pub fn new(primary: Arc<dyn PostalLookupSource>, fallback: Arc<dyn PostalLookupSource>) -> Self {
        Self { primary, fallback }
    }

    /// Resolve `raw` into a postal address.
    ///
    /// Codes that do not normalize to eight digits are rejected without any
    /// network call. Lookup failures never escape: they become an invalid
    /// result carrying the failure reason.
    pub async fn resolve(&self, raw: &str) -> PostalAddress {
        let code = match PostalCode::parse(raw) {
            Ok(code) => code,
            Err(error) => {
                debug!(normalized = error.normalized(), "postal code rejected locally");
                return PostalAddress::invalid(error.normalized(), AddressFailure::MalformedCode);
            }
        };

        match self.primary.lookup(&code).await {
            Ok(parts) => {
                debug!(postal_code = %code, "postal code resolved by primary service");
                return PostalAddress::resolved(&code, parts);
            }
            Err(error) if error.is_service_failure() => {
                warn!(postal_code = %code, %error, "primary postal lookup failed; using fallback");
            }
            Err(PostalLookupError::Rejected { message }) => {
                debug!(postal_code = %code, %message, "primary service rejected postal code");
                return PostalAddress::invalid(code.as_str(), AddressFailure::Rejected(message));
            }
            Err(error) => {
                debug!(postal_code = %code, %error, "primary service does not know postal code");
                return PostalAddress::invalid(code.as_str(), AddressFailure::NotFound);
            }
        }

        match self.fallback.lookup(&code).await {
            Ok(parts) => {
                debug!(postal_code = %code, "postal code resolved by fallback provider");
                PostalAddress::resolved(&code, parts)
            }
            Err(PostalLookupError::NotFound) => {
                debug!(postal_code = %code, "fallback provider does not know postal code");
                PostalAddress::invalid(code.as_str(), AddressFailure::NotFound)
            }
            Err(error) => {
                warn!(postal_code = %code, %error, "fallback postal lookup failed");
                PostalAddress::invalid(code.as_str(), AddressFailure::LookupError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Resolver hop ordering and failure mapping.

    use super::*;
    use crate::domain::AddressParts;
    use crate::domain::ports::MockPostalLookupSource;
    use rstest::rstest;

    fn paulista() -> AddressParts {
        AddressParts {
            state_code: "SP".to_owned(),
            city: "São Paulo".to_owned(),
            neighborhood: "Bela Vista".to_owned(),
            street: "Av Paulista".to_owned(),
        }
    }

    fn untouched() -> MockPostalLookupSource {
        let mut source = MockPostalLookupSource::new();
        source.expect_lookup().never();
        source
    }

    fn resolver(primary: MockPostalLookupSource, fallback: MockPostalLookupSource) -> AddressResolver {
        AddressResolver::new(Arc::new(primary), Arc::new(fallback))
    }

    #[rstest]
    #[case::empty("")]
    #[case::seven_digits("1310-100")]
    #[case::nine_digits("01310-1000")]
    #[case::letters("abcdefgh")]
    #[tokio::test]
    async fn malformed_codes_never_reach_the_network(#[case] raw: &str) {
        let address = resolver(untouched(), untouched()).resolve(raw).await;

        assert!(!address.is_valid());
        assert_eq!(
            address.failure_reason().as_deref(),
            Some("postal code must contain 8 digits")
        );
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let mut primary = MockPostalLookupSource::new();
        primary
            .expect_lookup()
            .withf(|code| code.as_str() == "01310100")
            .times(1)
            .returning(|_| Ok(paulista()));

        let address = resolver(primary, untouched()).resolve("01310-100").await;

        assert!(address.is_valid());
        assert_eq!(address.city(), "São Paulo");
    }

    #[tokio::test]
    async fn primary_outage_falls_back_to_public_provider() {
        let mut primary = MockPostalLookupSource::new();
        primary
            .expect_lookup()
            .times(1)
            .returning(|_| Err(PostalLookupError::transport("connection refused")));
        let mut fallback = MockPostalLookupSource::new();
        fallback
            .expect_lookup()
            .withf(|code| code.as_str() == "01310100")
            .times(1)
            .returning(|_| Ok(paulista()));

        let address = resolver(primary, fallback).resolve("01310-100").await;

        assert!(address.is_valid());
        assert_eq!(address.postal_code(), "01310100");
        assert_eq!(address.state_code(), "SP");
        assert_eq!(address.city(), "São Paulo");
        assert_eq!(address.neighborhood(), "Bela Vista");
        assert_eq!(address.street(), "Av Paulista");
    }

    #[rstest]
    #[case::fallback_not_found(PostalLookupError::not_found(), "postal code not found")]
    #[case::fallback_down(PostalLookupError::status(503_u16, "unavailable"), "lookup error")]
    #[case::fallback_garbled(PostalLookupError::decode("eof"), "lookup error")]
    #[tokio::test]
    async fn fallback_failures_produce_invalid_results(
        #[case] fallback_error: PostalLookupError,
        #[case] reason: &str,
    ) {
        let mut primary = MockPostalLookupSource::new();
        primary
            .expect_lookup()
            .returning(|_| Err(PostalLookupError::status(500_u16, "boom")));
        let mut fallback = MockPostalLookupSource::new();
        fallback
            .expect_lookup()
            .times(1)
            .returning(move |_| Err(fallback_error.clone()));

        let address = resolver(primary, fallback).resolve("80010000").await;

        assert!(!address.is_valid());
        assert_eq!(address.failure_reason().as_deref(), Some(reason));
    }

    #[rstest]
    #[case::transport(PostalLookupError::transport("reset"), true)]
    #[case::status(PostalLookupError::status(502_u16, "bad gateway"), true)]
    #[case::decode(PostalLookupError::decode("expected value"), true)]
    #[case::not_found(PostalLookupError::not_found(), false)]
    #[case::rejected(PostalLookupError::rejected("CEP inválido"), false)]
    #[tokio::test]
    async fn only_service_failures_reach_the_fallback(
        #[case] primary_error: PostalLookupError,
        #[case] falls_back: bool,
    ) {
        let mut primary = MockPostalLookupSource::new();
        primary
            .expect_lookup()
            .times(1)
            .returning(move |_| Err(primary_error.clone()));
        let mut fallback = MockPostalLookupSource::new();
        fallback
            .expect_lookup()
            .times(usize::from(falls_back))
            .returning(|_| Ok(paulista()));

        let address = resolver(primary, fallback).resolve("01310-100").await;

        assert_eq!(address.is_valid(), falls_back);
    }

    #[tokio::test]
    async fn primary_rejection_is_final() {
        let mut primary = MockPostalLookupSource::new();
        primary
            .expect_lookup()
            .returning(|_| Err(PostalLookupError::rejected("CEP não encontrado")));

        let address = resolver(primary, untouched()).resolve("99999999").await;

        assert_eq!(
            address.failure(),
            Some(&AddressFailure::Rejected("CEP não encontrado".to_owned()))
        );
    }

    #[tokio::test]
    async fn repeated_lookups_query_again() {
        let mut primary = MockPostalLookupSource::new();
        primary.expect_lookup().times(2).returning(|_| Ok(paulista()));
        let resolver = resolver(primary, untouched());

        let first = resolver.resolve("01310100").await;
        let second = resolver.resolve("01310100").await;

        assert_eq!(first, second);
    }
}

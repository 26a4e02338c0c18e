//! Reqwest-backed postal lookup adapters.
//!
//! These adapters own transport details only: endpoint composition, timeout
//! and HTTP error mapping, and JSON decoding into address parts. Choosing
//! between them is the resolver's job.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::dto::{FallbackLookupDto, PrimaryLookupDto, PrimaryOutcome};
use crate::domain::ports::{PostalLookupError, PostalLookupSource};
use crate::domain::{AddressParts, PostalCode};
use crate::outbound::http::{HttpIdentity, body_preview, endpoint};

/// Lookup against the record service: `GET {api}/cep/{code}`.
pub struct PrimaryPostalLookup {
    client: Client,
    base: Url,
}

impl PrimaryPostalLookup {
    /// Build an adapter rooted at the record service's API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, identity: &HttpIdentity) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: identity.client()?,
            base,
        })
    }
}

#[async_trait]
impl PostalLookupSource for PrimaryPostalLookup {
    async fn lookup(&self, code: &PostalCode) -> Result<AddressParts, PostalLookupError> {
        let url = endpoint(&self.base, &["cep", code.as_str()]);
        let dto: PrimaryLookupDto = fetch_json(&self.client, url).await?;
        match dto.into_outcome() {
            PrimaryOutcome::Found(parts) => Ok(parts),
            PrimaryOutcome::Refused(message) => {
                debug!(%code, %message, "primary lookup refused postal code");
                Err(PostalLookupError::rejected(message))
            }
        }
    }
}

/// Lookup against the public provider: `GET {fallback}/ws/{code}/json/`.
pub struct FallbackPostalLookup {
    client: Client,
    base: Url,
}

impl FallbackPostalLookup {
    /// Build an adapter rooted at the fallback provider's base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, identity: &HttpIdentity) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: identity.client()?,
            base,
        })
    }
}

#[async_trait]
impl PostalLookupSource for FallbackPostalLookup {
    async fn lookup(&self, code: &PostalCode) -> Result<AddressParts, PostalLookupError> {
        // The provider only answers on the trailing-slash form.
        let url = endpoint(&self.base, &["ws", code.as_str(), "json", ""]);
        let dto: FallbackLookupDto = fetch_json(&self.client, url).await?;
        dto.into_parts().ok_or_else(PostalLookupError::not_found)
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T, PostalLookupError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    decode(body.as_ref())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, PostalLookupError> {
    serde_json::from_slice(body).map_err(|error| {
        PostalLookupError::decode(format!("invalid postal lookup JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> PostalLookupError {
    PostalLookupError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PostalLookupError {
    PostalLookupError::status(status.as_u16(), body_preview(body))
}

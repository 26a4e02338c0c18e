//! Shared reqwest plumbing for the record service adapters.
//!
//! This module owns transport details only: endpoint composition, timeout,
//! HTTP status mapping, and JSON decoding.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::dto::ApiErrorDto;
use crate::domain::ports::RecordServiceError;
use crate::outbound::http::{HttpIdentity, body_preview, endpoint};

/// Client bound to the record service's API base URL.
pub(super) struct RecordTransport {
    client: Client,
    base: Url,
}

impl RecordTransport {
    pub(super) fn new(base: Url, identity: &HttpIdentity) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: identity.client()?,
            base,
        })
    }

    pub(super) fn url(&self, segments: &[&str]) -> Url {
        endpoint(&self.base, segments)
    }

    pub(super) const fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and decode a JSON body.
    pub(super) async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RecordServiceError> {
        let body = self.execute(request).await?;
        decode(&body)
    }

    /// Send `request` and discard the body.
    pub(super) async fn discard(&self, request: RequestBuilder) -> Result<(), RecordServiceError> {
        self.execute(request).await.map(drop)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, RecordServiceError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "record service refused request");
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

pub(super) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RecordServiceError> {
    serde_json::from_slice(body).map_err(|error| {
        RecordServiceError::decode(format!("invalid record service JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> RecordServiceError {
    RecordServiceError::transport(error.to_string())
}

/// Map a non-success answer, surfacing the service's own message verbatim.
pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> RecordServiceError {
    let message = serde_json::from_slice::<ApiErrorDto>(body)
        .ok()
        .and_then(ApiErrorDto::into_message)
        .unwrap_or_else(|| {
            let preview = body_preview(body);
            if preview.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                preview
            }
        });

    match status {
        StatusCode::NOT_FOUND => RecordServiceError::not_found(message),
        StatusCode::CONFLICT => RecordServiceError::conflict(message),
        _ => RecordServiceError::rejected(status.as_u16(), message),
    }
}

//! Reqwest-backed organization records: `{api}/empresas`.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use url::Url;

use super::dto::{OrganizationDto, OrganizationRequestDto};
use super::transport::RecordTransport;
use crate::domain::ports::{OrganizationRecords, RecordServiceError};
use crate::domain::{CounterpartyId, Organization, OrganizationDraft, OrganizationId};
use crate::outbound::HttpIdentity;

const COLLECTION: &str = "empresas";
const LINKS: &str = "fornecedores";

/// Organization record adapter over HTTP.
pub struct HttpOrganizationRecords {
    transport: RecordTransport,
}

impl HttpOrganizationRecords {
    /// Build an adapter rooted at the record service's API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, identity: &HttpIdentity) -> Result<Self, reqwest::Error> {
        Ok(Self {
            transport: RecordTransport::new(base, identity)?,
        })
    }

    fn record_url(&self, id: OrganizationId) -> Url {
        self.transport.url(&[COLLECTION, &id.to_string()])
    }

    fn link_url(&self, id: OrganizationId, counterparty: CounterpartyId) -> Url {
        self.transport
            .url(&[COLLECTION, &id.to_string(), LINKS, &counterparty.to_string()])
    }

    fn list_url(&self, search: &str, page: PageRequest) -> Url {
        let mut url = self.transport.url(&[COLLECTION]);
        url.query_pairs_mut().append_pair("search", search);
        page.append_to(&mut url);
        url
    }
}

#[async_trait]
impl OrganizationRecords for HttpOrganizationRecords {
    async fn list(
        &self,
        search: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, RecordServiceError> {
        let request = self.transport.client().get(self.list_url(search, page));
        let dto: Page<OrganizationDto> = self.transport.fetch(request).await?;
        Ok(dto.map(OrganizationDto::into_domain))
    }

    async fn find(&self, id: OrganizationId) -> Result<Organization, RecordServiceError> {
        let request = self.transport.client().get(self.record_url(id));
        let dto: OrganizationDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn create(&self, draft: &OrganizationDraft) -> Result<Organization, RecordServiceError> {
        let request = self
            .transport
            .client()
            .post(self.transport.url(&[COLLECTION]))
            .json(&OrganizationRequestDto::from(draft));
        let dto: OrganizationDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn update(
        &self,
        id: OrganizationId,
        draft: &OrganizationDraft,
    ) -> Result<Organization, RecordServiceError> {
        let request = self
            .transport
            .client()
            .put(self.record_url(id))
            .json(&OrganizationRequestDto::from(draft));
        let dto: OrganizationDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn delete(&self, id: OrganizationId) -> Result<(), RecordServiceError> {
        let request = self.transport.client().delete(self.record_url(id));
        self.transport.discard(request).await
    }

    async fn link(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError> {
        let request = self.transport.client().post(self.link_url(id, counterparty));
        let dto: OrganizationDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn unlink(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError> {
        let request = self
            .transport
            .client()
            .delete(self.link_url(id, counterparty));
        let dto: OrganizationDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }
}

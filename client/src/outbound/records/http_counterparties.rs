//! Reqwest-backed counterparty records: `{api}/fornecedores`.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use url::Url;

use super::dto::{CounterpartyDto, CounterpartyRequestDto};
use super::transport::RecordTransport;
use crate::domain::ports::{CounterpartyRecords, RecordServiceError};
use crate::domain::{Counterparty, CounterpartyDraft, CounterpartyFilter, CounterpartyId};
use crate::outbound::HttpIdentity;

const COLLECTION: &str = "fornecedores";

/// Counterparty record adapter over HTTP.
pub struct HttpCounterpartyRecords {
    transport: RecordTransport,
}

impl HttpCounterpartyRecords {
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

    fn record_url(&self, id: CounterpartyId) -> Url {
        self.transport.url(&[COLLECTION, &id.to_string()])
    }

    fn list_url(&self, filter: &CounterpartyFilter, page: PageRequest) -> Url {
        let mut url = self.transport.url(&[COLLECTION]);
        url.query_pairs_mut()
            .append_pair("nome", &filter.name)
            .append_pair("cpfCnpj", &filter.tax_id);
        page.append_to(&mut url);
        url
    }
}

#[async_trait]
impl CounterpartyRecords for HttpCounterpartyRecords {
    async fn list(
        &self,
        filter: &CounterpartyFilter,
        page: PageRequest,
    ) -> Result<Page<Counterparty>, RecordServiceError> {
        let request = self.transport.client().get(self.list_url(filter, page));
        let dto: Page<CounterpartyDto> = self.transport.fetch(request).await?;
        Ok(dto.map(CounterpartyDto::into_domain))
    }

    async fn find(&self, id: CounterpartyId) -> Result<Counterparty, RecordServiceError> {
        let request = self.transport.client().get(self.record_url(id));
        let dto: CounterpartyDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn create(&self, draft: &CounterpartyDraft) -> Result<Counterparty, RecordServiceError> {
        let request = self
            .transport
            .client()
            .post(self.transport.url(&[COLLECTION]))
            .json(&CounterpartyRequestDto::from(draft));
        let dto: CounterpartyDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn update(
        &self,
        id: CounterpartyId,
        draft: &CounterpartyDraft,
    ) -> Result<Counterparty, RecordServiceError> {
        let request = self
            .transport
            .client()
            .put(self.record_url(id))
            .json(&CounterpartyRequestDto::from(draft));
        let dto: CounterpartyDto = self.transport.fetch(request).await?;
        Ok(dto.into_domain())
    }

    async fn delete(&self, id: CounterpartyId) -> Result<(), RecordServiceError> {
        let request = self.transport.client().delete(self.record_url(id));
        self.transport.discard(request).await
    }
}

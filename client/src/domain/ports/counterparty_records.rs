//! Driven port for the counterparty record service.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::RecordServiceError;
use crate::domain::{Counterparty, CounterpartyDraft, CounterpartyFilter, CounterpartyId};

/// Port for reading and mutating counterparty records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterpartyRecords: Send + Sync {
    /// List counterparties matching the filter.
    async fn list(
        &self,
        filter: &CounterpartyFilter,
        page: PageRequest,
    ) -> Result<Page<Counterparty>, RecordServiceError>;

    /// Load one counterparty.
    async fn find(&self, id: CounterpartyId) -> Result<Counterparty, RecordServiceError>;

    /// Create a counterparty from a validated draft.
    async fn create(&self, draft: &CounterpartyDraft) -> Result<Counterparty, RecordServiceError>;

    /// Replace a counterparty's fields with a validated draft.
    async fn update(
        &self,
        id: CounterpartyId,
        draft: &CounterpartyDraft,
    ) -> Result<Counterparty, RecordServiceError>;

    /// Delete a counterparty.
    async fn delete(&self, id: CounterpartyId) -> Result<(), RecordServiceError>;
}

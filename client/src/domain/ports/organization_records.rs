//! Driven port for the organization record service.
//!
//! Every mutation returns the full organization representation, including
//! the freshly denormalized counterparty reference list.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::RecordServiceError;
use crate::domain::{CounterpartyId, Organization, OrganizationDraft, OrganizationId};

/// Port for reading and mutating organization records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRecords: Send + Sync {
    /// List organizations matching a free-text search term.
    ///
    /// A blank term lists every organization.
    async fn list(
        &self,
        search: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, RecordServiceError>;

    /// Load one organization.
    async fn find(&self, id: OrganizationId) -> Result<Organization, RecordServiceError>;

    /// Create an organization from a validated draft.
    async fn create(&self, draft: &OrganizationDraft) -> Result<Organization, RecordServiceError>;

    /// Replace an organization's fields with a validated draft.
    async fn update(
        &self,
        id: OrganizationId,
        draft: &OrganizationDraft,
    ) -> Result<Organization, RecordServiceError>;

    /// Delete an organization.
    async fn delete(&self, id: OrganizationId) -> Result<(), RecordServiceError>;

    /// Associate a counterparty with an organization.
    ///
    /// Linking an already linked pair is a conflict, never a no-op.
    async fn link(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError>;

    /// Remove an association.
    async fn unlink(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError>;
}

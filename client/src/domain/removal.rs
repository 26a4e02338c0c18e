//! Record deletion followed by a listing reload.
//!
//! A successful delete posts a success notice and asks the listing showing
//! the records to reload; a failed one posts an error notice carrying the
//! record service's message when it sent one. The listing is left alone on
//! failure.

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{CounterpartyRecords, OrganizationRecords, RecordServiceError};
use super::{CounterpartyId, Error, ListingRefresh, NoticeQueue, OrganizationId};

/// Deletes organizations.
pub struct OrganizationRemoval {
    records: Arc<dyn OrganizationRecords>,
    listing: Arc<dyn ListingRefresh>,
    notices: NoticeQueue,
}

impl OrganizationRemoval {
    /// Removal refreshing `listing` after every delete.
    pub fn new(
        records: Arc<dyn OrganizationRecords>,
        listing: Arc<dyn ListingRefresh>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            records,
            listing,
            notices,
        }
    }

    /// Delete organization `id`.
    ///
    /// # Errors
    ///
    /// Returns the mapped record-service error after posting it as an error
    /// notice.
    pub async fn delete(&self, id: OrganizationId) -> Result<(), Error> {
        let outcome = self.records.delete(id).await;
        settle(
            &self.notices,
            self.listing.as_ref(),
            outcome,
            "organization deleted",
            "failed to delete organization",
        )?;
        info!(?id, "organization deleted");
        Ok(())
    }
}

/// Deletes counterparties.
pub struct CounterpartyRemoval {
    records: Arc<dyn CounterpartyRecords>,
    listing: Arc<dyn ListingRefresh>,
    notices: NoticeQueue,
}

impl CounterpartyRemoval {
    /// Removal refreshing `listing` after every delete.
    pub fn new(
        records: Arc<dyn CounterpartyRecords>,
        listing: Arc<dyn ListingRefresh>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            records,
            listing,
            notices,
        }
    }

    /// Delete counterparty `id`.
    ///
    /// # Errors
    ///
    /// Returns the mapped record-service error after posting it as an error
    /// notice.
    pub async fn delete(&self, id: CounterpartyId) -> Result<(), Error> {
        let outcome = self.records.delete(id).await;
        settle(
            &self.notices,
            self.listing.as_ref(),
            outcome,
            "counterparty deleted",
            "failed to delete counterparty",
        )?;
        info!(?id, "counterparty deleted");
        Ok(())
    }
}

fn settle(
    notices: &NoticeQueue,
    listing: &dyn ListingRefresh,
    outcome: Result<(), RecordServiceError>,
    success: &str,
    fallback: &str,
) -> Result<(), Error> {
    if let Err(error) = outcome {
        let error = error.to_domain(fallback);
        warn!(code = ?error.code(), message = error.message(), "delete failed");
        notices.error(error.message());
        return Err(error);
    }
    notices.success(success);
    if let Err(error) = listing.refresh_listing() {
        warn!(%error, "listing refresh after delete failed");
    }
    Ok(())
}

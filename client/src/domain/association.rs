//! Organization/counterparty association management.
//!
//! The manager holds the organization currently being edited together with
//! the counterparties still eligible for linking. The record service owns the
//! association table; after every successful mutation the manager:
//!
//! 1. replaces the held organization with the returned representation,
//! 2. recomputes the eligible list from the unfiltered counterparty catalogue,
//! 3. asks the organization listing to refresh its displayed page.
//!
//! Failures post an error notice and leave the held state untouched.
//!
//! Opening, linking and unlinking run one at a time per manager, each from
//! its service call through the listing refresh, so the held organization is
//! always the response to the newest change.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use pagination::PageRequest;
use tokio::sync::Mutex as ChangeLock;
use tracing::{debug, warn};

use super::ports::{CounterpartyRecords, OrganizationRecords};
use super::{
    Counterparty, CounterpartyFilter, CounterpartyId, Error, NoticeQueue, Organization,
    OrganizationId, QueryPipelineHandle,
};

/// Something displaying a record listing that can be asked to reload.
#[cfg_attr(test, mockall::automock)]
pub trait ListingRefresh: Send + Sync {
    /// Reload the displayed page.
    ///
    /// # Errors
    ///
    /// Returns an error when the listing can no longer be refreshed.
    fn refresh_listing(&self) -> Result<(), Error>;
}

impl<Q, T> ListingRefresh for QueryPipelineHandle<Q, T>
where
    Q: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn refresh_listing(&self) -> Result<(), Error> {
        self.refresh()
    }
}

/// Held organization plus the counterparties that can still be linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSnapshot {
    /// Organization as last returned by the record service.
    pub organization: Organization,
    /// Catalogue entries not yet linked to `organization`.
    pub eligible: Vec<Counterparty>,
}

#[derive(Debug, Default)]
struct HeldState {
    organization: Option<Organization>,
    eligible: Vec<Counterparty>,
}

/// Links and unlinks counterparties while keeping the held views consistent.
pub struct AssociationManager {
    organizations: Arc<dyn OrganizationRecords>,
    counterparties: Arc<dyn CounterpartyRecords>,
    listing: Arc<dyn ListingRefresh>,
    notices: NoticeQueue,
    catalogue: PageRequest,
    state: Mutex<HeldState>,
    changes: ChangeLock<()>,
}

impl AssociationManager {
    /// Build a manager over the record ports.
    pub fn new(
        organizations: Arc<dyn OrganizationRecords>,
        counterparties: Arc<dyn CounterpartyRecords>,
        listing: Arc<dyn ListingRefresh>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            organizations,
            counterparties,
            listing,
            notices,
            catalogue: PageRequest::catalogue(),
            state: Mutex::new(HeldState::default()),
            changes: ChangeLock::new(()),
        }
    }

    /// Override the eligibility catalogue request.
    pub fn with_catalogue(mut self, catalogue: PageRequest) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Load an organization and compute its eligible counterparties.
    ///
    /// A catalogue failure still opens the organization, with an empty
    /// eligible list and an error notice.
    ///
    /// # Errors
    ///
    /// Returns the mapped record-service error when the organization cannot
    /// be loaded; the held state is unchanged in that case.
    pub async fn open(&self, id: OrganizationId) -> Result<AssociationSnapshot, Error> {
        let _serial = self.changes.lock().await;
        let organization = self.organizations.find(id).await.map_err(|error| {
            let error = error.to_domain("failed to load organization");
            self.notices.error(error.message());
            error
        })?;
        let eligible = match self.load_catalogue().await {
            Ok(catalogue) => eligible_for(&organization, catalogue),
            Err(error) => {
                self.notices.error(error.message());
                Vec::new()
            }
        };
        let mut state = self.state();
        state.organization = Some(organization.clone());
        state.eligible = eligible.clone();
        Ok(AssociationSnapshot {
            organization,
            eligible,
        })
    }

    /// Associate `counterparty` with `organization`.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the pair is already associated and the record
    /// service's mapped error when the call fails. Either way an error notice
    /// is posted and the held state is unchanged.
    pub async fn link(
        &self,
        organization: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, Error> {
        let _serial = self.changes.lock().await;
        if self.held_link_state(organization, counterparty) == Some(true) {
            return Err(self.reject(Error::conflict("counterparty already linked")));
        }
        let updated = self
            .organizations
            .link(organization, counterparty)
            .await
            .map_err(|error| self.reject(error.to_domain("failed to link counterparty")))?;
        debug!(%organization, %counterparty, "counterparty linked");
        self.apply(updated, "counterparty linked").await
    }

    /// Remove the association between `counterparty` and `organization`.
    ///
    /// # Errors
    ///
    /// Returns not-found when the pair is not associated and the record
    /// service's mapped error when the call fails. Either way an error notice
    /// is posted and the held state is unchanged.
    pub async fn unlink(
        &self,
        organization: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, Error> {
        let _serial = self.changes.lock().await;
        if self.held_link_state(organization, counterparty) == Some(false) {
            return Err(self.reject(Error::not_found(
                "counterparty is not linked to this organization",
            )));
        }
        let updated = self
            .organizations
            .unlink(organization, counterparty)
            .await
            .map_err(|error| self.reject(error.to_domain("failed to unlink counterparty")))?;
        debug!(%organization, %counterparty, "counterparty unlinked");
        self.apply(updated, "counterparty unlinked").await
    }

    /// Current held state, if an organization is open.
    pub fn snapshot(&self) -> Option<AssociationSnapshot> {
        let state = self.state();
        state
            .organization
            .as_ref()
            .map(|organization| AssociationSnapshot {
                organization: organization.clone(),
                eligible: state.eligible.clone(),
            })
    }

    /// Counterparties that can still be linked to the held organization.
    pub fn eligible(&self) -> Vec<Counterparty> {
        self.state().eligible.clone()
    }

    /// Drop the held organization.
    pub fn close(&self) {
        let mut state = self.state();
        state.organization = None;
        state.eligible.clear();
    }

    fn state(&self) -> MutexGuard<'_, HeldState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Whether the held snapshot of `organization` lists `counterparty`.
    /// `None` when another organization (or none) is held.
    fn held_link_state(
        &self,
        organization: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Option<bool> {
        let state = self.state();
        let held = state.organization.as_ref()?;
        (held.id == Some(organization)).then(|| held.is_linked_to(counterparty))
    }

    fn reject(&self, error: Error) -> Error {
        warn!(code = ?error.code(), message = error.message(), "association change failed");
        self.notices.error(error.message());
        error
    }

    async fn apply(&self, updated: Organization, success: &str) -> Result<Organization, Error> {
        let previous = self
            .state()
            .organization
            .replace(updated.clone())
            .and_then(|held| held.id);

        let catalogue = self.load_catalogue().await;
        {
            let mut state = self.state();
            let still_held = state
                .organization
                .as_ref()
                .is_some_and(|held| held.id == updated.id);
            if still_held {
                let candidates = match catalogue {
                    Ok(catalogue) => catalogue,
                    Err(error) => {
                        self.notices.error(error.message());
                        if previous == updated.id {
                            std::mem::take(&mut state.eligible)
                        } else {
                            Vec::new()
                        }
                    }
                };
                state.eligible = eligible_for(&updated, candidates);
            }
        }

        if let Err(error) = self.listing.refresh_listing() {
            warn!(%error, "organization listing refresh failed");
        }
        self.notices.success(success);
        Ok(updated)
    }

    async fn load_catalogue(&self) -> Result<Vec<Counterparty>, Error> {
        self.counterparties
            .list(&CounterpartyFilter::unfiltered(), self.catalogue)
            .await
            .map(pagination::Page::into_items)
            .map_err(|error| error.to_domain("failed to load counterparties"))
    }
}

/// Catalogue entries whose id is absent from the organization's references.
fn eligible_for(organization: &Organization, catalogue: Vec<Counterparty>) -> Vec<Counterparty> {
    let linked: BTreeSet<CounterpartyId> = organization.counterparty_ids();
    catalogue
        .into_iter()
        .filter(|candidate| candidate.id.is_some_and(|id| !linked.contains(&id)))
        .collect()
}

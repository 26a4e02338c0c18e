//! Composition root for the registry client.
//!
//! A [`ClientContext`] is built once at process start. It owns the notice
//! queue, the address resolver and the record ports, and hands them to the
//! services explicitly; nothing in the domain reaches for a global.

use std::sync::Arc;
use std::time::Duration;

use pagination::PageRequest;
use thiserror::Error;
use tracing::debug;

use crate::config::{ClientSettings, SettingsError};
use crate::domain::ports::{CounterpartyRecords, OrganizationRecords};
use crate::domain::query_pipeline::DEFAULT_DEBOUNCE;
use crate::domain::{
    AddressResolver, AssociationManager, Counterparty, CounterpartyFilter, CounterpartyForm,
    CounterpartyListing, CounterpartyRemoval, ListingRefresh, NoticeQueue, Organization,
    OrganizationForm, OrganizationListing, OrganizationRemoval, PipelineConfig,
    QueryPipelineHandle,
};
use crate::outbound::HttpIdentity;
use crate::outbound::postal::{FallbackPostalLookup, PrimaryPostalLookup};
use crate::outbound::records::{HttpCounterpartyRecords, HttpOrganizationRecords};

/// Failure to assemble the client context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A configuration value is unusable.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Shared services and tuning for one client process.
#[derive(Clone)]
pub struct ClientContext {
    notices: NoticeQueue,
    resolver: AddressResolver,
    organizations: Arc<dyn OrganizationRecords>,
    counterparties: Arc<dyn CounterpartyRecords>,
    page: PageRequest,
    catalogue: PageRequest,
    debounce: Duration,
}

impl ClientContext {
    /// Wire the HTTP adapters described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when a setting is invalid or the HTTP client
    /// cannot be constructed.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ContextError> {
        let api = settings.api_base_url()?;
        let fallback = settings.fallback_lookup_url()?;
        let identity = HttpIdentity {
            user_agent: settings.user_agent().to_owned(),
            timeout: settings.request_timeout(),
        };
        debug!(%api, %fallback, timeout_ms = ?identity.timeout, "building client context");

        let resolver = AddressResolver::new(
            Arc::new(PrimaryPostalLookup::new(api.clone(), &identity)?),
            Arc::new(FallbackPostalLookup::new(fallback, &identity)?),
        );
        let organizations = Arc::new(HttpOrganizationRecords::new(api.clone(), &identity)?);
        let counterparties = Arc::new(HttpCounterpartyRecords::new(api, &identity)?);

        Ok(Self::from_parts(
            resolver,
            organizations,
            counterparties,
            NoticeQueue::new(settings.notice_ttl()),
        )
        .with_pages(settings.page()?, settings.catalogue()?)
        .with_debounce(settings.debounce()))
    }

    /// Assemble a context from already built parts.
    pub fn from_parts(
        resolver: AddressResolver,
        organizations: Arc<dyn OrganizationRecords>,
        counterparties: Arc<dyn CounterpartyRecords>,
        notices: NoticeQueue,
    ) -> Self {
        Self {
            notices,
            resolver,
            organizations,
            counterparties,
            page: PageRequest::default(),
            catalogue: PageRequest::catalogue(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Override the list page and eligibility catalogue requests.
    #[must_use]
    pub const fn with_pages(mut self, page: PageRequest, catalogue: PageRequest) -> Self {
        self.page = page;
        self.catalogue = catalogue;
        self
    }

    /// Override the search debounce window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Process-wide notice queue.
    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Postal code resolver.
    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// Organization record port.
    pub fn organization_records(&self) -> Arc<dyn OrganizationRecords> {
        Arc::clone(&self.organizations)
    }

    /// Counterparty record port.
    pub fn counterparty_records(&self) -> Arc<dyn CounterpartyRecords> {
        Arc::clone(&self.counterparties)
    }

    /// List page request used by the pipelines.
    pub const fn page(&self) -> PageRequest {
        self.page
    }

    /// Start the organization list pipeline with an opening search term.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn organization_listing(
        &self,
        initial: impl Into<String>,
    ) -> QueryPipelineHandle<String, Organization> {
        QueryPipelineHandle::spawn(
            Arc::new(OrganizationListing::new(self.organization_records())),
            self.pipeline_config("failed to load organizations"),
            self.notices.clone(),
            initial.into(),
        )
    }

    /// Start the counterparty list pipeline with an opening filter.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn counterparty_listing(
        &self,
        initial: CounterpartyFilter,
    ) -> QueryPipelineHandle<CounterpartyFilter, Counterparty> {
        QueryPipelineHandle::spawn(
            Arc::new(CounterpartyListing::new(self.counterparty_records())),
            self.pipeline_config("failed to load counterparties"),
            self.notices.clone(),
            initial,
        )
    }

    /// Association manager refreshing `listing` after every mutation.
    pub fn association_manager(&self, listing: Arc<dyn ListingRefresh>) -> AssociationManager {
        AssociationManager::new(
            self.organization_records(),
            self.counterparty_records(),
            listing,
            self.notices.clone(),
        )
        .with_catalogue(self.catalogue)
    }

    /// Empty organization form.
    pub fn organization_form(&self) -> OrganizationForm {
        OrganizationForm::new(
            self.resolver.clone(),
            self.organization_records(),
            self.notices.clone(),
        )
    }

    /// Empty counterparty form.
    pub fn counterparty_form(&self) -> CounterpartyForm {
        CounterpartyForm::new(
            self.resolver.clone(),
            self.counterparty_records(),
            self.notices.clone(),
        )
    }

    /// Organization deletion refreshing `listing` afterwards.
    pub fn organization_removal(&self, listing: Arc<dyn ListingRefresh>) -> OrganizationRemoval {
        OrganizationRemoval::new(self.organization_records(), listing, self.notices.clone())
    }

    /// Counterparty deletion refreshing `listing` afterwards.
    pub fn counterparty_removal(&self, listing: Arc<dyn ListingRefresh>) -> CounterpartyRemoval {
        CounterpartyRemoval::new(self.counterparty_records(), listing, self.notices.clone())
    }

    /// Cancel pending notice timers.
    pub fn shutdown(&self) {
        self.notices.shutdown();
    }

    fn pipeline_config(&self, failure_notice: &str) -> PipelineConfig {
        PipelineConfig {
            debounce: self.debounce,
            page: self.page,
            ..PipelineConfig::with_failure_notice(failure_notice)
        }
    }
}

#[cfg(test)]
mod tests {
    //! Context assembly from settings.

    use super::*;

    fn settings(api_base_url: Option<&str>, page_size: Option<u32>) -> ClientSettings {
        ClientSettings {
            api_base_url: api_base_url.map(str::to_owned),
            fallback_lookup_url: None,
            request_timeout_ms: 2_000,
            debounce_ms: 150,
            notice_ttl_ms: 5_000,
            page_size,
            catalogue_size: None,
            user_agent: None,
        }
    }

    #[test]
    fn builds_from_defaults() {
        let context = ClientContext::from_settings(&settings(None, Some(25))).expect("context");

        assert_eq!(context.page().size(), 25);
        assert_eq!(context.debounce, Duration::from_millis(150));
        assert_eq!(context.catalogue.size(), 100);
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let Err(error) = ClientContext::from_settings(&settings(Some("not a url"), None)) else {
            panic!("invalid URL must fail");
        };
        assert!(matches!(error, ContextError::Settings(_)));
    }

    #[test]
    fn invalid_page_size_is_reported() {
        let Err(error) = ClientContext::from_settings(&settings(None, Some(0))) else {
            panic!("zero page size must fail");
        };
        assert!(matches!(
            error,
            ContextError::Settings(SettingsError::PageSize { .. })
        ));
    }
}

//! Query sources backing the two list screens.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::QuerySource;
use crate::domain::ports::{CounterpartyRecords, OrganizationRecords};
use crate::domain::{Counterparty, CounterpartyFilter, Error, Organization};

/// Organizations filtered by one free-text search term.
#[derive(Clone)]
pub struct OrganizationListing {
    records: Arc<dyn OrganizationRecords>,
}

impl OrganizationListing {
    /// Listing over the organization record port.
    pub fn new(records: Arc<dyn OrganizationRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl QuerySource for OrganizationListing {
    type Query = String;
    type Item = Organization;

    async fn fetch(&self, query: &String, page: PageRequest) -> Result<Page<Organization>, Error> {
        self.records
            .list(query.trim(), page)
            .await
            .map_err(|error| error.to_domain("failed to load organizations"))
    }
}

/// Counterparties filtered by name and tax id fragments.
#[derive(Clone)]
pub struct CounterpartyListing {
    records: Arc<dyn CounterpartyRecords>,
}

impl CounterpartyListing {
    /// Listing over the counterparty record port.
    pub fn new(records: Arc<dyn CounterpartyRecords>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl QuerySource for CounterpartyListing {
    type Query = CounterpartyFilter;
    type Item = Counterparty;

    async fn fetch(
        &self,
        query: &CounterpartyFilter,
        page: PageRequest,
    ) -> Result<Page<Counterparty>, Error> {
        let filter = CounterpartyFilter {
            name: query.name.trim().to_owned(),
            tax_id: query.tax_id.trim().to_owned(),
        };
        self.records
            .list(&filter, page)
            .await
            .map_err(|error| error.to_domain("failed to load counterparties"))
    }
}

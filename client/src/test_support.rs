//! Test doubles for the registry client.
//!
//! These helpers are shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). They are compiled for tests and behind the `test-support`
//! feature only.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    CounterpartyRecords, OrganizationRecords, PostalLookupError, PostalLookupSource,
    RecordServiceError,
};
use crate::domain::{
    AddressParts, Counterparty, CounterpartyDraft, CounterpartyFilter, CounterpartyId,
    CounterpartyRef, Organization, OrganizationDraft, OrganizationId, OrganizationRef,
    PostalCode,
};

/// Address parts literal for tests.
pub fn address(state_code: &str, city: &str, neighborhood: &str, street: &str) -> AddressParts {
    AddressParts {
        state_code: state_code.to_owned(),
        city: city.to_owned(),
        neighborhood: neighborhood.to_owned(),
        street: street.to_owned(),
    }
}

/// Postal lookup answering from a script and counting its calls.
pub struct ScriptedLookup {
    answers: HashMap<String, Result<AddressParts, PostalLookupError>>,
    otherwise: Result<AddressParts, PostalLookupError>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    /// Lookup giving `otherwise` for every code without a scripted answer.
    pub fn answering(otherwise: Result<AddressParts, PostalLookupError>) -> Self {
        Self {
            answers: HashMap::new(),
            otherwise,
            calls: AtomicUsize::new(0),
        }
    }

    /// Script the answer for one code, given in any punctuation.
    #[must_use]
    pub fn with(mut self, code: &str, answer: Result<AddressParts, PostalLookupError>) -> Self {
        self.answers.insert(PostalCode::normalize(code), answer);
        self
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostalLookupSource for ScriptedLookup {
    async fn lookup(&self, code: &PostalCode) -> Result<AddressParts, PostalLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .get(code.as_str())
            .unwrap_or(&self.otherwise)
            .clone()
    }
}

/// Record-service operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCall {
    /// `OrganizationRecords::list`.
    ListOrganizations,
    /// `OrganizationRecords::find`.
    FindOrganization,
    /// `OrganizationRecords::create` and `update`.
    SaveOrganization,
    /// `OrganizationRecords::delete`.
    DeleteOrganization,
    /// `OrganizationRecords::link`.
    Link,
    /// `OrganizationRecords::unlink`.
    Unlink,
    /// `CounterpartyRecords::list`.
    ListCounterparties,
    /// `CounterpartyRecords::find`.
    FindCounterparty,
    /// `CounterpartyRecords::create` and `update`.
    SaveCounterparty,
    /// `CounterpartyRecords::delete`.
    DeleteCounterparty,
}

#[derive(Default)]
struct Store {
    organizations: BTreeMap<OrganizationId, Organization>,
    counterparties: BTreeMap<CounterpartyId, Counterparty>,
    links: Vec<(OrganizationId, CounterpartyId)>,
    calls: HashMap<RecordCall, usize>,
    failures: HashMap<RecordCall, RecordServiceError>,
}

/// In-memory record service with the remote service's association rules.
///
/// Link pairs are unique; linking twice is a conflict and unlinking an absent
/// pair is not found. Reference lists are rebuilt on every read.
#[derive(Default)]
pub struct InMemoryRecords {
    store: Mutex<Store>,
}

impl InMemoryRecords {
    /// Empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an organization under a fixed id.
    pub fn put_organization(&self, id: OrganizationId, draft: &OrganizationDraft) {
        let organization = organization_from(Some(id), draft);
        self.store().organizations.insert(id, organization);
    }

    /// Store a counterparty under a fixed id.
    pub fn put_counterparty(&self, id: CounterpartyId, draft: &CounterpartyDraft) {
        let counterparty = counterparty_from(Some(id), draft);
        self.store().counterparties.insert(id, counterparty);
    }

    /// Associate a stored pair directly, bypassing the service rules.
    pub fn put_link(&self, organization: OrganizationId, counterparty: CounterpartyId) {
        self.store().links.push((organization, counterparty));
    }

    /// Fail the next `call` with `error`.
    pub fn fail_next(&self, call: RecordCall, error: RecordServiceError) {
        self.store().failures.insert(call, error);
    }

    /// Number of times `call` reached the service.
    pub fn calls(&self, call: RecordCall) -> usize {
        self.store().calls.get(&call).copied().unwrap_or(0)
    }

    /// Currently associated pairs, in link order.
    pub fn links(&self) -> Vec<(OrganizationId, CounterpartyId)> {
        self.store().links.clone()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count `call` and hand back the store unless a failure was injected.
    fn enter(&self, call: RecordCall) -> Result<MutexGuard<'_, Store>, RecordServiceError> {
        let mut store = self.store();
        *store.calls.entry(call).or_insert(0) += 1;
        match store.failures.remove(&call) {
            Some(error) => Err(error),
            None => Ok(store),
        }
    }
}

impl Store {
    fn organization(&self, id: OrganizationId) -> Result<Organization, RecordServiceError> {
        let mut organization = self
            .organizations
            .get(&id)
            .cloned()
            .ok_or_else(|| RecordServiceError::not_found(format!("Empresa não encontrada: {id}")))?;
        organization.counterparties = self
            .links
            .iter()
            .filter(|(linked, _)| *linked == id)
            .filter_map(|(_, counterparty)| self.counterparties.get(counterparty))
            .filter_map(counterparty_ref)
            .collect();
        Ok(organization)
    }

    fn counterparty(&self, id: CounterpartyId) -> Result<Counterparty, RecordServiceError> {
        let mut counterparty = self.counterparties.get(&id).cloned().ok_or_else(|| {
            RecordServiceError::not_found(format!("Fornecedor não encontrado: {id}"))
        })?;
        counterparty.organizations = self
            .links
            .iter()
            .filter(|(_, linked)| *linked == id)
            .filter_map(|(organization, _)| self.organizations.get(organization))
            .filter_map(organization_ref)
            .collect();
        Ok(counterparty)
    }

    fn ensure_unique_organization_tax_id(
        &self,
        tax_id: &str,
        except: Option<OrganizationId>,
    ) -> Result<(), RecordServiceError> {
        let taken = self
            .organizations
            .values()
            .any(|existing| existing.tax_id == tax_id && existing.id != except);
        if taken {
            return Err(RecordServiceError::conflict(format!(
                "CNPJ já cadastrado: {tax_id}"
            )));
        }
        Ok(())
    }

    fn ensure_unique_counterparty_tax_id(
        &self,
        tax_id: &str,
        except: Option<CounterpartyId>,
    ) -> Result<(), RecordServiceError> {
        let taken = self
            .counterparties
            .values()
            .any(|existing| existing.tax_id == tax_id && existing.id != except);
        if taken {
            return Err(RecordServiceError::conflict(format!(
                "CPF/CNPJ já cadastrado: {tax_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationRecords for InMemoryRecords {
    async fn list(
        &self,
        search: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, RecordServiceError> {
        let store = self.enter(RecordCall::ListOrganizations)?;
        let needle = search.trim().to_lowercase();
        let matching = store
            .organizations
            .keys()
            .filter_map(|id| store.organization(*id).ok())
            .filter(|organization| {
                needle.is_empty()
                    || organization.display_name.to_lowercase().contains(&needle)
                    || organization.tax_id.contains(&needle)
            })
            .collect();
        Ok(paginate(matching, page))
    }

    async fn find(&self, id: OrganizationId) -> Result<Organization, RecordServiceError> {
        self.enter(RecordCall::FindOrganization)?.organization(id)
    }

    async fn create(&self, draft: &OrganizationDraft) -> Result<Organization, RecordServiceError> {
        let mut store = self.enter(RecordCall::SaveOrganization)?;
        store.ensure_unique_organization_tax_id(&draft.tax_id, None)?;
        let next = store
            .organizations
            .keys()
            .next_back()
            .map_or(1, |last| last.0 + 1);
        let id = OrganizationId(next);
        store
            .organizations
            .insert(id, organization_from(Some(id), draft));
        store.organization(id)
    }

    async fn update(
        &self,
        id: OrganizationId,
        draft: &OrganizationDraft,
    ) -> Result<Organization, RecordServiceError> {
        let mut store = self.enter(RecordCall::SaveOrganization)?;
        store.organization(id)?;
        store.ensure_unique_organization_tax_id(&draft.tax_id, Some(id))?;
        store
            .organizations
            .insert(id, organization_from(Some(id), draft));
        store.organization(id)
    }

    async fn delete(&self, id: OrganizationId) -> Result<(), RecordServiceError> {
        let mut store = self.enter(RecordCall::DeleteOrganization)?;
        store.organization(id)?;
        store.organizations.remove(&id);
        store.links.retain(|(linked, _)| *linked != id);
        Ok(())
    }

    async fn link(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError> {
        let mut store = self.enter(RecordCall::Link)?;
        store.organization(id)?;
        store.counterparty(counterparty)?;
        if store.links.contains(&(id, counterparty)) {
            return Err(RecordServiceError::conflict(
                "Fornecedor já vinculado a esta empresa",
            ));
        }
        store.links.push((id, counterparty));
        store.organization(id)
    }

    async fn unlink(
        &self,
        id: OrganizationId,
        counterparty: CounterpartyId,
    ) -> Result<Organization, RecordServiceError> {
        let mut store = self.enter(RecordCall::Unlink)?;
        store.organization(id)?;
        store.counterparty(counterparty)?;
        let before = store.links.len();
        store.links.retain(|pair| *pair != (id, counterparty));
        if store.links.len() == before {
            return Err(RecordServiceError::not_found(
                "Fornecedor não vinculado a esta empresa",
            ));
        }
        store.organization(id)
    }
}

#[async_trait]
impl CounterpartyRecords for InMemoryRecords {
    async fn list(
        &self,
        filter: &CounterpartyFilter,
        page: PageRequest,
    ) -> Result<Page<Counterparty>, RecordServiceError> {
        let store = self.enter(RecordCall::ListCounterparties)?;
        let name = filter.name.trim().to_lowercase();
        let tax_id = filter.tax_id.trim();
        let matching = store
            .counterparties
            .keys()
            .filter_map(|id| store.counterparty(*id).ok())
            .filter(|counterparty| {
                counterparty.name.to_lowercase().contains(&name)
                    && counterparty.tax_id.contains(tax_id)
            })
            .collect();
        Ok(paginate(matching, page))
    }

    async fn find(&self, id: CounterpartyId) -> Result<Counterparty, RecordServiceError> {
        self.enter(RecordCall::FindCounterparty)?.counterparty(id)
    }

    async fn create(&self, draft: &CounterpartyDraft) -> Result<Counterparty, RecordServiceError> {
        let mut store = self.enter(RecordCall::SaveCounterparty)?;
        store.ensure_unique_counterparty_tax_id(&draft.tax_id, None)?;
        let next = store
            .counterparties
            .keys()
            .next_back()
            .map_or(1, |last| last.0 + 1);
        let id = CounterpartyId(next);
        store
            .counterparties
            .insert(id, counterparty_from(Some(id), draft));
        store.counterparty(id)
    }

    async fn update(
        &self,
        id: CounterpartyId,
        draft: &CounterpartyDraft,
    ) -> Result<Counterparty, RecordServiceError> {
        let mut store = self.enter(RecordCall::SaveCounterparty)?;
        store.counterparty(id)?;
        store.ensure_unique_counterparty_tax_id(&draft.tax_id, Some(id))?;
        store
            .counterparties
            .insert(id, counterparty_from(Some(id), draft));
        store.counterparty(id)
    }

    async fn delete(&self, id: CounterpartyId) -> Result<(), RecordServiceError> {
        let mut store = self.enter(RecordCall::DeleteCounterparty)?;
        store.counterparty(id)?;
        store.counterparties.remove(&id);
        store.links.retain(|(_, linked)| *linked != id);
        Ok(())
    }
}

fn organization_from(id: Option<OrganizationId>, draft: &OrganizationDraft) -> Organization {
    Organization {
        id,
        tax_id: draft.tax_id.clone(),
        display_name: draft.display_name.clone(),
        postal_code: PostalCode::normalize(&draft.postal_code),
        address: None,
        counterparties: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn counterparty_from(id: Option<CounterpartyId>, draft: &CounterpartyDraft) -> Counterparty {
    Counterparty {
        id,
        tax_id: draft.tax_id.clone(),
        person_type: draft.person_type,
        name: draft.name.clone(),
        email: draft.email.clone(),
        postal_code: PostalCode::normalize(&draft.postal_code),
        individual: draft.individual_details(),
        address: None,
        organizations: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn counterparty_ref(counterparty: &Counterparty) -> Option<CounterpartyRef> {
    Some(CounterpartyRef {
        id: counterparty.id?,
        tax_id: counterparty.tax_id.clone(),
        person_type: counterparty.person_type,
        name: counterparty.name.clone(),
        email: counterparty.email.clone(),
    })
}

fn organization_ref(organization: &Organization) -> Option<OrganizationRef> {
    Some(OrganizationRef {
        id: organization.id?,
        tax_id: organization.tax_id.clone(),
        display_name: organization.display_name.clone(),
        postal_code: organization.postal_code.clone(),
        city: None,
        state_code: None,
    })
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let size = usize::try_from(page.size()).unwrap_or(usize::MAX);
    let skip = usize::try_from(page.index())
        .unwrap_or(usize::MAX)
        .saturating_mul(size);
    let rows = items.into_iter().skip(skip).take(size).collect();
    Page::new(rows, page, total)
}

//! Behaviour tests for linking counterparties to organizations.
//!
//! The scenarios drive an [`AssociationManager`] over the in-memory record
//! service and check the held organization, the eligible list, the listing
//! refreshes, and the posted notices after each change.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use registry_client::domain::ports::RecordServiceError;
use registry_client::domain::{
    AssociationManager, CounterpartyDraft, CounterpartyId, Error, ErrorCode, ListingRefresh,
    NoticeKind, NoticeQueue, Organization, OrganizationDraft, OrganizationId, PersonType,
};
use registry_client::test_support::{InMemoryRecords, RecordCall};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

#[derive(Default)]
struct CountingListing {
    refreshes: AtomicUsize,
}

impl ListingRefresh for CountingListing {
    fn refresh_listing(&self) -> Result<(), Error> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct AssociationWorld {
    runtime: Runtime,
    records: Arc<InMemoryRecords>,
    listing: Arc<CountingListing>,
    notices: NoticeQueue,
    manager: AssociationManager,
    last_change: RefCell<Option<Result<Organization, Error>>>,
}

impl AssociationWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        let records = Arc::new(InMemoryRecords::new());
        let listing = Arc::new(CountingListing::default());
        let notices = NoticeQueue::default();
        let manager = AssociationManager::new(
            records.clone(),
            records.clone(),
            listing.clone(),
            notices.clone(),
        );
        Self {
            runtime,
            records,
            listing,
            notices,
            manager,
            last_change: RefCell::new(None),
        }
    }

    fn record_change(&self, outcome: Result<Organization, Error>) {
        *self.last_change.borrow_mut() = Some(outcome);
    }

    fn failure(&self) -> Error {
        match self.last_change.borrow().as_ref().expect("a change was made") {
            Ok(organization) => panic!("expected the change to fail, got {organization:?}"),
            Err(error) => error.clone(),
        }
    }

    fn held_counterparties(&self) -> Vec<CounterpartyId> {
        self.manager
            .snapshot()
            .expect("an organization is open")
            .organization
            .counterparties
            .iter()
            .map(|reference| reference.id)
            .collect()
    }
}

fn organization_draft() -> OrganizationDraft {
    OrganizationDraft {
        tax_id: "11222333000181".to_owned(),
        display_name: "Acme Ltda".to_owned(),
        postal_code: "01310100".to_owned(),
    }
}

fn counterparty_draft(id: u64) -> CounterpartyDraft {
    CounterpartyDraft {
        tax_id: format!("{id:014}"),
        person_type: PersonType::LegalEntity,
        name: format!("Supplier {id}"),
        email: format!("supplier{id}@example.com"),
        postal_code: "80010000".to_owned(),
        national_id: None,
        birth_date: None,
    }
}

fn parse_ids(ids: &str) -> Vec<CounterpartyId> {
    ids.split(',')
        .map(|id| CounterpartyId(id.trim().parse().expect("numeric id")))
        .collect()
}

fn parse_code(name: &str) -> ErrorCode {
    match name {
        "invalid_request" => ErrorCode::InvalidRequest,
        "not_found" => ErrorCode::NotFound,
        "conflict" => ErrorCode::Conflict,
        "service_unavailable" => ErrorCode::ServiceUnavailable,
        other => panic!("unknown error code {other}"),
    }
}

#[fixture]
fn world() -> AssociationWorld {
    AssociationWorld::new()
}

#[given("a record service holding organization 5 and counterparties 3, 9 and 12")]
fn seeded_record_service(world: &AssociationWorld) {
    world
        .records
        .put_organization(OrganizationId(5), &organization_draft());
    for id in [3, 9, 12] {
        world
            .records
            .put_counterparty(CounterpartyId(id), &counterparty_draft(id));
    }
}

#[given("organization {organization} already holds counterparty {counterparty}")]
fn existing_link(world: &AssociationWorld, organization: u64, counterparty: u64) {
    world
        .records
        .put_link(OrganizationId(organization), CounterpartyId(counterparty));
}

#[given("organization {organization} is open")]
fn organization_is_open(world: &AssociationWorld, organization: u64) {
    world
        .runtime
        .block_on(world.manager.open(OrganizationId(organization)))
        .expect("organization opens");
}

#[given("the record service drops the next link request")]
fn link_request_dropped(world: &AssociationWorld) {
    world.records.fail_next(
        RecordCall::Link,
        RecordServiceError::transport("connection reset"),
    );
}

#[when("counterparty {counterparty} is linked to organization {organization}")]
fn link_counterparty(world: &AssociationWorld, counterparty: u64, organization: u64) {
    let outcome = world.runtime.block_on(
        world
            .manager
            .link(OrganizationId(organization), CounterpartyId(counterparty)),
    );
    world.record_change(outcome);
}

#[when("counterparty {counterparty} is unlinked from organization {organization}")]
fn unlink_counterparty(world: &AssociationWorld, counterparty: u64, organization: u64) {
    let outcome = world.runtime.block_on(
        world
            .manager
            .unlink(OrganizationId(organization), CounterpartyId(counterparty)),
    );
    world.record_change(outcome);
}

#[then("organization {organization} lists counterparty {counterparty} exactly once")]
fn lists_counterparty_once(world: &AssociationWorld, organization: u64, counterparty: u64) {
    let snapshot = world.manager.snapshot().expect("an organization is open");
    assert_eq!(snapshot.organization.id, Some(OrganizationId(organization)));
    let held = world.held_counterparties();
    let occurrences = held
        .iter()
        .filter(|id| **id == CounterpartyId(counterparty))
        .count();
    assert_eq!(occurrences, 1, "held counterparties: {held:?}");
}

#[then("organization {organization} lists no counterparties")]
fn lists_no_counterparties(world: &AssociationWorld, organization: u64) {
    let snapshot = world.manager.snapshot().expect("an organization is open");
    assert_eq!(snapshot.organization.id, Some(OrganizationId(organization)));
    assert!(snapshot.organization.counterparties.is_empty());
}

#[then("the eligible counterparties are {ids}")]
fn eligible_counterparties(world: &AssociationWorld, ids: String) {
    let eligible: Vec<_> = world
        .manager
        .eligible()
        .into_iter()
        .filter_map(|counterparty| counterparty.id)
        .collect();
    assert_eq!(eligible, parse_ids(&ids));
}

#[then("the organization listing refresh count is {count}")]
fn listing_refresh_count(world: &AssociationWorld, count: usize) {
    assert_eq!(world.listing.refreshes.load(Ordering::SeqCst), count);
}

#[then("the last change failed with code {code}")]
fn last_change_failed(world: &AssociationWorld, code: String) {
    assert_eq!(world.failure().code(), parse_code(&code));
}

#[then("the record service received {count} link requests")]
fn link_requests_received(world: &AssociationWorld, count: usize) {
    assert_eq!(world.records.calls(RecordCall::Link), count);
}

#[then("the latest notice is a success")]
fn latest_notice_is_success(world: &AssociationWorld) {
    let latest = world.notices.snapshot().pop().expect("a notice was posted");
    assert_eq!(latest.kind, NoticeKind::Success);
}

#[then("the latest notice is an error")]
fn latest_notice_is_error(world: &AssociationWorld) {
    let latest = world.notices.snapshot().pop().expect("a notice was posted");
    assert_eq!(latest.kind, NoticeKind::Error);
}

#[scenario(
    path = "tests/features/association.feature",
    name = "Linking an eligible counterparty"
)]
fn linking_an_eligible_counterparty(world: AssociationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/association.feature",
    name = "Linking an already linked counterparty"
)]
fn linking_an_already_linked_counterparty(world: AssociationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/association.feature",
    name = "Unlinking restores eligibility"
)]
fn unlinking_restores_eligibility(world: AssociationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/association.feature",
    name = "A dropped link request leaves the association untouched"
)]
fn dropped_link_request(world: AssociationWorld) {
    drop(world);
}

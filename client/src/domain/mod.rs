//! Domain primitives, services, and ports.
//!
//! Purpose: hold the record types and the stateful client services (address
//! resolution, list query pipelines, association management, notices, record
//! forms, and deletion) independent of any transport. Adapters live under
//! `crate::outbound` and `crate::inbound`.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure reporting.
//! - PostalCode / PostalAddress: normalized lookup keys and lookup results.
//! - Organization / Counterparty and their drafts.
//! - AddressResolver, QueryPipelineHandle, AssociationManager, NoticeQueue,
//!   OrganizationForm, CounterpartyForm, OrganizationRemoval,
//!   CounterpartyRemoval.

pub mod address_resolver;
pub mod association;
pub mod counterparty;
pub mod draft;
pub mod error;
pub mod forms;
pub mod notices;
pub mod organization;
pub mod ports;
pub mod postal;
pub mod query_pipeline;
pub mod removal;

pub use self::address_resolver::AddressResolver;
pub use self::association::{AssociationManager, AssociationSnapshot, ListingRefresh};
pub use self::counterparty::{
    Counterparty, CounterpartyDraft, CounterpartyFilter, CounterpartyId, IndividualDetails,
    OrganizationRef, PersonType,
};
pub use self::draft::DraftError;
pub use self::error::{Error, ErrorCode};
pub use self::forms::{AddressCheck, CounterpartyForm, FormMode, OrganizationForm};
pub use self::notices::{Notice, NoticeId, NoticeKind, NoticeQueue};
pub use self::organization::{CounterpartyRef, Organization, OrganizationDraft, OrganizationId};
pub use self::postal::{AddressFailure, AddressParts, PostalAddress, PostalCode, PostalCodeError};
pub use self::query_pipeline::{
    CounterpartyListing, OrganizationListing, PipelineConfig, QueryPipelineHandle, QuerySource,
    QueryView,
};
pub use self::removal::{CounterpartyRemoval, OrganizationRemoval};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;

//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod counterparty_records;
mod organization_records;
mod postal_lookup;
mod record_service;

#[cfg(test)]
pub use counterparty_records::MockCounterpartyRecords;
pub use counterparty_records::CounterpartyRecords;
#[cfg(test)]
pub use organization_records::MockOrganizationRecords;
pub use organization_records::OrganizationRecords;
#[cfg(test)]
pub use postal_lookup::MockPostalLookupSource;
pub use postal_lookup::{PostalLookupError, PostalLookupSource};
pub use record_service::RecordServiceError;

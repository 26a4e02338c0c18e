//! Record service adapters for organizations and counterparties.

mod dto;
mod http_counterparties;
mod http_organizations;
mod transport;

pub use http_counterparties::HttpCounterpartyRecords;
pub use http_organizations::HttpOrganizationRecords;

//! Postal lookup adapters.
//!
//! [`PrimaryPostalLookup`] calls the record service's own lookup endpoint;
//! [`FallbackPostalLookup`] calls the public provider used when the primary
//! cannot answer.

mod dto;
mod http_source;

pub use http_source::{FallbackPostalLookup, PrimaryPostalLookup};

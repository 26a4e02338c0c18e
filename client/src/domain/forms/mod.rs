//! Create and edit flows for organizations and counterparties.
//!
//! A form owns a draft, remembers whether its postal code was validated by
//! the [`AddressResolver`](crate::domain::AddressResolver), and refuses to
//! submit until it was. Local rule violations surface as warning notices and
//! never reach the record service. A failed submission keeps the draft.

mod counterparty;
mod organization;

pub use self::counterparty::CounterpartyForm;
pub use self::organization::OrganizationForm;

use super::{
    AddressParts, AddressResolver, DraftError, Error, NoticeQueue, PostalAddress, PostalCode,
};

/// Notice posted when submitting before a successful postal code check.
pub const UNVALIDATED_ADDRESS: &str = "validate the postal code before saving";

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    /// Submitting creates a record.
    Create,
    /// Submitting updates the record with this id.
    Edit(Id),
}

/// Postal code validation state of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCheck {
    address: Option<PostalAddress>,
}

impl AddressCheck {
    /// Resolve `raw` and remember the outcome.
    pub async fn check(&mut self, resolver: &AddressResolver, raw: &str) -> &PostalAddress {
        let address = resolver.resolve(raw).await;
        self.address.insert(address)
    }

    /// Mark a stored record's address as already validated.
    pub fn accept(&mut self, address: PostalAddress) {
        self.address = Some(address);
    }

    /// Forget the last outcome; the postal code must be checked again.
    pub fn invalidate(&mut self) {
        self.address = None;
    }

    /// Whether the last check produced a valid address.
    pub fn is_validated(&self) -> bool {
        self.address.as_ref().is_some_and(PostalAddress::is_valid)
    }

    /// Outcome of the last check.
    pub fn address(&self) -> Option<&PostalAddress> {
        self.address.as_ref()
    }

    /// Failure reason of the last check, if it failed.
    pub fn failure_reason(&self) -> Option<String> {
        self.address.as_ref().and_then(PostalAddress::failure_reason)
    }

    /// Normalized postal code of a successful check.
    fn validated_code(&self) -> Option<&str> {
        self.address
            .as_ref()
            .filter(|address| address.is_valid())
            .map(PostalAddress::postal_code)
    }
}

/// Refuse submission unless the address is validated and the draft is clean.
///
/// Posts a warning notice for the first problem found.
fn gate_submission(
    notices: &NoticeQueue,
    address: &AddressCheck,
    validation: Result<(), DraftError>,
) -> Result<String, Error> {
    let Some(code) = address.validated_code() else {
        notices.warning(UNVALIDATED_ADDRESS);
        return Err(Error::invalid_request(UNVALIDATED_ADDRESS));
    };
    if let Err(rule) = validation {
        let message = rule.to_string();
        notices.warning(message.as_str());
        return Err(Error::invalid_request(message));
    }
    Ok(code.to_owned())
}

/// Address of a stored record, accepted as validated when it has a state code.
fn stored_address(parts: Option<AddressParts>, postal_code: &str) -> Option<PostalAddress> {
    let parts = parts.filter(|parts| !parts.state_code.is_empty())?;
    let code = PostalCode::parse(postal_code).ok()?;
    Some(PostalAddress::resolved(&code, parts))
}

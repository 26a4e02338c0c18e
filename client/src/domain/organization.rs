//! Organization records and the counterparty references they carry.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;

use super::counterparty::{CounterpartyId, PersonType};
use super::draft::{DraftError, require_digits, require_non_blank, require_postal_code};
use super::postal::AddressParts;

/// Record-service identifier of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrganizationId(pub u64);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Denormalized view of a counterparty linked to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyRef {
    /// Counterparty identifier.
    pub id: CounterpartyId,
    /// CPF (11 digits) or CNPJ (14 digits).
    pub tax_id: String,
    /// Individual or legal entity.
    pub person_type: PersonType,
    /// Counterparty name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
}

/// Organization as reported by the record service.
///
/// `counterparties` is a read-through cache of the association table. It is
/// only trustworthy right after the call that returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Identifier, absent until persisted.
    pub id: Option<OrganizationId>,
    /// CNPJ, 14 digits.
    pub tax_id: String,
    /// Trade name.
    pub display_name: String,
    /// Normalized postal code.
    pub postal_code: String,
    /// Address resolved from the postal code, when known.
    pub address: Option<AddressParts>,
    /// Linked counterparties, in service order.
    pub counterparties: Vec<CounterpartyRef>,
    /// Creation timestamp reported by the service.
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp reported by the service.
    pub updated_at: Option<NaiveDateTime>,
}

impl Organization {
    /// Identifiers of every linked counterparty.
    pub fn counterparty_ids(&self) -> BTreeSet<CounterpartyId> {
        self.counterparties.iter().map(|reference| reference.id).collect()
    }

    /// Whether `counterparty` currently appears in the reference list.
    pub fn is_linked_to(&self, counterparty: CounterpartyId) -> bool {
        self.counterparties
            .iter()
            .any(|reference| reference.id == counterparty)
    }
}

/// Submit payload for creating or updating an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationDraft {
    /// CNPJ digits.
    pub tax_id: String,
    /// Trade name.
    pub display_name: String,
    /// Postal code as typed; normalized before submission.
    pub postal_code: String,
}

impl OrganizationDraft {
    /// Draft pre-filled from an existing record, for edit flows.
    pub fn from_record(organization: &Organization) -> Self {
        Self {
            tax_id: organization.tax_id.clone(),
            display_name: organization.display_name.clone(),
            postal_code: organization.postal_code.clone(),
        }
    }

    /// Check the required fields before anything is sent to the service.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    ///
    /// # Examples
    /// ```
    /// use registry_client::domain::OrganizationDraft;
    ///
    /// let draft = OrganizationDraft {
    ///     tax_id: "11222333000181".to_owned(),
    ///     display_name: "Acme".to_owned(),
    ///     postal_code: "01310-100".to_owned(),
    /// };
    /// assert!(draft.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), DraftError> {
        require_digits("CNPJ", &self.tax_id, 14)?;
        require_non_blank("trade name", &self.display_name)?;
        require_postal_code(&self.postal_code)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for organization helpers and draft validation.

    use super::*;
    use rstest::rstest;

    fn reference(id: u64) -> CounterpartyRef {
        CounterpartyRef {
            id: CounterpartyId(id),
            tax_id: "12345678901".to_owned(),
            person_type: PersonType::Individual,
            name: format!("Counterparty {id}"),
            email: format!("c{id}@example.com"),
        }
    }

    fn valid_draft() -> OrganizationDraft {
        OrganizationDraft {
            tax_id: "11222333000181".to_owned(),
            display_name: "Acme".to_owned(),
            postal_code: "01310100".to_owned(),
        }
    }

    #[test]
    fn linked_ids_follow_reference_list() {
        let organization = Organization {
            id: Some(OrganizationId(5)),
            tax_id: "11222333000181".to_owned(),
            display_name: "Acme".to_owned(),
            postal_code: "01310100".to_owned(),
            address: None,
            counterparties: vec![reference(9), reference(3)],
            created_at: None,
            updated_at: None,
        };
        assert!(organization.is_linked_to(CounterpartyId(9)));
        assert!(!organization.is_linked_to(CounterpartyId(4)));
        assert_eq!(
            organization.counterparty_ids(),
            BTreeSet::from([CounterpartyId(3), CounterpartyId(9)])
        );
    }

    #[rstest]
    #[case::short_cnpj(OrganizationDraft { tax_id: "1122233300018".to_owned(), ..valid_draft() }, "CNPJ must contain 14 digits")]
    #[case::blank_name(OrganizationDraft { display_name: "  ".to_owned(), ..valid_draft() }, "trade name is required")]
    #[case::bad_postal_code(OrganizationDraft { postal_code: "0131".to_owned(), ..valid_draft() }, "postal code must contain 8 digits")]
    fn rejects_invalid_drafts(#[case] draft: OrganizationDraft, #[case] message: &str) {
        let error = draft.validate().expect_err("draft should be rejected");
        assert_eq!(error.to_string(), message);
    }
}

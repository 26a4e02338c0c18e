//! Counterparty records, person types, and the counterparty submit draft.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use super::draft::{
    DraftError, require_digits, require_email, require_max_chars, require_non_blank,
    require_postal_code,
};
use super::organization::OrganizationId;
use super::postal::AddressParts;

/// Longest accepted counterparty name, in characters.
pub const NAME_MAX_CHARS: usize = 200;

/// Record-service identifier of a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterpartyId(pub u64);

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Legal nature of a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PersonType {
    /// Natural person, identified by an 11-digit CPF.
    Individual,
    /// Legal entity, identified by a 14-digit CNPJ.
    #[default]
    LegalEntity,
}

impl PersonType {
    /// Number of digits of the tax id for this person type.
    pub const fn tax_id_digits(self) -> usize {
        match self {
            Self::Individual => 11,
            Self::LegalEntity => 14,
        }
    }

    const fn tax_id_label(self) -> &'static str {
        match self {
            Self::Individual => "CPF",
            Self::LegalEntity => "CNPJ",
        }
    }
}

/// Fields only individuals carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualDetails {
    /// RG document number.
    pub national_id: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
}

/// Denormalized view of an organization linked to a counterparty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRef {
    /// Organization identifier.
    pub id: OrganizationId,
    /// CNPJ.
    pub tax_id: String,
    /// Trade name.
    pub display_name: String,
    /// Normalized postal code.
    pub postal_code: String,
    /// City, when resolved.
    pub city: Option<String>,
    /// State code, when resolved.
    pub state_code: Option<String>,
}

/// Counterparty as reported by the record service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterparty {
    /// Identifier, absent until persisted.
    pub id: Option<CounterpartyId>,
    /// CPF or CNPJ digits.
    pub tax_id: String,
    /// Individual or legal entity.
    pub person_type: PersonType,
    /// Name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Normalized postal code.
    pub postal_code: String,
    /// Present for individuals only.
    pub individual: Option<IndividualDetails>,
    /// Address resolved from the postal code, when known.
    pub address: Option<AddressParts>,
    /// Linked organizations, in service order.
    pub organizations: Vec<OrganizationRef>,
    /// Creation timestamp reported by the service.
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp reported by the service.
    pub updated_at: Option<NaiveDateTime>,
}

/// List filter for the counterparty screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CounterpartyFilter {
    /// Name fragment; blank matches everything.
    pub name: String,
    /// Tax id fragment; blank matches everything.
    pub tax_id: String,
}

impl CounterpartyFilter {
    /// Filter matching every counterparty.
    pub fn unfiltered() -> Self {
        Self::default()
    }
}

/// Submit payload for creating or updating a counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterpartyDraft {
    /// CPF or CNPJ digits.
    pub tax_id: String,
    /// Individual or legal entity.
    pub person_type: PersonType,
    /// Name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Postal code as typed; normalized before submission.
    pub postal_code: String,
    /// RG; required for individuals, dropped for legal entities.
    pub national_id: Option<String>,
    /// Birth date; required for individuals, dropped for legal entities.
    pub birth_date: Option<NaiveDate>,
}

impl CounterpartyDraft {
    /// Draft pre-filled from an existing record, for edit flows.
    pub fn from_record(counterparty: &Counterparty) -> Self {
        let (national_id, birth_date) = match &counterparty.individual {
            Some(details) => (Some(details.national_id.clone()), Some(details.birth_date)),
            None => (None, None),
        };
        Self {
            tax_id: counterparty.tax_id.clone(),
            person_type: counterparty.person_type,
            name: counterparty.name.clone(),
            email: counterparty.email.clone(),
            postal_code: counterparty.postal_code.clone(),
            national_id,
            birth_date,
        }
    }

    /// Change the person type.
    ///
    /// The tax id is cleared because its length depends on the type; moving to
    /// [`PersonType::LegalEntity`] also clears the individual-only fields.
    pub fn set_person_type(&mut self, person_type: PersonType) {
        self.person_type = person_type;
        self.tax_id.clear();
        if person_type == PersonType::LegalEntity {
            self.national_id = None;
            self.birth_date = None;
        }
    }

    /// Check the required fields before anything is sent to the service.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft violates.
    pub fn validate(&self) -> Result<(), DraftError> {
        require_digits(
            self.person_type.tax_id_label(),
            &self.tax_id,
            self.person_type.tax_id_digits(),
        )?;
        require_non_blank("name", &self.name)?;
        require_max_chars("name", &self.name, NAME_MAX_CHARS)?;
        require_email(&self.email)?;
        require_postal_code(&self.postal_code)?;
        if self.person_type == PersonType::Individual {
            require_non_blank("RG", self.national_id.as_deref().unwrap_or_default())?;
            if self.birth_date.is_none() {
                return Err(DraftError::Required {
                    field: "birth date",
                });
            }
        }
        Ok(())
    }

    /// Individual-only fields as they should be submitted.
    ///
    /// Always `None` for legal entities, whatever the draft still holds.
    pub fn individual_details(&self) -> Option<IndividualDetails> {
        if self.person_type != PersonType::Individual {
            return None;
        }
        Some(IndividualDetails {
            national_id: self.national_id.clone()?,
            birth_date: self.birth_date?,
        })
    }
}

//! JSON views printed by the command surface.
//!
//! Domain records stay free of serialization concerns; these views decide the
//! printed shape.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{
    AddressParts, AssociationSnapshot, Counterparty, CounterpartyRef, Error, ErrorCode, Notice,
    Organization, OrganizationRef, PersonType, PostalAddress,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddressView {
    postal_code: String,
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
}

impl From<&PostalAddress> for AddressView {
    fn from(address: &PostalAddress) -> Self {
        let parts = address.is_valid().then(|| address.parts());
        Self {
            postal_code: address.postal_code().to_owned(),
            is_valid: address.is_valid(),
            state_code: parts.map(|parts| parts.state_code.clone()),
            city: parts.map(|parts| parts.city.clone()),
            neighborhood: parts.map(|parts| parts.neighborhood.clone()),
            street: parts.map(|parts| parts.street.clone()),
            failure_reason: address.failure_reason(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartsView {
    state_code: String,
    city: String,
    neighborhood: String,
    street: String,
}

impl From<AddressParts> for PartsView {
    fn from(parts: AddressParts) -> Self {
        Self {
            state_code: parts.state_code,
            city: parts.city,
            neighborhood: parts.neighborhood,
            street: parts.street,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum PersonTypeView {
    Individual,
    LegalEntity,
}

impl From<PersonType> for PersonTypeView {
    fn from(value: PersonType) -> Self {
        match value {
            PersonType::Individual => Self::Individual,
            PersonType::LegalEntity => Self::LegalEntity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CounterpartyRefView {
    id: u64,
    tax_id: String,
    person_type: PersonTypeView,
    name: String,
    email: String,
}

impl From<CounterpartyRef> for CounterpartyRefView {
    fn from(reference: CounterpartyRef) -> Self {
        Self {
            id: reference.id.0,
            tax_id: reference.tax_id,
            person_type: reference.person_type.into(),
            name: reference.name,
            email: reference.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrganizationView {
    id: Option<u64>,
    tax_id: String,
    display_name: String,
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<PartsView>,
    counterparties: Vec<CounterpartyRefView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<NaiveDateTime>,
}

impl From<Organization> for OrganizationView {
    fn from(organization: Organization) -> Self {
        Self {
            id: organization.id.map(|id| id.0),
            tax_id: organization.tax_id,
            display_name: organization.display_name,
            postal_code: organization.postal_code,
            address: organization.address.map(PartsView::from),
            counterparties: organization
                .counterparties
                .into_iter()
                .map(CounterpartyRefView::from)
                .collect(),
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationRefView {
    id: u64,
    tax_id: String,
    display_name: String,
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_code: Option<String>,
}

impl From<OrganizationRef> for OrganizationRefView {
    fn from(reference: OrganizationRef) -> Self {
        Self {
            id: reference.id.0,
            tax_id: reference.tax_id,
            display_name: reference.display_name,
            postal_code: reference.postal_code,
            city: reference.city,
            state_code: reference.state_code,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CounterpartyView {
    id: Option<u64>,
    tax_id: String,
    person_type: PersonTypeView,
    name: String,
    email: String,
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<PartsView>,
    organizations: Vec<OrganizationRefView>,
}

impl From<Counterparty> for CounterpartyView {
    fn from(counterparty: Counterparty) -> Self {
        let (national_id, birth_date) = counterparty
            .individual
            .map(|details| (Some(details.national_id), Some(details.birth_date)))
            .unwrap_or_default();
        Self {
            id: counterparty.id.map(|id| id.0),
            tax_id: counterparty.tax_id,
            person_type: counterparty.person_type.into(),
            name: counterparty.name,
            email: counterparty.email,
            postal_code: counterparty.postal_code,
            national_id,
            birth_date,
            address: counterparty.address.map(PartsView::from),
            organizations: counterparty
                .organizations
                .into_iter()
                .map(OrganizationRefView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AssociationView {
    organization: OrganizationView,
    eligible: Vec<CounterpartyView>,
}

impl From<AssociationSnapshot> for AssociationView {
    fn from(snapshot: AssociationSnapshot) -> Self {
        Self {
            organization: snapshot.organization.into(),
            eligible: snapshot
                .eligible
                .into_iter()
                .map(CounterpartyView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DeletedView {
    deleted: u64,
}

impl DeletedView {
    pub(super) const fn new(id: u64) -> Self {
        Self { deleted: id }
    }
}

#[derive(Debug, Serialize)]
struct ErrorView {
    code: &'static str,
    message: String,
}

impl From<&Error> for ErrorView {
    fn from(error: &Error) -> Self {
        let code = match error.code() {
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::InternalError => "internal_error",
        };
        Self {
            code,
            message: error.message().to_owned(),
        }
    }
}

/// Everything one command prints: its result or error, plus the notices it
/// posted.
#[derive(Debug, Serialize)]
pub(super) struct CommandReport<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorView>,
    notices: Vec<Notice>,
}

impl<T: Serialize> CommandReport<T> {
    pub(super) fn new(outcome: Result<T, Error>, notices: Vec<Notice>) -> Self {
        match outcome {
            Ok(result) => Self {
                result: Some(result),
                error: None,
                notices,
            },
            Err(error) => Self {
                result: None,
                error: Some(ErrorView::from(&error)),
                notices,
            },
        }
    }
}

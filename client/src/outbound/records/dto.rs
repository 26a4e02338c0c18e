//! Wire DTOs for the record service.
//!
//! Responses decode into these DTOs first and map into domain records in one
//! pass. Timestamps are parsed leniently: an unreadable value becomes `None`
//! rather than failing the whole payload.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AddressParts, Counterparty, CounterpartyDraft, CounterpartyId, CounterpartyRef,
    IndividualDetails, Organization, OrganizationDraft, OrganizationId, OrganizationRef,
    PersonType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(super) enum PersonTypeDto {
    #[serde(rename = "FISICA")]
    Fisica,
    #[serde(rename = "JURIDICA")]
    Juridica,
}

impl From<PersonTypeDto> for PersonType {
    fn from(value: PersonTypeDto) -> Self {
        match value {
            PersonTypeDto::Fisica => Self::Individual,
            PersonTypeDto::Juridica => Self::LegalEntity,
        }
    }
}

impl From<PersonType> for PersonTypeDto {
    fn from(value: PersonType) -> Self {
        match value {
            PersonType::Individual => Self::Fisica,
            PersonType::LegalEntity => Self::Juridica,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrganizationDto {
    pub(super) id: Option<u64>,
    #[serde(default)]
    pub(super) cnpj: String,
    #[serde(default)]
    pub(super) nome_fantasia: String,
    #[serde(default)]
    pub(super) cep: String,
    pub(super) logradouro: Option<String>,
    pub(super) bairro: Option<String>,
    pub(super) cidade: Option<String>,
    pub(super) uf: Option<String>,
    pub(super) criado_em: Option<String>,
    pub(super) atualizado_em: Option<String>,
    #[serde(default)]
    pub(super) fornecedores: Vec<CounterpartyRefDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CounterpartyRefDto {
    pub(super) id: u64,
    #[serde(default)]
    pub(super) cpf_cnpj: String,
    pub(super) tipo_pessoa: PersonTypeDto,
    #[serde(default)]
    pub(super) nome: String,
    #[serde(default)]
    pub(super) email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CounterpartyDto {
    pub(super) id: Option<u64>,
    #[serde(default)]
    pub(super) cpf_cnpj: String,
    pub(super) tipo_pessoa: PersonTypeDto,
    #[serde(default)]
    pub(super) nome: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) cep: String,
    pub(super) rg: Option<String>,
    pub(super) data_nascimento: Option<NaiveDate>,
    pub(super) logradouro: Option<String>,
    pub(super) bairro: Option<String>,
    pub(super) cidade: Option<String>,
    pub(super) uf: Option<String>,
    pub(super) criado_em: Option<String>,
    pub(super) atualizado_em: Option<String>,
    #[serde(default)]
    pub(super) empresas: Vec<OrganizationRefDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrganizationRefDto {
    pub(super) id: u64,
    #[serde(default)]
    pub(super) cnpj: String,
    #[serde(default)]
    pub(super) nome_fantasia: String,
    #[serde(default)]
    pub(super) cep: String,
    pub(super) cidade: Option<String>,
    pub(super) uf: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrganizationRequestDto<'a> {
    pub(super) cnpj: &'a str,
    pub(super) nome_fantasia: &'a str,
    pub(super) cep: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CounterpartyRequestDto<'a> {
    pub(super) cpf_cnpj: &'a str,
    pub(super) tipo_pessoa: PersonTypeDto,
    pub(super) nome: &'a str,
    pub(super) email: &'a str,
    pub(super) cep: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) rg: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) data_nascimento: Option<NaiveDate>,
}

/// Error body written by the record service.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) errors: BTreeMap<String, String>,
}

impl ApiErrorDto {
    /// Human-readable message, falling back to the field errors.
    pub(super) fn into_message(self) -> Option<String> {
        let message = self.message.map(|message| message.trim().to_owned());
        if let Some(message) = message.filter(|message| !message.is_empty()) {
            return Some(message);
        }
        let joined = self
            .errors
            .into_iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect::<Vec<_>>()
            .join("; ");
        (!joined.is_empty()).then_some(joined)
    }
}

impl<'a> From<&'a OrganizationDraft> for OrganizationRequestDto<'a> {
    fn from(draft: &'a OrganizationDraft) -> Self {
        Self {
            cnpj: &draft.tax_id,
            nome_fantasia: &draft.display_name,
            cep: &draft.postal_code,
        }
    }
}

impl<'a> From<&'a CounterpartyDraft> for CounterpartyRequestDto<'a> {
    fn from(draft: &'a CounterpartyDraft) -> Self {
        let individual = draft.person_type == PersonType::Individual;
        Self {
            cpf_cnpj: &draft.tax_id,
            tipo_pessoa: draft.person_type.into(),
            nome: &draft.name,
            email: &draft.email,
            cep: &draft.postal_code,
            rg: draft.national_id.as_deref().filter(|_| individual),
            data_nascimento: draft.birth_date.filter(|_| individual),
        }
    }
}

impl OrganizationDto {
    pub(super) fn into_domain(self) -> Organization {
        Organization {
            id: self.id.map(OrganizationId),
            tax_id: self.cnpj,
            display_name: self.nome_fantasia,
            postal_code: self.cep,
            address: address_parts(self.uf, self.cidade, self.bairro, self.logradouro),
            counterparties: self
                .fornecedores
                .into_iter()
                .map(CounterpartyRefDto::into_domain)
                .collect(),
            created_at: lenient_timestamp(self.criado_em.as_deref()),
            updated_at: lenient_timestamp(self.atualizado_em.as_deref()),
        }
    }
}

impl CounterpartyRefDto {
    fn into_domain(self) -> CounterpartyRef {
        CounterpartyRef {
            id: CounterpartyId(self.id),
            tax_id: self.cpf_cnpj,
            person_type: self.tipo_pessoa.into(),
            name: self.nome,
            email: self.email,
        }
    }
}

impl CounterpartyDto {
    pub(super) fn into_domain(self) -> Counterparty {
        let person_type = PersonType::from(self.tipo_pessoa);
        let individual = match (person_type, self.rg, self.data_nascimento) {
            (PersonType::Individual, Some(national_id), Some(birth_date)) => {
                Some(IndividualDetails {
                    national_id,
                    birth_date,
                })
            }
            _ => None,
        };
        Counterparty {
            id: self.id.map(CounterpartyId),
            tax_id: self.cpf_cnpj,
            person_type,
            name: self.nome,
            email: self.email,
            postal_code: self.cep,
            individual,
            address: address_parts(self.uf, self.cidade, self.bairro, self.logradouro),
            organizations: self
                .empresas
                .into_iter()
                .map(OrganizationRefDto::into_domain)
                .collect(),
            created_at: lenient_timestamp(self.criado_em.as_deref()),
            updated_at: lenient_timestamp(self.atualizado_em.as_deref()),
        }
    }
}

impl OrganizationRefDto {
    fn into_domain(self) -> OrganizationRef {
        OrganizationRef {
            id: OrganizationId(self.id),
            tax_id: self.cnpj,
            display_name: self.nome_fantasia,
            postal_code: self.cep,
            city: self.cidade,
            state_code: self.uf,
        }
    }
}

/// Address parts when the service sent at least one of them.
fn address_parts(
    state_code: Option<String>,
    city: Option<String>,
    neighborhood: Option<String>,
    street: Option<String>,
) -> Option<AddressParts> {
    if state_code.is_none() && city.is_none() && neighborhood.is_none() && street.is_none() {
        return None;
    }
    Some(AddressParts {
        state_code: state_code.unwrap_or_default(),
        city: city.unwrap_or_default(),
        neighborhood: neighborhood.unwrap_or_default(),
        street: street.unwrap_or_default(),
    })
}

/// Local date-time with optional fraction, or an RFC 3339 instant.
fn lenient_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|instant| instant.naive_utc())
        })
}

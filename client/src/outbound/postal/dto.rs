//! DTOs for decoding postal lookup responses.

use serde::{Deserialize, Deserializer};

use crate::domain::AddressParts;

/// Answer of the record service's lookup endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct PrimaryLookupDto {
    #[serde(default, rename = "uf", alias = "stateCode")]
    pub(super) state_code: Option<String>,
    #[serde(default, rename = "cidade", alias = "city")]
    pub(super) city: Option<String>,
    #[serde(default, rename = "bairro", alias = "neighborhood")]
    pub(super) neighborhood: Option<String>,
    #[serde(default, rename = "logradouro", alias = "street")]
    pub(super) street: Option<String>,
    #[serde(default = "valid_by_default", rename = "valido", alias = "isValid")]
    pub(super) valid: bool,
    #[serde(default, rename = "mensagem", alias = "message")]
    pub(super) message: Option<String>,
}

const fn valid_by_default() -> bool {
    true
}

/// Outcome of a primary lookup once the validity flag is read.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum PrimaryOutcome {
    Found(AddressParts),
    Refused(String),
}

impl PrimaryLookupDto {
    pub(super) fn into_outcome(self) -> PrimaryOutcome {
        if self.valid {
            PrimaryOutcome::Found(AddressParts {
                state_code: self.state_code.unwrap_or_default(),
                city: self.city.unwrap_or_default(),
                neighborhood: self.neighborhood.unwrap_or_default(),
                street: self.street.unwrap_or_default(),
            })
        } else {
            let message = self
                .message
                .map(|message| message.trim().to_owned())
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "postal code rejected".to_owned());
            PrimaryOutcome::Refused(message)
        }
    }
}

/// Answer of the public fallback provider.
#[derive(Debug, Deserialize)]
pub(super) struct FallbackLookupDto {
    #[serde(default)]
    pub(super) uf: Option<String>,
    #[serde(default)]
    pub(super) localidade: Option<String>,
    #[serde(default)]
    pub(super) bairro: Option<String>,
    #[serde(default)]
    pub(super) logradouro: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub(super) erro: bool,
}

impl FallbackLookupDto {
    /// Address parts, or `None` when the provider flagged the code unknown.
    pub(super) fn into_parts(self) -> Option<AddressParts> {
        if self.erro {
            return None;
        }
        Some(AddressParts {
            state_code: self.uf.unwrap_or_default(),
            city: self.localidade.unwrap_or_default(),
            neighborhood: self.bairro.unwrap_or_default(),
            street: self.logradouro.unwrap_or_default(),
        })
    }
}

/// The provider has sent `erro` both as a boolean and as the string `"true"`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(flag) => flag,
        Flag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
    })
}

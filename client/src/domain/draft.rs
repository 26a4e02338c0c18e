//! Field rules shared by the organization and counterparty drafts.

use thiserror::Error;

use super::postal::PostalCode;

/// First rule a draft violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// A required field is blank.
    #[error("{field} is required")]
    Required { field: &'static str },
    /// A digits-only field has the wrong length or non-digit characters.
    #[error("{field} must contain {digits} digits")]
    DigitCount { field: &'static str, digits: usize },
    /// A free-text field is too long.
    #[error("{field} must have at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    /// The e-mail address is not plausible.
    #[error("e-mail is invalid")]
    InvalidEmail,
    /// The postal code does not normalize to eight digits.
    #[error("postal code must contain 8 digits")]
    PostalCode,
}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), DraftError> {
    if value.trim().is_empty() {
        return Err(DraftError::Required { field });
    }
    Ok(())
}

pub(crate) fn require_digits(
    field: &'static str,
    value: &str,
    digits: usize,
) -> Result<(), DraftError> {
    if value.len() != digits || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(DraftError::DigitCount { field, digits });
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), DraftError> {
    if value.chars().count() > max {
        return Err(DraftError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), DraftError> {
    require_non_blank("e-mail", value)?;
    let Some((local, domain)) = value.trim().split_once('@') else {
        return Err(DraftError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(DraftError::InvalidEmail);
    }
    Ok(())
}

pub(crate) fn require_postal_code(value: &str) -> Result<(), DraftError> {
    PostalCode::parse(value)
        .map(|_| ())
        .map_err(|_| DraftError::PostalCode)
}

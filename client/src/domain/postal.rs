//! Postal codes and resolved postal addresses.
//!
//! A [`PostalCode`] only exists in normalized form: exactly eight ASCII
//! digits. A [`PostalAddress`] is the immutable outcome of one lookup; it is
//! either valid and carries the address parts, or invalid and carries an
//! [`AddressFailure`].

use std::fmt;

use thiserror::Error;

/// Number of digits in a normalized postal code.
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Validation error raised by [`PostalCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("postal code must contain 8 digits")]
pub struct PostalCodeError {
    normalized: String,
}

impl PostalCodeError {
    /// The digits that remained after normalization.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Normalized eight-digit postal code.
///
/// # Examples
/// ```
/// use registry_client::domain::PostalCode;
///
/// let code = PostalCode::parse("01310-100").expect("valid code");
/// assert_eq!(code.as_str(), "01310100");
/// assert!(PostalCode::parse("1310-100").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostalCode(String);

impl PostalCode {
    /// Strip every non-digit character from `raw`.
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(char::is_ascii_digit).collect()
    }

    /// Normalize `raw` and accept it when exactly eight digits remain.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError`] carrying the normalized digits when the
    /// digit count is not eight.
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        let normalized = Self::normalize(raw);
        if normalized.len() == POSTAL_CODE_DIGITS {
            Ok(Self(normalized))
        } else {
            Err(PostalCodeError { normalized })
        }
    }

    /// The eight digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address parts returned by a postal lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    /// Two-letter federative unit code (`SP`, `PR`, ...).
    pub state_code: String,
    /// City name.
    pub city: String,
    /// Neighbourhood name.
    pub neighborhood: String,
    /// Street name.
    pub street: String,
}

/// Reason a postal lookup did not produce a valid address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressFailure {
    /// Fewer or more than eight digits after normalization.
    #[error("postal code must contain 8 digits")]
    MalformedCode,
    /// The fallback service reported the code as unknown.
    #[error("postal code not found")]
    NotFound,
    /// The fallback service could not be reached or answered with a failure.
    #[error("lookup error")]
    LookupError,
    /// The primary service answered and explicitly rejected the code.
    #[error("{0}")]
    Rejected(String),
}

/// Outcome of one postal code lookup.
///
/// Instances are never mutated; a new lookup always builds a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    postal_code: String,
    parts: AddressParts,
    failure: Option<AddressFailure>,
}

impl PostalAddress {
    /// Valid address for `code`.
    pub fn resolved(code: &PostalCode, parts: AddressParts) -> Self {
        Self {
            postal_code: code.as_str().to_owned(),
            parts,
            failure: None,
        }
    }

    /// Invalid result for the normalized digits `postal_code`.
    pub fn invalid(postal_code: impl Into<String>, failure: AddressFailure) -> Self {
        Self {
            postal_code: postal_code.into(),
            parts: AddressParts::default(),
            failure: Some(failure),
        }
    }

    /// Normalized postal code digits.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Two-letter state code, empty when invalid.
    pub fn state_code(&self) -> &str {
        &self.parts.state_code
    }

    /// City, empty when invalid.
    pub fn city(&self) -> &str {
        &self.parts.city
    }

    /// Neighbourhood, empty when invalid.
    pub fn neighborhood(&self) -> &str {
        &self.parts.neighborhood
    }

    /// Street, empty when invalid.
    pub fn street(&self) -> &str {
        &self.parts.street
    }

    /// Address parts.
    pub fn parts(&self) -> &AddressParts {
        &self.parts
    }

    /// Whether the lookup produced a usable address.
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// Why the lookup failed, if it did.
    pub fn failure(&self) -> Option<&AddressFailure> {
        self.failure.as_ref()
    }

    /// Failure reason rendered as text.
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.as_ref().map(ToString::to_string)
    }
}

//! Syntactic mailbox address handling.
//!
//! The simulator only needs a `local@domain.tld`-shaped check, not the full
//! RFC 5321 grammar: an address is accepted when it has exactly one `@`, a
//! non-empty local part, a dotted domain with non-empty labels, and no
//! whitespace anywhere.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a mailbox address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty input.
    #[error("empty address")]
    Empty,

    /// No `@` separator between local part and domain.
    #[error("missing '@' separator")]
    MissingAtSign,

    /// More than one `@` separator.
    #[error("multiple '@' separators")]
    MultipleAtSigns,

    /// Whitespace anywhere in the address.
    #[error("address contains whitespace")]
    Whitespace,

    /// Empty or malformed local part.
    #[error("invalid local part: {0:?}")]
    InvalidLocalPart(String),

    /// Domain is empty, undotted, or has an empty label.
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),
}

/// A parsed `local@domain` mailbox address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub local_part: String,
    pub domain: String,
}

impl Address {
    /// Parse an address from its textual form.
    ///
    /// # Errors
    /// Returns an [`AddressError`] describing the first constraint the input
    /// violates.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        if input.is_empty() {
            return Err(AddressError::Empty);
        }

        if input.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace);
        }

        let mut parts = input.split('@');
        let (local_part, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(_), None, _) => return Err(AddressError::MissingAtSign),
            (_, _, Some(_)) => return Err(AddressError::MultipleAtSigns),
            (Some(local), Some(domain), None) => (local, domain),
            (None, ..) => return Err(AddressError::Empty),
        };

        if local_part.is_empty() {
            return Err(AddressError::InvalidLocalPart(local_part.to_string()));
        }

        let dotted = domain.contains('.');
        if !dotted || domain.split('.').any(str::is_empty) {
            return Err(AddressError::InvalidDomain(domain.to_string()));
        }

        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_plain_address() {
        let address = Address::parse("recipient@example.com").expect("valid address");
        assert_eq!(address.local_part, "recipient");
        assert_eq!(address.domain, "example.com");
        assert_eq!(address.to_string(), "recipient@example.com");
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Address::parse(""), Err(AddressError::Empty));
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert_eq!(Address::parse("not-an-email"), Err(AddressError::MissingAtSign));
    }

    #[test]
    fn rejects_multiple_at_signs() {
        assert_eq!(
            Address::parse("a@b@example.com"),
            Err(AddressError::MultipleAtSigns)
        );
    }

    #[test]
    fn rejects_whitespace() {
        assert_eq!(
            Address::parse("user name@example.com"),
            Err(AddressError::Whitespace)
        );
        assert_eq!(
            Address::parse("user@exa mple.com"),
            Err(AddressError::Whitespace)
        );
    }

    #[test]
    fn rejects_empty_local_part() {
        assert_eq!(
            Address::parse("@example.com"),
            Err(AddressError::InvalidLocalPart(String::new()))
        );
    }

    #[test]
    fn rejects_undotted_domain() {
        assert_eq!(
            Address::parse("user@localhost"),
            Err(AddressError::InvalidDomain("localhost".to_string()))
        );
    }

    #[test]
    fn rejects_empty_domain_label() {
        assert_eq!(
            Address::parse("user@example."),
            Err(AddressError::InvalidDomain("example.".to_string()))
        );
        assert_eq!(
            Address::parse("user@.com"),
            Err(AddressError::InvalidDomain(".com".to_string()))
        );
    }
}

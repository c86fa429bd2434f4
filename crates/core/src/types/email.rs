//! Login email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain whitespace")]
    Whitespace,
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs something before the @")]
    EmptyLocalPart,
    #[error("email domain must be a host name like example.com")]
    InvalidDomain,
}

/// A syntactically valid email address, stored as the user typed it.
///
/// Two addresses name the same account when their [`normalized`] forms are
/// equal, so `Ana@Example.com` and `ana@example.com` collide on register.
///
/// Accepted: no whitespace, at most 254 bytes, one `@` with a non-empty
/// local part, and a dotted domain without empty labels.
///
/// ```
/// use recipe_finder_core::Email;
///
/// assert!(Email::parse("chef+sauces@kitchen.example.org").is_ok());
/// assert!(Email::parse("chef@localhost").is_err());
/// assert!(Email::parse("chef@@kitchen.org").is_err());
/// ```
///
/// [`normalized`]: Email::normalized
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub const MAX_LENGTH: usize = 254;

    /// Validate `s` as an address.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the input trips over.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s.len() {
            0 => return Err(EmailError::Empty),
            n if n > Self::MAX_LENGTH => {
                return Err(EmailError::TooLong {
                    max: Self::MAX_LENGTH,
                });
            }
            _ => {}
        }
        if s.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailError::AtSymbol);
        };
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for uniqueness checks and lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether both addresses name the same account.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for ok in [
            "cook@example.com",
            "first.last@mail.example.co.uk",
            "cook+desserts@example.com",
            "x@y.z",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("cook"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("a@b@example.com"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("co ok@example.com"), Err(EmailError::Whitespace));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::EmptyLocalPart));
        for bad_domain in ["cook@", "cook@localhost", "cook@example.", "cook@.com"] {
            assert_eq!(Email::parse(bad_domain), Err(EmailError::InvalidDomain));
        }

        let long = format!("{}@example.com", "c".repeat(Email::MAX_LENGTH));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_case_is_kept_but_ignored_for_matching() {
        let typed = Email::parse("Ana@Example.COM").unwrap();
        let lower = Email::parse("ana@example.com").unwrap();
        assert_eq!(typed.as_str(), "Ana@Example.COM");
        assert_eq!(typed.normalized(), "ana@example.com");
        assert!(typed.matches(&lower));
        assert_ne!(typed, lower);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("ana@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"ana@example.com\"");
        assert_eq!(email.to_string(), "ana@example.com");
    }
}

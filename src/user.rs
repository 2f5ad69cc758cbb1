//! The identifier of the user whose conversation is displayed.

use std::fmt::Display;

use crate::Error;

const MAX_USER_UUID_LENGTH: usize = 64;

/// An identifier the classification service uses to look up a user's history.
///
/// A valid identifier is 1-64 ASCII letters, digits or hyphens, which covers
/// UUIDs and keeps the identifier safe to embed in URL paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserUuid(String);

impl UserUuid {
    /// Create a user identifier from `raw`, ignoring surrounding whitespace.
    ///
    /// # Errors
    /// Returns [Error::InvalidUserUuid] if `raw` is empty, too long or contains
    /// characters other than ASCII letters, digits and hyphens.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();

        let is_valid = !raw.is_empty()
            && raw.len() <= MAX_USER_UUID_LENGTH
            && raw
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '-');

        if is_valid {
            Ok(Self(raw.to_owned()))
        } else {
            Err(Error::InvalidUserUuid(raw.to_owned()))
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Functionality for keeping credentials in the format the server expects.
//!
//! The game client uppercases both the username and password before hashing them,
//! and the username sent in the logon challenge is the uppercased version too.
//! The server stores its password verifiers accordingly, so `alice`, `ALICE` and
//! anything in between are the same account.
//!
//! Uppercasing is only well defined for ASCII, so every other character is rejected.
//! Control characters are rejected as well since they can not be typed into the client.
//!
//! The logon challenge carries the username length in a single byte and the server
//! refuses names longer than [`MAXIMUM_STRING_LENGTH_IN_BYTES`].

use crate::error::NormalizedStringError;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Represents usernames and passwords containing only allowed characters.
///
/// Ownership is always taken by the function requiring it in order to prevent any cloning and reallocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedString {
    s: String,
}

/// The highest amount of bytes allowed in the username and password.
pub const MAXIMUM_STRING_LENGTH_IN_BYTES: usize = 32;

impl NormalizedString {
    /// Checks for non-ASCII characters, empty and too long strings,
    /// and uppercases letters.
    ///
    /// # Errors
    ///
    /// See [`NormalizedStringError`].
    pub fn new(s: impl Into<String>) -> Result<Self, NormalizedStringError> {
        let s = s.into();

        if s.is_empty() {
            return Err(NormalizedStringError::StringEmpty);
        }

        if s.len() > MAXIMUM_STRING_LENGTH_IN_BYTES {
            return Err(NormalizedStringError::StringTooLong);
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii() || c.is_ascii_control()) {
            return Err(NormalizedStringError::CharacterNotAllowed(c));
        }

        Ok(Self {
            s: s.to_ascii_uppercase(),
        })
    }

    /// Length in bytes, which is also the length in characters.
    #[allow(clippy::len_without_is_empty)] // Never empty
    pub fn len(&self) -> usize {
        self.s.len()
    }
}

impl Display for NormalizedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.s)
    }
}

impl AsRef<str> for NormalizedString {
    fn as_ref(&self) -> &str {
        &self.s
    }
}

impl TryFrom<&str> for NormalizedString {
    type Error = NormalizedStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

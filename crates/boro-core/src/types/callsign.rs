//! Amateur-radio callsign type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated callsign to look up.
///
/// Input is trimmed and upper-cased. Portable and prefix forms such as
/// `W1AW/4` or `VE3/W1AW` are accepted.
///
/// # Example
///
/// ```
/// use boro_core::Callsign;
///
/// let call = Callsign::new(" w1aw ").unwrap();
/// assert_eq!(call.as_str(), "W1AW");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Callsign(String);

/// Longest callsign we accept, including prefixes and suffixes.
const MAX_LEN: usize = 20;

impl Callsign {
    /// Create a new callsign, validating and normalizing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the callsign is empty, too long, contains
    /// anything other than ASCII letters, digits and `/`, has an empty
    /// `/`-separated part, or has no digit at all.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim().to_ascii_uppercase();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the callsign string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Callsign {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("must be non-empty"));
        }

        if s.len() > MAX_LEN {
            return Err(invalid("too long"));
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '/') {
            return Err(invalid("must contain only letters, digits and '/'"));
        }

        if s.split('/').any(str::is_empty) {
            return Err(invalid("'/' must separate non-empty parts"));
        }

        if !s.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid("must contain a digit"));
        }

        Ok(())
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Callsign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Callsign {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Callsign> for String {
    fn from(call: Callsign) -> Self {
        call.0
    }
}

impl AsRef<str> for Callsign {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

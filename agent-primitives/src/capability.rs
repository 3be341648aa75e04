//! Capability names exposed to calling agents.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 64;

/// Name under which a capability is published to callers.
///
/// Names are what an agent writes when it asks for a tool, so they are kept to
/// a conservative alphabet that every function-calling format accepts.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Creates a new capability name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapabilityName`] if the supplied name is empty,
    /// too long, or contains unsupported characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the capability name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CapabilityName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CapabilityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CapabilityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<CapabilityName> for String {
    fn from(value: CapabilityName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CapabilityName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidCapabilityName {
            name: String::new(),
            reason: "name cannot be empty".into(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidCapabilityName {
            name: name.into(),
            reason: format!("name length must be <= {MAX_NAME_LEN}"),
        });
    }

    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | '.'))
    {
        return Err(Error::InvalidCapabilityName {
            name: name.into(),
            reason: "name must contain lowercase alphanumeric, dash, underscore, or dot".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_snake_case_method_names() {
        let name = CapabilityName::new("get_token_price").expect("valid");
        assert_eq!(name.as_str(), "get_token_price");
        assert_eq!(name.to_string(), "get_token_price");
    }

    #[test]
    fn rejects_invalid_names() {
        for bad in ["", "Repeat", "has space", "emoji🙂"] {
            let err = CapabilityName::new(bad).expect_err("should fail");
            assert!(matches!(err, Error::InvalidCapabilityName { .. }), "{bad}");
        }

        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert!(CapabilityName::new(long).is_err());
    }

    #[test]
    fn try_from_validates() {
        let ok = CapabilityName::try_from("echo.repeat".to_owned()).expect("valid");
        assert_eq!(ok.as_str(), "echo.repeat");
        assert!(CapabilityName::try_from("Bad Name".to_owned()).is_err());
    }
}

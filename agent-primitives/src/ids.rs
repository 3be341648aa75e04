//! Toolset identifiers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

const PREFIX: &str = "toolset-";

/// Identifies one registration of a toolset instance.
///
/// Registering the same type twice yields two distinct identifiers, so callers
/// can unregister exactly the instance they handed over. Renders as
/// `toolset-<uuid>`; parsing accepts the prefixed and the bare UUID forms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ToolsetId(Uuid);

impl ToolsetId {
    /// Allocates a fresh identifier for a new registration.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ToolsetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0.as_hyphenated())
    }
}

impl FromStr for ToolsetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

impl From<ToolsetId> for String {
    fn from(id: ToolsetId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ToolsetId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_prefix_and_parses_back() {
        let id = ToolsetId::random();
        let text = id.to_string();
        assert!(text.starts_with("toolset-"), "{text}");
        assert_eq!(text.parse::<ToolsetId>().unwrap(), id);
    }

    #[test]
    fn accepts_bare_uuids() {
        let id: ToolsetId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(id.to_string(), "toolset-67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn rejects_garbage() {
        let err = "toolset-nope".parse::<ToolsetId>().unwrap_err();
        assert!(matches!(err, Error::InvalidToolsetId { .. }));
    }

    #[test]
    fn serializes_as_display_string() {
        let id: ToolsetId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"toolset-67e55044-10b1-426f-9247-bb680e5fe0c8\"");
        assert_eq!(serde_json::from_str::<ToolsetId>(&json).unwrap(), id);
        assert_ne!(ToolsetId::random(), ToolsetId::random());
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bail;
use crate::error::{ErrorKind, HarmonizerError, HarmonizerResult};

/// Registry identifier of a clinical trial, e.g. `NCT04280705`.
///
/// Always `NCT` followed by exactly eight ASCII digits. Raw values are trimmed and upper-cased
/// before validation. It is the join key between the two sources and the shard key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrialId(String);

impl TrialId {
    /// Prefix every identifier starts with.
    pub const PREFIX: &'static str = "NCT";

    /// Number of digits following [`TrialId::PREFIX`].
    pub const DIGITS: usize = 8;

    /// Parses and normalizes a raw identifier.
    pub fn parse(raw: &str) -> HarmonizerResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();

        let valid = normalized.len() == Self::PREFIX.len() + Self::DIGITS
            && normalized.starts_with(Self::PREFIX)
            && normalized[Self::PREFIX.len()..]
                .bytes()
                .all(|b| b.is_ascii_digit());

        if !valid {
            bail!(
                ErrorKind::InvalidData,
                "Invalid trial identifier",
                format!("expected {}{} digits, received `{raw}`", Self::PREFIX, Self::DIGITS)
            );
        }

        Ok(TrialId(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrialId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TrialId {
    type Err = HarmonizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrialId::parse(s)
    }
}

impl TryFrom<String> for TrialId {
    type Error = HarmonizerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrialId::parse(&value)
    }
}

impl From<TrialId> for String {
    fn from(value: TrialId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let id = TrialId::parse("  nct04280705 ").unwrap();

        assert_eq!(id.as_str(), "NCT04280705");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for raw in ["", "NCT123", "NCT1234567890", "XYZ04280705", "NCT0428070A", "NCT 4280705"] {
            let err = TrialId::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidData, "accepted `{raw}`");
        }
    }

    #[test]
    fn orders_lexicographically() {
        let mut ids: Vec<TrialId> = ["NCT00000003", "NCT00000001", "NCT00000002"]
            .into_iter()
            .map(|raw| raw.parse().unwrap())
            .collect();
        ids.sort();

        let rendered: Vec<&str> = ids.iter().map(TrialId::as_str).collect();
        assert_eq!(rendered, ["NCT00000001", "NCT00000002", "NCT00000003"]);
    }
}

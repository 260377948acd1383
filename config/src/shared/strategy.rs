use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy used to resolve a field that both sources provide.
///
/// The legacy names `json_priority`, `csv_priority` and `merge_all` are accepted wherever a
/// strategy is parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalesceStrategy {
    /// Prefer the structured document, fall back to the tabular row.
    #[default]
    #[serde(alias = "json_priority")]
    DocumentPriority,
    /// Prefer the tabular row, fall back to the structured document.
    #[serde(alias = "csv_priority")]
    TabularPriority,
    /// Prefer the document, union list fields and keep the tabular values in side columns.
    #[serde(alias = "merge_all")]
    MergeBoth,
}

impl CoalesceStrategy {
    pub const ALL: [CoalesceStrategy; 3] = [
        CoalesceStrategy::DocumentPriority,
        CoalesceStrategy::TabularPriority,
        CoalesceStrategy::MergeBoth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoalesceStrategy::DocumentPriority => "document_priority",
            CoalesceStrategy::TabularPriority => "tabular_priority",
            CoalesceStrategy::MergeBoth => "merge_both",
        }
    }
}

impl fmt::Display for CoalesceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a strategy name is not recognized.
#[derive(Debug, Error)]
#[error("unknown coalesce strategy `{0}`, expected document_priority, tabular_priority or merge_both")]
pub struct ParseStrategyError(String);

impl FromStr for CoalesceStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "document_priority" | "json_priority" => Ok(CoalesceStrategy::DocumentPriority),
            "tabular_priority" | "csv_priority" => Ok(CoalesceStrategy::TabularPriority),
            "merge_both" | "merge_all" => Ok(CoalesceStrategy::MergeBoth),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

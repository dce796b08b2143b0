//! Contract competition classification.
//!
//! Procurement feeds label the extent of competition with a mix of
//! agency-specific codes ("A", "NDO", "FSS", ...) and free-text labels.
//! [`CompetitionType::from_code`] folds all of them into four categories.
//! Unrecognized values map to [`CompetitionType::Unknown`] rather than
//! failing the record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extent-of-competition category for a contract action.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum CompetitionType {
    SoleSource,
    Limited,
    FullAndOpen,
    #[default]
    Unknown,
}

const FULL_AND_OPEN_CODES: &[&str] = &[
    "A",
    "D",
    "E",
    "F",
    "CDO",
    "FULL",
    "FULL_AND_OPEN",
    "FULL_AND_OPEN_COMPETITION",
    "COMPETED",
];

const SOLE_SOURCE_CODES: &[&str] = &[
    "B",
    "C",
    "G",
    "NDO",
    "SOLE",
    "SOLE_SOURCE",
    "NOT_COMPETED",
    "NOT_AVAILABLE_FOR_COMPETITION",
];

const LIMITED_CODES: &[&str] = &[
    "FSS",
    "LIMITED",
    "LIMITED_SOURCES",
    "LIMITED_COMPETITION",
    "8A",
    "SET_ASIDE",
];

impl CompetitionType {
    /// Classify a raw competition code or label.
    ///
    /// Matching is case-insensitive; spaces, hyphens and parentheses are
    /// folded to underscores first, so "Full and Open", "full-and-open" and
    /// "FULL_AND_OPEN" are equivalent and "8(a)" reads as "8A".
    pub fn from_code(raw: &str) -> Self {
        let folded: String = raw
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| *c != '(' && *c != ')')
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        let code = folded.as_str();

        if code.is_empty() {
            CompetitionType::Unknown
        } else if SOLE_SOURCE_CODES.contains(&code) {
            CompetitionType::SoleSource
        } else if LIMITED_CODES.contains(&code) {
            CompetitionType::Limited
        } else if FULL_AND_OPEN_CODES.contains(&code) {
            CompetitionType::FullAndOpen
        } else {
            CompetitionType::Unknown
        }
    }

    /// Canonical snake_case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            CompetitionType::SoleSource => "sole_source",
            CompetitionType::Limited => "limited",
            CompetitionType::FullAndOpen => "full_and_open",
            CompetitionType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for CompetitionType {
    fn from(raw: String) -> Self {
        CompetitionType::from_code(&raw)
    }
}

impl From<CompetitionType> for String {
    fn from(value: CompetitionType) -> Self {
        value.as_str().to_string()
    }
}

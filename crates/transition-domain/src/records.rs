//! Input records: awards, contracts and patents.
//!
//! Records are read-only value objects supplied by upstream loaders. Every
//! optional field may be missing in real feeds; consumers treat an absent or
//! blank value as "unknown" and never fail the record because of it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::competition::CompetitionType;

/// Returns the trimmed value when it is non-blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Awarding or contracting agency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyRef {
    /// Agency code, e.g. "DOD", "HHS", "AF".
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Sub-agency or component, e.g. "AirForce", "NIH".
    pub sub_agency: Option<String>,
}

impl AgencyRef {
    pub fn new(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_sub_agency(mut self, sub_agency: &str) -> Self {
        self.sub_agency = Some(sub_agency.to_string());
        self
    }

    /// True when neither a code nor a name is present.
    pub fn is_empty(&self) -> bool {
        non_blank(self.code.as_deref()).is_none() && non_blank(self.name.as_deref()).is_none()
    }
}

/// Company identity fields shared by award recipients and contract vendors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorIdentity {
    pub legal_name: String,
    /// Unique Entity ID (SAM.gov).
    pub uei: Option<String>,
    pub cage: Option<String>,
    pub duns: Option<String>,
}

impl VendorIdentity {
    pub fn named(legal_name: &str) -> Self {
        Self {
            legal_name: legal_name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_uei(mut self, uei: &str) -> Self {
        self.uei = Some(uei.to_string());
        self
    }

    pub fn with_cage(mut self, cage: &str) -> Self {
        self.cage = Some(cage.to_string());
        self
    }

    pub fn with_duns(mut self, duns: &str) -> Self {
        self.duns = Some(duns.to_string());
        self
    }
}

/// Technology-area label supplied by the external classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyArea {
    pub label: String,
    /// Classifier confidence in [0, 1].
    #[serde(default)]
    pub confidence: f64,
}

impl TechnologyArea {
    pub fn new(label: &str, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            confidence,
        }
    }
}

/// Which award date anchored the timing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorDate {
    CompletionDate,
    AwardDate,
}

/// A research award (the "from" side of a transition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub award_id: String,
    #[serde(default)]
    pub agency: AgencyRef,
    #[serde(default)]
    pub recipient: VendorIdentity,
    pub award_date: NaiveDate,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technology_area: Option<TechnologyArea>,
}

impl Award {
    pub fn new(award_id: &str, recipient: VendorIdentity, award_date: NaiveDate) -> Self {
        Self {
            award_id: award_id.to_string(),
            agency: AgencyRef::default(),
            recipient,
            award_date,
            completion_date: None,
            amount: None,
            title: None,
            description: None,
            technology_area: None,
        }
    }

    /// Date the timing window is measured from: completion when known,
    /// otherwise the award date.
    pub fn anchor_date(&self) -> (NaiveDate, AnchorDate) {
        match self.completion_date {
            Some(date) => (date, AnchorDate::CompletionDate),
            None => (self.award_date, AnchorDate::AwardDate),
        }
    }

    /// Title and description joined for text comparison.
    pub fn text(&self) -> String {
        join_text(&[self.title.as_deref(), self.description.as_deref()])
    }
}

/// A contract action (the "to" side of a transition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    #[serde(default)]
    pub agency: AgencyRef,
    #[serde(default)]
    pub vendor: VendorIdentity,
    pub action_date: NaiveDate,
    #[serde(default)]
    pub competition_type: CompetitionType,
    #[serde(default)]
    pub obligated_amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Technology area inferred from the contract description.
    #[serde(default)]
    pub technology_area: Option<TechnologyArea>,
}

impl Contract {
    pub fn new(contract_id: &str, vendor: VendorIdentity, action_date: NaiveDate) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            agency: AgencyRef::default(),
            vendor,
            action_date,
            competition_type: CompetitionType::Unknown,
            obligated_amount: None,
            description: None,
            technology_area: None,
        }
    }
}

/// A patent associated with an award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patent {
    pub patent_id: String,
    pub award_id: String,
    #[serde(default)]
    pub filing_date: Option<NaiveDate>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl Patent {
    /// Title and abstract joined for text comparison.
    pub fn text(&self) -> String {
        join_text(&[self.title.as_deref(), self.abstract_text.as_deref()])
    }
}

fn join_text(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|p| non_blank(*p))
        .collect::<Vec<_>>()
        .join(" ")
}

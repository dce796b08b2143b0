//! Evidence bundles: the exported, self-validating form of a detection.
//!
//! A bundle carries denormalized snapshots of the source award and contract
//! as they were when scored, so an auditor can re-check the evidence even
//! after upstream records change. Bundles are write-once.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::competition::CompetitionType;
use crate::detection::{
    ConfidenceBand, Detection, SignalKind, SignalResult, ValidationReport, VendorMatch,
};
use crate::digest::compute_digest;
use crate::error::Result;
use crate::records::{AnchorDate, Award, Contract};

/// Bundle schema version written into every record.
pub const EVIDENCE_SCHEMA_VERSION: &str = "1.0";

/// Point-in-time copy of the award fields used for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardSnapshot {
    pub award_id: String,
    pub agency_code: Option<String>,
    pub agency_name: Option<String>,
    pub sub_agency: Option<String>,
    pub recipient_name: String,
    pub recipient_uei: Option<String>,
    pub recipient_cage: Option<String>,
    pub recipient_duns: Option<String>,
    pub award_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub anchor: AnchorDate,
    pub amount: Option<f64>,
    pub title: Option<String>,
    pub technology_area: Option<String>,
    pub technology_area_confidence: Option<f64>,
}

impl From<&Award> for AwardSnapshot {
    fn from(award: &Award) -> Self {
        Self {
            award_id: award.award_id.clone(),
            agency_code: award.agency.code.clone(),
            agency_name: award.agency.name.clone(),
            sub_agency: award.agency.sub_agency.clone(),
            recipient_name: award.recipient.legal_name.clone(),
            recipient_uei: award.recipient.uei.clone(),
            recipient_cage: award.recipient.cage.clone(),
            recipient_duns: award.recipient.duns.clone(),
            award_date: award.award_date,
            completion_date: award.completion_date,
            anchor: award.anchor_date().1,
            amount: award.amount,
            title: award.title.clone(),
            technology_area: award.technology_area.as_ref().map(|t| t.label.clone()),
            technology_area_confidence: award.technology_area.as_ref().map(|t| t.confidence),
        }
    }
}

/// Point-in-time copy of the contract fields used for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub contract_id: String,
    pub agency_code: Option<String>,
    pub agency_name: Option<String>,
    pub sub_agency: Option<String>,
    pub vendor_name: String,
    pub vendor_uei: Option<String>,
    pub vendor_cage: Option<String>,
    pub vendor_duns: Option<String>,
    pub action_date: NaiveDate,
    pub competition_type: CompetitionType,
    pub obligated_amount: Option<f64>,
    pub description: Option<String>,
    pub technology_area: Option<String>,
    pub technology_area_confidence: Option<f64>,
}

impl From<&Contract> for ContractSnapshot {
    fn from(contract: &Contract) -> Self {
        Self {
            contract_id: contract.contract_id.clone(),
            agency_code: contract.agency.code.clone(),
            agency_name: contract.agency.name.clone(),
            sub_agency: contract.agency.sub_agency.clone(),
            vendor_name: contract.vendor.legal_name.clone(),
            vendor_uei: contract.vendor.uei.clone(),
            vendor_cage: contract.vendor.cage.clone(),
            vendor_duns: contract.vendor.duns.clone(),
            action_date: contract.action_date,
            competition_type: contract.competition_type,
            obligated_amount: contract.obligated_amount,
            description: contract.description.clone(),
            technology_area: contract.technology_area.as_ref().map(|t| t.label.clone()),
            technology_area_confidence: contract.technology_area.as_ref().map(|t| t.confidence),
        }
    }
}

/// Complete auditable record of one detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub schema_version: String,
    pub detection_id: String,
    pub award_id: String,
    pub contract_id: String,
    pub award: AwardSnapshot,
    pub contract: ContractSnapshot,
    pub vendor_match: VendorMatch,
    /// Signal results keyed by signal name.
    pub signals: BTreeMap<SignalKind, SignalResult>,
    pub base_score: f64,
    pub likelihood_score: f64,
    pub confidence: ConfidenceBand,
    /// One-line explanation built from the strongest signals.
    pub summary: String,
    pub validation: ValidationReport,
}

impl EvidenceBundle {
    /// Whether self-validation flagged this bundle.
    pub fn is_flagged(&self) -> bool {
        !self.validation.passed
    }

    /// SHA-256 of the bundle's canonical JSON. Equal bundles always share
    /// a digest, which makes re-runs comparable byte for byte.
    pub fn content_digest(&self) -> Result<String> {
        compute_digest(&serde_json::to_value(self)?)
    }

    /// Rebuild the detection this bundle was assembled from.
    pub fn to_detection(&self) -> Detection {
        Detection {
            detection_id: self.detection_id.clone(),
            award_id: self.award_id.clone(),
            contract_id: self.contract_id.clone(),
            vendor_match: self.vendor_match.clone(),
            signals: self.signals.values().cloned().collect(),
            base_score: self.base_score,
            likelihood_score: self.likelihood_score,
            confidence: self.confidence,
            validation: self.validation.clone(),
        }
    }

    /// One JSON line, for line-delimited export.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

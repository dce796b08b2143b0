//! Agency continuity: does the contracting agency continue the awarding
//! agency's line of business?

use std::collections::{BTreeMap, HashMap};

use transition_domain::{non_blank, AgencyRef};

use super::{SignalContext, SignalOutcome};

/// Built-in component → parent department table, in normalized form.
const DEPARTMENTS: &[(&str, &[&str])] = &[
    (
        "DOD",
        &[
            "DOD", "DEPARTMENTOFDEFENSE", "9700", "097", "AF", "USAF", "AIRFORCE", "ARMY",
            "NAVY", "USMC", "USSF", "SPACEFORCE", "DARPA", "MDA", "DLA", "DISA", "DTRA", "DHA",
            "CBD", "NGA", "OSD", "SOCOM", "USSOCOM",
        ],
    ),
    (
        "HHS",
        &[
            "HHS", "DEPARTMENTOFHEALTHANDHUMANSERVICES", "7500", "075", "NIH", "CDC", "FDA",
            "ARPAH", "ACF", "AHRQ",
        ],
    ),
    ("DOC", &["DOC", "DEPARTMENTOFCOMMERCE", "1300", "013", "NOAA", "NIST"]),
    ("DOE", &["DOE", "DEPARTMENTOFENERGY", "8900", "089", "ARPAE", "NNSA"]),
    ("DHS", &["DHS", "DEPARTMENTOFHOMELANDSECURITY", "7000", "070", "USCG", "FEMA", "TSA"]),
    ("USDA", &["USDA", "DEPARTMENTOFAGRICULTURE", "1200", "012", "NIFA", "ARS"]),
    ("DOT", &["DOT", "DEPARTMENTOFTRANSPORTATION", "6900", "069", "FAA", "FHWA", "FRA"]),
    ("ED", &["ED", "DEPARTMENTOFEDUCATION", "9100", "091", "IES"]),
    ("NASA", &["NASA", "NATIONALAERONAUTICSANDSPACEADMINISTRATION", "8000", "080"]),
    ("NSF", &["NSF", "NATIONALSCIENCEFOUNDATION", "4900", "049"]),
    ("EPA", &["EPA", "ENVIRONMENTALPROTECTIONAGENCY", "6800", "068"]),
];

/// Uppercase alphanumerics only, so "Air Force", "AirForce" and "AIR-FORCE"
/// compare equal.
pub fn normalize_agency(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn normalized(value: Option<&str>) -> Option<String> {
    non_blank(value)
        .map(normalize_agency)
        .filter(|v| !v.is_empty())
}

/// Agency key: normalized code, falling back to the normalized name.
fn agency_key(agency: &AgencyRef) -> Option<String> {
    normalized(agency.code.as_deref()).or_else(|| normalized(agency.name.as_deref()))
}

/// How two agencies relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgencyRelation {
    SameAgency,
    SameDepartment,
    CrossDepartment,
    Unknown,
}

impl AgencyRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            AgencyRelation::SameAgency => "same_agency",
            AgencyRelation::SameDepartment => "same_department",
            AgencyRelation::CrossDepartment => "cross_department",
            AgencyRelation::Unknown => "unknown",
        }
    }
}

/// Component → department lookup with configured overrides taking
/// precedence over the built-in table.
#[derive(Debug, Clone, Default)]
pub struct AgencyHierarchy {
    parents: HashMap<String, String>,
}

impl AgencyHierarchy {
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut parents = HashMap::new();
        for (department, members) in DEPARTMENTS {
            for member in *members {
                parents.insert((*member).to_string(), (*department).to_string());
            }
        }
        for (code, parent) in overrides {
            parents.insert(normalize_agency(code), normalize_agency(parent));
        }
        Self { parents }
    }

    /// Parent department of a normalized agency key; unknown keys are their
    /// own department.
    pub fn department_of(&self, key: &str) -> String {
        self.parents
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn department(&self, agency: &AgencyRef) -> Option<String> {
        let key = agency_key(agency)?;
        Some(self.department_of(&key))
    }

    pub fn relation(&self, a: &AgencyRef, b: &AgencyRef) -> AgencyRelation {
        let (Some(key_a), Some(key_b)) = (agency_key(a), agency_key(b)) else {
            return AgencyRelation::Unknown;
        };
        let sub_a = normalized(a.sub_agency.as_deref());
        let sub_b = normalized(b.sub_agency.as_deref());
        if key_a == key_b && sub_a == sub_b {
            return AgencyRelation::SameAgency;
        }
        if self.department(a) == self.department(b) {
            AgencyRelation::SameDepartment
        } else {
            AgencyRelation::CrossDepartment
        }
    }
}

pub(super) fn evaluate(ctx: &SignalContext<'_>) -> SignalOutcome {
    let bonuses = &ctx.config.agency;
    let award = &ctx.award.agency;
    let contract = &ctx.contract.agency;
    let relation = ctx.agencies.relation(award, contract);

    let (bonus, snippet) = match relation {
        AgencyRelation::SameAgency => (
            bonuses.same_agency_bonus,
            format!("same agency ({})", describe(contract)),
        ),
        AgencyRelation::SameDepartment => (
            bonuses.same_department_bonus,
            format!(
                "same department: {} -> {}",
                describe(award),
                describe(contract)
            ),
        ),
        AgencyRelation::CrossDepartment => (
            bonuses.cross_department_bonus,
            format!(
                "cross-department: {} -> {}",
                describe(award),
                describe(contract)
            ),
        ),
        AgencyRelation::Unknown => (0.0, "agency data missing".to_string()),
    };

    SignalOutcome::new(bonus, snippet)
        .detail("relation", relation.as_str())
        .detail("award_agency", describe(award))
        .detail("contract_agency", describe(contract))
        .detail(
            "award_department",
            ctx.agencies.department(award).unwrap_or_default(),
        )
        .detail(
            "contract_department",
            ctx.agencies.department(contract).unwrap_or_default(),
        )
}

fn describe(agency: &AgencyRef) -> String {
    let base = non_blank(agency.code.as_deref())
        .or_else(|| non_blank(agency.name.as_deref()))
        .unwrap_or("?");
    match non_blank(agency.sub_agency.as_deref()) {
        Some(sub) => format!("{base}/{sub}"),
        None => base.to_string(),
    }
}

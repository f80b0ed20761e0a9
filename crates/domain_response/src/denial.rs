//! Denial (glosa) interpretation
//!
//! Maps operator denial codes onto a category and a recommended action, with
//! keyword inference for codes outside the table. Technical denials are
//! retryable after a fix; everything else needs human action.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::statement::DenialRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialCategory {
    Technical,
    Business,
    Value,
    Documentation,
    Unknown,
}

/// Recommended follow-up for a denial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialAction {
    FixXml,
    FixData,
    ReviewCoverage,
    RequestAuthorization,
    RequestNewAuthorization,
    VerifyCoverage,
    VerifyCode,
    VerifyDiagnosis,
    AdjustValue,
    Recalculate,
    ProvideDocumentation,
    FixDocumentation,
    UpdateDocumentation,
    ContactSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

struct CodeEntry {
    category: DenialCategory,
    description: &'static str,
    action: DenialAction,
}

static DENIAL_CODES: Lazy<HashMap<&'static str, CodeEntry>> = Lazy::new(|| {
    use DenialAction::*;
    use DenialCategory::*;
    let mut codes = HashMap::new();
    let mut put = |code, category, description, action| {
        codes.insert(
            code,
            CodeEntry {
                category,
                description,
                action,
            },
        );
    };

    put("001", Technical, "Invalid XML format", FixXml);
    put("002", Technical, "XSD validation error", FixXml);
    put("003", Technical, "Missing required field", FixData);
    put("004", Technical, "Invalid date format", FixData);

    put("101", Business, "Procedure not covered", ReviewCoverage);
    put("102", Business, "Authorization required", RequestAuthorization);
    put("103", Business, "Expired authorization", RequestNewAuthorization);
    put("104", Business, "Patient not covered", VerifyCoverage);
    put("105", Business, "Procedure code mismatch", VerifyCode);
    put("106", Business, "ICD code mismatch", VerifyDiagnosis);

    put("201", Value, "Value above limit", AdjustValue);
    put("202", Value, "Value below minimum", AdjustValue);
    put("203", Value, "Incorrect calculation", Recalculate);

    put("301", Documentation, "Missing documentation", ProvideDocumentation);
    put("302", Documentation, "Invalid documentation", FixDocumentation);
    put("303", Documentation, "Expired documentation", UpdateDocumentation);

    codes
});

const TECHNICAL_KEYWORDS: &[&str] = &["xml", "xsd", "format", "schema", "validation"];
const BUSINESS_KEYWORDS: &[&str] = &["coverage", "authorization", "covered", "plan"];

/// An interpreted denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub code: String,
    pub category: DenialCategory,
    pub description: String,
    pub action: DenialAction,
    pub message: String,
    /// Fixable on our side and safe to resubmit afterwards
    pub can_retry: bool,
    /// Needs action beyond resubmission
    pub requires_action: bool,
}

impl Interpretation {
    pub fn is_technical(&self) -> bool {
        self.category == DenialCategory::Technical
    }

    pub fn is_business(&self) -> bool {
        self.category == DenialCategory::Business
    }

    pub fn severity(&self) -> Severity {
        match self.category {
            DenialCategory::Technical => Severity::Critical,
            DenialCategory::Business
                if matches!(
                    self.action,
                    DenialAction::RequestAuthorization | DenialAction::VerifyCoverage
                ) =>
            {
                Severity::High
            }
            DenialCategory::Business | DenialCategory::Value => Severity::Medium,
            DenialCategory::Documentation => Severity::Low,
            DenialCategory::Unknown => Severity::Medium,
        }
    }
}

/// Summary over a set of interpreted denials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenialSummary {
    pub total: usize,
    pub by_category: HashMap<DenialCategory, usize>,
    pub actions_needed: Vec<DenialAction>,
    pub has_technical: bool,
    pub has_business: bool,
    pub can_retry_all: bool,
    pub requires_action: bool,
}

pub struct DenialInterpreter;

impl DenialInterpreter {
    /// Interprets one denial code, falling back to keyword inference over the
    /// message when the code is not in the table.
    pub fn interpret(code: &str, message: Option<&str>) -> Interpretation {
        let interpretation = if let Some(entry) = DENIAL_CODES.get(code) {
            Interpretation {
                code: code.to_string(),
                category: entry.category,
                description: entry.description.to_string(),
                action: entry.action,
                message: message.unwrap_or(entry.description).to_string(),
                can_retry: entry.category == DenialCategory::Technical,
                requires_action: entry.category != DenialCategory::Technical,
            }
        } else {
            let category = message.map(infer_category).unwrap_or(DenialCategory::Unknown);
            Interpretation {
                code: code.to_string(),
                category,
                description: message
                    .map(str::to_string)
                    .unwrap_or_else(|| "Unknown denial code".to_string()),
                action: DenialAction::ContactSupport,
                message: message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Unknown denial code: {code}")),
                can_retry: category == DenialCategory::Technical,
                requires_action: true,
            }
        };

        tracing::info!(
            code = %interpretation.code,
            category = ?interpretation.category,
            "interpreted denial"
        );
        interpretation
    }

    /// Interprets a batch of denial records and summarizes them
    pub fn interpret_many(denials: &[DenialRecord]) -> (Vec<Interpretation>, DenialSummary) {
        let interpreted: Vec<Interpretation> = denials
            .iter()
            .map(|d| {
                Self::interpret(
                    d.code.as_deref().unwrap_or(""),
                    d.description.as_deref(),
                )
            })
            .collect();

        let mut by_category: HashMap<DenialCategory, usize> = HashMap::new();
        let mut actions_needed = Vec::new();
        for interpretation in &interpreted {
            *by_category.entry(interpretation.category).or_insert(0) += 1;
            if !actions_needed.contains(&interpretation.action) {
                actions_needed.push(interpretation.action);
            }
        }

        let summary = DenialSummary {
            total: interpreted.len(),
            by_category,
            actions_needed,
            has_technical: interpreted.iter().any(Interpretation::is_technical),
            has_business: interpreted.iter().any(Interpretation::is_business),
            can_retry_all: !interpreted.is_empty() && interpreted.iter().all(|i| i.can_retry),
            requires_action: interpreted.iter().any(|i| i.requires_action),
        };
        (interpreted, summary)
    }

    /// Concrete resolution steps for a denial code
    pub fn suggest_resolution(code: &str) -> Vec<&'static str> {
        let Some(entry) = DENIAL_CODES.get(code) else {
            return vec!["Contact operator support for assistance with this denial code"];
        };
        match entry.action {
            DenialAction::FixXml => vec![
                "Review XML structure",
                "Validate against the XSD schema",
                "Check for missing or invalid elements",
                "Verify encoding is UTF-8",
            ],
            DenialAction::FixData => vec![
                "Review data fields",
                "Check for missing required fields",
                "Verify data formats (dates, numbers)",
                "Ensure data matches operator requirements",
            ],
            DenialAction::ReviewCoverage => vec![
                "Verify the procedure is covered by the patient's plan",
                "Check the plan coverage table",
                "Contact the operator to confirm coverage",
            ],
            DenialAction::RequestAuthorization => vec![
                "Request pre-authorization from the operator",
                "Provide required documentation",
                "Wait for authorization before resubmitting",
            ],
            DenialAction::RequestNewAuthorization => vec![
                "Request a new authorization (current one expired)",
                "Update the authorization number in the guide",
                "Resubmit with the new authorization",
            ],
            DenialAction::VerifyCoverage => vec![
                "Verify the patient is active in the plan",
                "Check the coverage period",
                "Confirm patient data is correct",
            ],
            DenialAction::VerifyCode => vec![
                "Verify the procedure code against the TUSS table",
                "Check the code is valid for the date of service",
                "Ensure the code matches the service provided",
            ],
            DenialAction::VerifyDiagnosis => vec![
                "Verify the ICD-10 code is correct",
                "Check the diagnosis matches the procedure",
                "Ensure the ICD code is valid and active",
            ],
            DenialAction::AdjustValue => vec![
                "Review value limits for the procedure",
                "Adjust the value to the acceptable range",
                "Verify the calculation is correct",
            ],
            DenialAction::Recalculate => vec![
                "Review the calculation method",
                "Verify all components are included",
                "Recalculate according to operator rules",
            ],
            DenialAction::ProvideDocumentation => vec![
                "Gather required documentation",
                "Ensure documents are legible and complete",
                "Attach documentation to the guide",
            ],
            DenialAction::FixDocumentation => vec![
                "Review documentation requirements",
                "Ensure documents meet operator standards",
                "Replace invalid documentation",
            ],
            DenialAction::UpdateDocumentation => vec![
                "Obtain updated documentation",
                "Ensure documents are not expired",
                "Replace expired documentation",
            ],
            DenialAction::ContactSupport => {
                vec!["Review denial details and contact support if needed"]
            }
        }
    }

    /// Buckets interpreted denials by severity
    pub fn categorize_by_severity(
        interpreted: &[Interpretation],
    ) -> HashMap<Severity, Vec<Interpretation>> {
        let mut buckets: HashMap<Severity, Vec<Interpretation>> = HashMap::new();
        for interpretation in interpreted {
            buckets
                .entry(interpretation.severity())
                .or_default()
                .push(interpretation.clone());
        }
        buckets
    }
}

fn infer_category(message: &str) -> DenialCategory {
    let lower = message.to_lowercase();
    if TECHNICAL_KEYWORDS.iter().any(|w| lower.contains(w)) {
        DenialCategory::Technical
    } else if BUSINESS_KEYWORDS.iter().any(|w| lower.contains(w)) {
        DenialCategory::Business
    } else {
        DenialCategory::Unknown
    }
}

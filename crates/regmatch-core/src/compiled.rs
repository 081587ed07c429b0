//! Matching a business profile against a compiled rule set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::profile::BusinessProfile;
use crate::rule::{CompiledRule, Severity};

/// Keyword ("disinfection") whose presence in a mandatory match raises a gap.
pub const DISINFECTION_KEYWORD: &str = "חיטוי";

const DISINFECTION_GAP: &str = "Missing official disinfection documents";
const DISINFECTION_ACTION: &str = "Provide latest certified water disinfection documentation";

/// A rule that applies to the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub title: Option<String>,
    pub authority: Option<String>,
    pub severity: Severity,
    pub priority: u8,
    /// One reason per condition, in condition order.
    pub applies_because: Vec<String>,
    pub requirements: Vec<String>,
    pub source: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An unresolved compliance item that needs supporting documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub rule_id: String,
    pub gap: String,
    pub suggested_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledMatchResult {
    pub profile: BusinessProfile,
    pub matches: Vec<Match>,
    pub gaps: Vec<Gap>,
}

/// Whether a rule applies: the reasons for every condition when it does, or
/// the first failing condition when it does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applicability {
    Applies(Vec<String>),
    Rejected(String),
}

/// Evaluate a rule's conditions as a short-circuiting conjunction.
///
/// An empty condition list always applies.
pub fn evaluate_rule(profile: &BusinessProfile, rule: &CompiledRule) -> Applicability {
    let mut reasons = Vec::with_capacity(rule.conditions.len());
    for condition in &rule.conditions {
        match condition.evaluate(profile) {
            Ok(reason) => reasons.push(reason),
            Err(reason) => return Applicability::Rejected(reason),
        }
    }
    Applicability::Applies(reasons)
}

/// Match a profile against rules. Matches keep rule order; gaps keep match order.
pub fn match_rules(profile: &BusinessProfile, rules: &[CompiledRule]) -> CompiledMatchResult {
    let mut matches = Vec::new();
    let mut gaps = Vec::new();

    for rule in rules {
        let reasons = match evaluate_rule(profile, rule) {
            Applicability::Applies(reasons) => reasons,
            Applicability::Rejected(reason) => {
                debug!(rule = %rule.id, %reason, "rule does not apply");
                continue;
            }
        };

        if let Severity::Unrecognized(raw) = &rule.severity {
            warn!(rule = %rule.id, severity = %raw, "unrecognised severity, ranked as info");
        }

        let m = Match {
            id: rule.id.clone(),
            title: rule.title.clone(),
            authority: rule.authority.clone(),
            severity: rule.severity.clone(),
            priority: rule.severity.priority(),
            applies_because: reasons,
            requirements: rule.requirements.clone(),
            source: rule.source.clone(),
            tags: rule.tags.clone(),
        };

        if let Some(gap) = disinfection_gap(&m) {
            gaps.push(gap);
        }
        matches.push(m);
    }

    info!(
        rules = rules.len(),
        matches = matches.len(),
        gaps = gaps.len(),
        "matched profile against compiled rules"
    );
    CompiledMatchResult {
        profile: profile.clone(),
        matches,
        gaps,
    }
}

/// The single hard-coded gap check: a mandatory match whose serialised form
/// mentions [`DISINFECTION_KEYWORD`]. Not a general gap mechanism.
fn disinfection_gap(m: &Match) -> Option<Gap> {
    if m.severity != Severity::Mandatory {
        return None;
    }
    let serialised = serde_json::to_string(m).ok()?;
    serialised.contains(DISINFECTION_KEYWORD).then(|| Gap {
        rule_id: m.id.clone(),
        gap: DISINFECTION_GAP.to_string(),
        suggested_action: DISINFECTION_ACTION.to_string(),
    })
}

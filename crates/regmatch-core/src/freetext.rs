//! Heuristic matching of a business profile straight against a structured
//! regulation document, for documents with no compiled rule set yet.
//!
//! A subsection applies when a true boolean attribute is mentioned in its
//! content (literally or through the [`SynonymTable`]), or when a numeric
//! attribute appears literally or satisfies an "up to" / "above" phrase.
//! There is no severity and no gap detection on this path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::document::RegulationDocument;
use crate::profile::BusinessProfile;
use crate::synonyms::SynonymTable;

/// "up to": the content's number is a ceiling.
pub const UP_TO_TOKEN: &str = "עד";
/// "above": the content's number is a floor.
pub const ABOVE_TOKEN: &str = "מעל";

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit pattern compiles"));

/// A subsection that mentions the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    /// `<section id>-<subsection id>`
    pub rule_id: String,
    pub title: String,
    /// Title of the enclosing section.
    pub authority: String,
    pub applies_because: Vec<String>,
    pub requirement_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeTextMatchResult {
    pub profile: BusinessProfile,
    pub matches: Vec<RawMatch>,
    pub total_matches: usize,
}

/// Scan every subsection in document order and collect those the profile hits.
pub fn match_document(
    profile: &BusinessProfile,
    document: &RegulationDocument,
    synonyms: &SynonymTable,
) -> FreeTextMatchResult {
    let matches: Vec<RawMatch> = document
        .subsections()
        .filter_map(|(section, sub)| {
            let content = sub.content.trim();
            if content.is_empty() {
                return None;
            }
            let reasons = match_conditions(content, profile, synonyms);
            if reasons.is_empty() {
                return None;
            }
            let rule_id = format!("{}-{}", section.id, sub.id);
            debug!(%rule_id, reasons = reasons.len(), "subsection matched");
            Some(RawMatch {
                rule_id,
                title: sub.title.clone(),
                authority: section.title.clone(),
                applies_because: reasons,
                requirement_text: content.to_string(),
            })
        })
        .collect();

    info!(
        doc_id = %document.doc_id,
        matches = matches.len(),
        "matched profile against regulation document"
    );
    FreeTextMatchResult {
        profile: profile.clone(),
        total_matches: matches.len(),
        matches,
    }
}

/// Reasons why `content` concerns the profile, in profile attribute order.
pub fn match_conditions(
    content: &str,
    profile: &BusinessProfile,
    synonyms: &SynonymTable,
) -> Vec<String> {
    let mut reasons = Vec::new();

    for (key, value) in profile.iter() {
        match value {
            Value::Bool(true) => {
                if synonyms.mentions(key, content) {
                    reasons.push(format!("{key} == true"));
                }
            }
            Value::Number(n) => {
                let Some(v) = n.as_f64() else { continue };
                if content.contains(&n.to_string()) {
                    reasons.push(format!("{key} == {n}"));
                }
                let bound = extract_number(content);
                if content.contains(UP_TO_TOKEN) && v <= bound {
                    reasons.push(format!("{key} ≤ {n}"));
                }
                if content.contains(ABOVE_TOKEN) && v > bound {
                    reasons.push(format!("{key} > {n}"));
                }
            }
            _ => {}
        }
    }

    reasons
}

/// First run of digits in `text`, ignoring `,` thousands separators; `0` if none.
pub fn extract_number(text: &str) -> f64 {
    let cleaned = text.replace(',', "");
    DIGITS
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

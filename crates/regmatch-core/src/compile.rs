//! Offline compilation of a structured regulation document into rules.
//!
//! Each subsection is scanned for fixed Hebrew phrases; every phrase found
//! contributes one `applies_if` condition. Subsections with no recognised
//! phrase produce no rule.

use serde_json::{json, Value};
use tracing::info;

use crate::document::RegulationDocument;
use crate::rule::{CompiledRule, Condition, Severity};

/// Title used when a subsection has none.
pub const UNTITLED: &str = "לא צויין";

/// A phrase trigger: any of `phrases` in the content yields `condition()`.
struct Trigger {
    phrases: &'static [&'static str],
    attribute: &'static str,
    kind: TriggerKind,
}

enum TriggerKind {
    Flag,
    AtMost(u64),
}

impl Trigger {
    fn condition(&self) -> Condition {
        match self.kind {
            TriggerKind::Flag => Condition::Equals {
                attribute: self.attribute.to_string(),
                expected: Value::Bool(true),
            },
            TriggerKind::AtMost(limit) => Condition::AtMost {
                attribute: self.attribute.to_string(),
                limit: limit.into(),
            },
        }
    }
}

const TRIGGERS: &[Trigger] = &[
    Trigger { phrases: &["גז"], attribute: "has_gas_installation", kind: TriggerKind::Flag },
    Trigger {
        phrases: &["80 מ״ר", "80 מטר"],
        attribute: "business_area_sqm",
        kind: TriggerKind::AtMost(80),
    },
    Trigger { phrases: &["משלוחים"], attribute: "offers_delivery", kind: TriggerKind::Flag },
    Trigger { phrases: &["בשר"], attribute: "serves_meat", kind: TriggerKind::Flag },
    Trigger { phrases: &["אש פתוחה"], attribute: "uses_open_fire", kind: TriggerKind::Flag },
    Trigger {
        phrases: &["מטבח תעשייתי"],
        attribute: "has_industrial_kitchen",
        kind: TriggerKind::Flag,
    },
    Trigger { phrases: &["אלכוהול"], attribute: "serves_alcohol", kind: TriggerKind::Flag },
    Trigger {
        phrases: &["אזור חיצוני", "מרפסת"],
        attribute: "has_outdoor_area",
        kind: TriggerKind::Flag,
    },
    Trigger {
        phrases: &["מוזיקה", "רעש"],
        attribute: "has_music_or_noise",
        kind: TriggerKind::Flag,
    },
    Trigger { phrases: &["כשר"], attribute: "is_kosher", kind: TriggerKind::Flag },
];

/// Conditions detected in `content`, in trigger order.
pub fn detect_conditions(content: &str) -> Vec<Condition> {
    TRIGGERS
        .iter()
        .filter(|t| t.phrases.iter().any(|p| content.contains(p)))
        .map(Trigger::condition)
        .collect()
}

/// Compile every subsection that triggers at least one condition into a
/// mandatory rule.
pub fn compile_rules(document: &RegulationDocument) -> Vec<CompiledRule> {
    let rules: Vec<CompiledRule> = document
        .subsections()
        .filter_map(|(section, sub)| {
            let content = sub.content.trim();
            if content.is_empty() {
                return None;
            }
            let conditions = detect_conditions(content);
            if conditions.is_empty() {
                return None;
            }
            let title = if sub.title.is_empty() { UNTITLED } else { sub.title.as_str() };
            Some(CompiledRule {
                id: format!("R-{}-{}", section.id, sub.id),
                title: Some(title.to_string()),
                authority: Some(section.title.clone()),
                severity: Severity::Mandatory,
                conditions,
                requirements: vec![content.to_string()],
                source: Some(json!({
                    "section_id": section.id,
                    "subsection_id": sub.id,
                })),
                tags: Vec::new(),
            })
        })
        .collect();

    info!(doc_id = %document.doc_id, rules = rules.len(), "compiled rules from document");
    rules
}

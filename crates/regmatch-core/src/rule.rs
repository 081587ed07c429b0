//! Compiled regulatory rules and their applicability conditions.
//!
//! Rules arrive as JSON with an `applies_if` object. Each key is either a
//! profile attribute (equality) or an attribute with the [`MAX_SUFFIX`]
//! (maximum threshold). Keys are decoded into [`Condition`] values once, when
//! the rule is deserialised.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::RuleError;
use crate::profile::BusinessProfile;

/// Key suffix marking a maximum-threshold condition (`seats_max: 200`).
pub const MAX_SUFFIX: &str = "_max";

/// Rule severity. Lower [`priority`](Self::priority) means more urgent.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Mandatory,
    Recommended,
    #[default]
    Info,
    /// Any other severity string, kept verbatim and ranked as [`Severity::Info`].
    Unrecognized(String),
}

impl Severity {
    pub fn priority(&self) -> u8 {
        match self {
            Self::Mandatory => 1,
            Self::Recommended => 2,
            Self::Info | Self::Unrecognized(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Recommended => "recommended",
            Self::Info => "info",
            Self::Unrecognized(s) => s,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mandatory" => Self::Mandatory,
            "recommended" => Self::Recommended,
            "info" => Self::Info,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded `applies_if` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Profile value must equal `expected` (same JSON type, same value).
    Equals { attribute: String, expected: Value },
    /// Profile value must be present, numeric, and `<= limit`.
    AtMost { attribute: String, limit: Number },
}

impl Condition {
    /// Decode an `applies_if` entry using the key naming convention.
    pub fn decode(rule_id: &str, key: &str, value: Value) -> Result<Self, RuleError> {
        let Some(attribute) = key.strip_suffix(MAX_SUFFIX) else {
            return Ok(Self::Equals {
                attribute: key.to_string(),
                expected: value,
            });
        };
        if attribute.is_empty() {
            return Err(RuleError::EmptyThresholdAttribute {
                rule: rule_id.to_string(),
                key: key.to_string(),
            });
        }
        match value {
            Value::Number(limit) => Ok(Self::AtMost {
                attribute: attribute.to_string(),
                limit,
            }),
            other => Err(RuleError::NonNumericThreshold {
                rule: rule_id.to_string(),
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// The `applies_if` key this condition was decoded from.
    pub fn key(&self) -> String {
        match self {
            Self::Equals { attribute, .. } => attribute.clone(),
            Self::AtMost { attribute, .. } => format!("{attribute}{MAX_SUFFIX}"),
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Self::Equals { attribute, .. } | Self::AtMost { attribute, .. } => attribute,
        }
    }

    fn encoded_value(&self) -> Value {
        match self {
            Self::Equals { expected, .. } => expected.clone(),
            Self::AtMost { limit, .. } => Value::Number(limit.clone()),
        }
    }

    /// Evaluate against a profile. `Ok` carries the reason the condition
    /// holds, `Err` the reason it fails.
    pub fn evaluate(&self, profile: &BusinessProfile) -> Result<String, String> {
        match self {
            Self::Equals {
                attribute,
                expected,
            } => {
                let shown = display_value(expected);
                match profile.get(attribute) {
                    Some(actual) if values_equal(actual, expected) => {
                        Ok(format!("{attribute} == {shown}"))
                    }
                    _ => Err(format!("{attribute} != {shown}")),
                }
            }
            Self::AtMost { attribute, limit } => {
                let within = profile
                    .get(attribute)
                    .and_then(Value::as_f64)
                    .zip(limit.as_f64())
                    .is_some_and(|(actual, max)| actual <= max);
                if within {
                    Ok(format!("{attribute} ≤ {limit}"))
                } else {
                    Err(format!("{attribute} > {limit}"))
                }
            }
        }
    }
}

/// JSON equality, except numbers compare by value (`120` equals `120.0`).
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}

/// Render a value for a human-readable reason (strings unquoted).
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A pre-compiled rule with decoded applicability conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct CompiledRule {
    pub id: String,
    pub title: Option<String>,
    pub authority: Option<String>,
    pub severity: Severity,
    /// Conjunction of conditions, in declaration order.
    pub conditions: Vec<Condition>,
    /// Requirement names.
    pub requirements: Vec<String>,
    pub source: Option<Value>,
    pub tags: Vec<String>,
}

/// Wire shape of a compiled rule.
#[derive(Serialize, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authority: Option<String>,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    applies_if: Map<String, Value>,
    #[serde(default, deserialize_with = "requirement_names")]
    requirements: Vec<String>,
    #[serde(default)]
    source: Option<Value>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Requirements are either plain strings or `{"name": ...}` objects.
fn requirement_names<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Requirement {
        Name(String),
        Named { name: String },
    }

    let items = Vec::<Requirement>::deserialize(de)?;
    Ok(items
        .into_iter()
        .map(|r| match r {
            Requirement::Name(name) | Requirement::Named { name } => name,
        })
        .collect())
}

impl TryFrom<RawRule> for CompiledRule {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(RuleError::MissingId);
        }
        let conditions = raw
            .applies_if
            .into_iter()
            .map(|(key, value)| Condition::decode(&raw.id, &key, value))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: raw.id,
            title: raw.title,
            authority: raw.authority,
            severity: raw.severity,
            conditions,
            requirements: raw.requirements,
            source: raw.source,
            tags: raw.tags,
        })
    }
}

impl From<CompiledRule> for RawRule {
    fn from(rule: CompiledRule) -> Self {
        let applies_if = rule
            .conditions
            .iter()
            .map(|c| (c.key(), c.encoded_value()))
            .collect();
        Self {
            id: rule.id,
            title: rule.title,
            authority: rule.authority,
            severity: rule.severity,
            applies_if,
            requirements: rule.requirements,
            source: rule.source,
            tags: rule.tags,
        }
    }
}

//! Schema-free business profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute name → value mapping describing a business.
///
/// Values are expected to be booleans, numbers, or strings; other JSON values
/// are carried through untouched but never satisfy a matcher condition.
/// Declaration order is preserved and drives the order of match reasons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessProfile(Map<String, Value>);

impl BusinessProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(attribute.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display name used for run identifiers: `name`, then `business_name`.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "business_name"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(Value::as_str))
            .filter(|s| !s.trim().is_empty())
    }
}

impl FromIterator<(String, Value)> for BusinessProfile {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build a profile from `key => value` pairs.
///
/// ```
/// let p = regmatch_core::business_profile! { "uses_gas" => true, "seats" => 120 };
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! business_profile {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut p = $crate::BusinessProfile::new();
        $( p.insert($key, $value); )*
        p
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_declaration_order() {
        let p: BusinessProfile =
            serde_json::from_value(json!({"z": 1, "a": true, "m": "x"})).unwrap();
        let keys: Vec<&str> = p.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(BusinessProfile::from_value(json!([1, 2])).is_none());
        assert!(BusinessProfile::from_value(json!({"a": 1})).is_some());
    }

    #[test]
    fn display_name_falls_back_to_business_name() {
        let p = business_profile! { "business_name" => "Hadar Cookies" };
        assert_eq!(p.display_name(), Some("Hadar Cookies"));

        let p = business_profile! { "name" => "Cafe", "business_name" => "Other" };
        assert_eq!(p.display_name(), Some("Cafe"));

        let p = business_profile! { "name" => "  " };
        assert_eq!(p.display_name(), None);
    }
}

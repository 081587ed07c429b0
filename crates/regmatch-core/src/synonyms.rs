//! Attribute → phrase variants used to spot profile attributes in free text.
//!
//! The built-in table covers Hebrew food-service regulation wording. Other
//! locales or domains are loaded from JSON and swapped in without touching
//! the matchers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered mapping from a boolean profile attribute to phrase variants.
///
/// Serialised as a JSON object of string arrays: `{"uses_gas": ["גז", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

const FOOD_SERVICE_HE: &[(&str, &[&str])] = &[
    (
        "uses_gas",
        &["גז", "שימוש בגז", "מתקני גז", "בלוני גז", "מערכת גז", "אספקת גז", "תשתית גז", "חיבור גז"],
    ),
    (
        "delivers",
        &["משלוחים", "שליחויות", "שירות משלוחים", "שילוח", "אספקה לבית הלקוח", "הזמנות טלפוניות"],
    ),
    (
        "has_meat",
        &["בשר", "מנות בשריות", "בשר אדום", "בשר עוף", "הגשת בשר", "מזון מן החי", "שחיטה", "חומרי גלם מן החי"],
    ),
    (
        "uses_fryer",
        &["טיגון", "מכשירי טיגון", "סיר טיגון", "צ'יפסר", "מכשירי חימום שמן", "שמן רותח"],
    ),
    (
        "has_alcohol",
        &["מכירת אלכוהול", "הגשת משקאות חריפים", "רישיון משקאות", "שתייה חריפה"],
    ),
    (
        "serves_dairy",
        &["מוצרי חלב", "גבינות", "יוגורט", "מנות חלביות", "הגשת חלב", "תפריט חלבי"],
    ),
    (
        "has_seating",
        &["מקומות ישיבה", "כיסאות ושולחנות", "אזור הסעדה", "ישיבה במקום", "ישיבה במסעדה"],
    ),
    (
        "is_open_air",
        &["אוויר פתוח", "מרפסת", "חצר", "הסעדה חיצונית", "איזור ישיבה פתוח", "שולחנות מחוץ למבנה"],
    ),
    (
        "uses_gas_grill",
        &["גריל גז", "מתקן גריל", "גריל", "צלייה", "ברביקיו", "מתקן צלייה"],
    ),
    (
        "is_kosher",
        &["כשרות", "רבנות", "תעודת כשרות", "פיקוח הלכתי", "בשר חלק", "כשר למהדרין"],
    ),
];

impl SynonymTable {
    /// An empty table: only literal attribute names match.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table for Hebrew food-service regulations.
    pub fn food_service_he() -> Self {
        FOOD_SERVICE_HE
            .iter()
            .map(|(attr, variants)| (*attr, variants.iter().copied()))
            .collect()
    }

    /// Replace (or add) the variants for one attribute.
    pub fn insert<I, S>(&mut self, attribute: impl Into<String>, variants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute = attribute.into();
        let list: Vec<String> = variants.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(a, _)| *a == attribute) {
            Some((_, existing)) => *existing = list,
            None => self.entries.push((attribute, list)),
        }
    }

    /// Variants registered for `attribute`, in declaration order.
    pub fn variants<'a>(&'a self, attribute: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .find(|(a, _)| a == attribute)
            .into_iter()
            .flat_map(|(_, variants)| variants.iter().map(String::as_str))
    }

    /// Whether `attribute` is present in `text`, either literally or through
    /// one of its variants. Plain substring containment.
    pub fn mentions(&self, attribute: &str, text: &str) -> bool {
        text.contains(attribute) || self.variants(attribute).any(|v| text.contains(v))
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(a, _)| a.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for SynonymTable {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut table = Self::empty();
        for (attribute, value) in map {
            let Value::Array(items) = value else {
                return Err(format!("synonyms for `{attribute}` must be an array"));
            };
            let variants = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(format!("synonym for `{attribute}` is not a string: {other}")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.insert(attribute, variants);
        }
        Ok(table)
    }
}

impl From<SynonymTable> for Map<String, Value> {
    fn from(table: SynonymTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(attribute, variants)| {
                let list = variants.into_iter().map(Value::String).collect();
                (attribute, Value::Array(list))
            })
            .collect()
    }
}

impl<A, I, S> FromIterator<(A, I)> for SynonymTable
where
    A: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (A, I)>>(iter: T) -> Self {
        let mut table = Self::empty();
        for (attribute, variants) in iter {
            table.insert(attribute, variants);
        }
        table
    }
}

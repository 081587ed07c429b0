//! Hierarchical regulation document: document → section → subsection.

use serde::{Deserialize, Serialize};

/// Language tag written for every structured document.
pub const DOCUMENT_LANGUAGE: &str = "he";

/// A regulation document structured into chapters and numbered subsections.
///
/// Built once by [`structure_document`](crate::structure_document) and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulationDocument {
    pub doc_id: String,
    pub title: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A chapter. `id` is the chapter number as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

/// A `major.minor` numbered clause and the text accumulated under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

fn default_language() -> String {
    DOCUMENT_LANGUAGE.to_string()
}

impl RegulationDocument {
    pub fn new(doc_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: title.into(),
            language: default_language(),
            sections: Vec::new(),
        }
    }

    /// Iterate `(section, subsection)` pairs in document order.
    pub fn subsections(&self) -> impl Iterator<Item = (&Section, &Subsection)> {
        self.sections
            .iter()
            .flat_map(|s| s.subsections.iter().map(move |sub| (s, sub)))
    }

    pub fn subsection_count(&self) -> usize {
        self.sections.iter().map(|s| s.subsections.len()).sum()
    }
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subsections: Vec::new(),
        }
    }
}

impl Subsection {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
        }
    }

    /// Append a fragment followed by a single separating space.
    pub(crate) fn push_content(&mut self, text: &str) {
        self.content.push_str(text);
        self.content.push(' ');
    }
}

//! Line-oriented structuring of raw regulation text.
//!
//! The text is read as trimmed, non-empty lines. Each line is classified by
//! its leading marker, tried in a fixed order:
//!
//! 1. chapter: `פרק 3 - כותרת` opens a new section
//! 2. subsection: `3.2 כותרת` (also `3.2. כותרת`, `3.2- כותרת`) opens a subsection
//! 3. content: `3.2.1 טקסט` appends its text to the open subsection
//! 4. continuation: anything else appends the whole line to the open subsection
//!
//! Lines that cannot be attached anywhere are dropped. Badly formed input
//! degrades to a sparser tree rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::document::{RegulationDocument, Section, Subsection};

static CHAPTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^פרק\s?(\d+)\s*[-–]\s*(.+)$").expect("chapter pattern compiles")
});

static SUBSECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+\.\d+)\s*[.\-]?\s*(.+)$").expect("subsection pattern compiles")
});

static CONTENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+\.\d+\.\d+)\s*[.\-]?\s*(.+)$").expect("content pattern compiles")
});

/// Classification of a single trimmed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Chapter { id: &'a str, title: &'a str },
    Subsection { id: &'a str, title: &'a str },
    /// Text of a `major.minor.minor` line with its numbering removed.
    Content(&'a str),
    /// A line with no recognised marker.
    Continuation(&'a str),
}

/// Classify a trimmed line. The first matching marker wins.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(caps) = CHAPTER_PATTERN.captures(line) {
        return LineKind::Chapter {
            id: caps.get(1).map_or("", |m| m.as_str()),
            title: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }

    if let Some(caps) = SUBSECTION_PATTERN.captures(line)
        && let Some(id) = caps.get(1)
        && !continues_numbering(&line[id.end()..])
    {
        return LineKind::Subsection {
            id: id.as_str(),
            title: caps.get(2).map_or("", |m| m.as_str().trim()),
        };
    }

    if let Some(caps) = CONTENT_PATTERN.captures(line) {
        return LineKind::Content(caps.get(2).map_or("", |m| m.as_str().trim()));
    }

    LineKind::Continuation(line)
}

/// `true` when `rest` starts with `.<digit>`, i.e. the numbering has a third level.
fn continues_numbering(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Structure raw regulation text into a [`RegulationDocument`].
pub fn structure_document(text: &str, doc_id: &str, title: &str) -> RegulationDocument {
    let outline = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .fold(Outline::default(), |acc, (index, line)| {
            let kind = classify_line(line);
            debug!(index, ?kind, "classified line");
            acc.step(kind)
        });

    let mut doc = RegulationDocument::new(doc_id, title);
    doc.sections = outline.finish();
    info!(
        doc_id,
        sections = doc.sections.len(),
        subsections = doc.subsection_count(),
        "structured regulation document"
    );
    doc
}

/// Fold accumulator: closed sections plus the open section/subsection cursors.
///
/// An open subsection is attached to the open section when it is closed, so
/// text is only ever appended to the most recent subsection.
#[derive(Debug, Default)]
struct Outline {
    sections: Vec<Section>,
    section: Option<Section>,
    subsection: Option<Subsection>,
}

impl Outline {
    fn step(mut self, kind: LineKind<'_>) -> Self {
        match kind {
            LineKind::Chapter { id, title } => {
                self.close_subsection();
                self.close_section();
                self.section = Some(Section::new(id, title));
            }
            LineKind::Subsection { id, title } => {
                self.close_subsection();
                self.subsection = Some(Subsection::new(id, title));
            }
            LineKind::Content(text) | LineKind::Continuation(text) => {
                if let Some(sub) = self.subsection.as_mut() {
                    sub.push_content(text);
                }
            }
        }
        self
    }

    fn close_subsection(&mut self) {
        let Some(sub) = self.subsection.take() else {
            return;
        };
        match self.section.as_mut() {
            Some(section) => section.subsections.push(sub),
            None => warn!(subsection = %sub.id, "subsection outside any chapter dropped"),
        }
    }

    fn close_section(&mut self) {
        if let Some(section) = self.section.take() {
            self.sections.push(section);
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.close_subsection();
        self.close_section();
        self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
מפרט אחיד לפריט 4.2א

פרק 1 - הגדרות כלליות
1.1 תחולה
1.1.1 המפרט חל על בתי אוכל
   לרבות מסעדות ובתי קפה
1.2. הגדרות
1.2.1 \"גז\" - גז פחמימני מעובה
פרק 2 – משטרת ישראל
פרק 3 - משרד הבריאות
3.1 מים
3.1.1 חיבור למערכת מים מאושרת
3.1.2 חיטוי תקופתי של המערכת
";

    #[test]
    fn classifies_markers_in_priority_order() {
        assert_eq!(
            classify_line("פרק 1 - הגדרות"),
            LineKind::Chapter { id: "1", title: "הגדרות" }
        );
        assert_eq!(
            classify_line("פרק3 – כבאות"),
            LineKind::Chapter { id: "3", title: "כבאות" }
        );
        assert_eq!(
            classify_line("1.1 תחולה"),
            LineKind::Subsection { id: "1.1", title: "תחולה" }
        );
        assert_eq!(
            classify_line("1.2. הגדרות"),
            LineKind::Subsection { id: "1.2", title: "הגדרות" }
        );
        assert_eq!(
            classify_line("4.10- גז"),
            LineKind::Subsection { id: "4.10", title: "גז" }
        );
        assert_eq!(classify_line("1.1.1 המפרט חל"), LineKind::Content("המפרט חל"));
        assert_eq!(classify_line("1.12.3. טקסט"), LineKind::Content("טקסט"));
        assert_eq!(
            classify_line("לרבות מסעדות"),
            LineKind::Continuation("לרבות מסעדות")
        );
    }

    #[test]
    fn structures_sample_document() {
        let doc = structure_document(SAMPLE, "reg-4.2A", "בית אוכל");
        assert_eq!(doc.doc_id, "reg-4.2A");
        assert_eq!(doc.language, "he");

        let ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        let s1 = &doc.sections[0];
        assert_eq!(s1.title, "הגדרות כלליות");
        assert_eq!(s1.subsections.len(), 2);
        assert_eq!(s1.subsections[0].id, "1.1");
        assert_eq!(
            s1.subsections[0].content,
            "המפרט חל על בתי אוכל לרבות מסעדות ובתי קפה "
        );
        assert_eq!(s1.subsections[1].title, "הגדרות");

        let s3 = &doc.sections[2];
        assert_eq!(
            s3.subsections[0].content,
            "חיבור למערכת מים מאושרת חיטוי תקופתי של המערכת "
        );
    }

    #[test]
    fn chapter_without_subsections_is_still_emitted() {
        let doc = structure_document(SAMPLE, "d", "t");
        assert_eq!(doc.sections[1].title, "משטרת ישראל");
        assert!(doc.sections[1].subsections.is_empty());
    }

    #[test]
    fn chapter_marker_clears_open_subsection() {
        let text = "פרק 1 - א\n1.1 ראשון\nטקסט\nפרק 2 - ב\nשורה יתומה\n";
        let doc = structure_document(text, "d", "t");
        assert_eq!(doc.sections[0].subsections[0].content, "טקסט ");
        assert!(doc.sections[1].subsections.is_empty());
    }

    #[test]
    fn content_is_not_reassigned_after_new_subsection() {
        let text = "פרק 1 - א\n1.1 ראשון\nא א\n1.2 שני\nב ב\n";
        let doc = structure_document(text, "d", "t");
        let subs = &doc.sections[0].subsections;
        assert_eq!(subs[0].content, "א א ");
        assert_eq!(subs[1].content, "ב ב ");
    }

    #[test]
    fn lines_outside_any_subsection_are_dropped() {
        let text = "הקדמה\n1.1.1 תוכן ללא סעיף\n1.1 סעיף ללא פרק\nתוכן אבוד\nפרק 1 - א\n";
        let doc = structure_document(text, "d", "t");
        assert_eq!(doc.sections.len(), 1);
        assert!(doc.sections[0].subsections.is_empty());
    }

    #[test]
    fn empty_and_blank_input_yield_no_sections() {
        assert!(structure_document("", "d", "t").sections.is_empty());
        assert!(structure_document("  \n\t\n", "d", "t").sections.is_empty());
    }

    #[test]
    fn never_more_sections_than_chapter_markers() {
        let chapters = SAMPLE
            .lines()
            .filter(|l| matches!(classify_line(l.trim()), LineKind::Chapter { .. }))
            .count();
        let doc = structure_document(SAMPLE, "d", "t");
        assert!(doc.sections.len() <= chapters);
        for (_, sub) in doc.subsections() {
            if !sub.content.is_empty() {
                assert!(sub.content.ends_with(' '));
            }
        }
    }

    #[test]
    fn serialised_tree_parses_back_identically() {
        let doc = structure_document(SAMPLE, "d", "t");
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: RegulationDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}

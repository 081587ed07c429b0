//! Vertical card display for match runs.

use std::fmt::{self, Write};

use regmatch_core::{CompiledMatchResult, FreeTextMatchResult, MatchOutcome, MatchResult};
use serde_json::Value;

const MAX_LIST_ITEMS: usize = 10;
const MAX_TEXT_CHARS: usize = 60;

// ── Public API ──

/// Print a match run as a card: profile, then matches, then gaps.
pub fn print_match_card(outcome: &MatchOutcome) -> anyhow::Result<()> {
    print!("{}", render_match_card(outcome)?);
    Ok(())
}

pub fn render_match_card(outcome: &MatchOutcome) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "=== {} ===", outcome.run_id)?;
    writeln!(out, "{}", outcome.message())?;
    writeln!(out, "  {:<26} {}", "saved to", outcome.location)?;
    writeln!(out)?;

    let profile = outcome.result.profile();
    if !profile.is_empty() {
        writeln!(out, "Profile")?;
        for (key, value) in profile.iter() {
            writeln!(out, "  {:<26} {}", key, scalar(value))?;
        }
        writeln!(out)?;
    }

    match &outcome.result {
        MatchResult::Compiled(result) => render_compiled(&mut out, result)?,
        MatchResult::FreeText(result) => render_free_text(&mut out, result)?,
    }
    Ok(out)
}

// ── Engine sections ──

fn render_compiled(out: &mut String, result: &CompiledMatchResult) -> fmt::Result {
    writeln!(out, "Matches ({}):", result.matches.len())?;
    for m in result.matches.iter().take(MAX_LIST_ITEMS) {
        writeln!(out, "    {:<30}  {} (p{})", m.id, m.severity, m.priority)?;
        if let Some(title) = m.title.as_deref().filter(|t| !t.is_empty()) {
            writeln!(out, "      {}", shorten(title))?;
        }
        if !m.applies_because.is_empty() {
            writeln!(out, "      because {}", m.applies_because.join(", "))?;
        }
    }
    more(out, result.matches.len())?;

    if !result.gaps.is_empty() {
        writeln!(out)?;
        writeln!(out, "Gaps ({}):", result.gaps.len())?;
        for gap in result.gaps.iter().take(MAX_LIST_ITEMS) {
            writeln!(out, "    {:<30}  {}", gap.rule_id, gap.gap)?;
            writeln!(out, "      -> {}", gap.suggested_action)?;
        }
        more(out, result.gaps.len())?;
    }
    Ok(())
}

fn render_free_text(out: &mut String, result: &FreeTextMatchResult) -> fmt::Result {
    writeln!(out, "Matches ({}):", result.total_matches)?;
    for m in result.matches.iter().take(MAX_LIST_ITEMS) {
        writeln!(out, "    {:<30}  {}", m.rule_id, shorten(&m.title))?;
        writeln!(out, "      because {}", m.applies_because.join(", "))?;
        writeln!(out, "      {}", shorten(&m.requirement_text))?;
    }
    more(out, result.matches.len())
}

// ── Helpers ──

fn more(out: &mut String, len: usize) -> fmt::Result {
    if len > MAX_LIST_ITEMS {
        writeln!(out, "    ... and {} more", len - MAX_LIST_ITEMS)?;
    }
    Ok(())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "yes".into(),
        Value::Bool(false) => "no".into(),
        other => other.to_string(),
    }
}

/// Truncate on a char boundary; Hebrew text is multi-byte.
fn shorten(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        let head: String = text.chars().take(MAX_TEXT_CHARS - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmatch_core::{business_profile, Gap, RawMatch};

    fn outcome(result: MatchResult) -> MatchOutcome {
        MatchOutcome {
            run_id: "cafe_20250101_120000".into(),
            engine: result.engine(),
            location: "data/matches/match_cafe_20250101_120000.json".into(),
            result,
        }
    }

    #[test]
    fn free_text_card() {
        let matches: Vec<RawMatch> = (0..12)
            .map(|i| RawMatch {
                rule_id: format!("4-4.{i}"),
                title: "גז".into(),
                authority: "כיבוי אש".into(),
                applies_because: vec!["uses_gas == true".into()],
                requirement_text: "א".repeat(100),
            })
            .collect();
        let card = render_match_card(&outcome(MatchResult::FreeText(FreeTextMatchResult {
            profile: business_profile! { "uses_gas" => true },
            total_matches: matches.len(),
            matches,
        })))
        .unwrap();

        assert!(card.starts_with("=== cafe_20250101_120000 ===\nMatch done via regdoc engine\n"));
        assert!(card.contains(&format!("{:<26} yes", "uses_gas")));
        assert!(card.contains("Matches (12):"));
        assert!(card.contains("... and 2 more"));
        assert!(card.contains(&format!("{}...", "א".repeat(57))));
    }

    #[test]
    fn compiled_card_lists_gaps() {
        let card = render_match_card(&outcome(MatchResult::Compiled(CompiledMatchResult {
            profile: business_profile! {},
            matches: Vec::new(),
            gaps: vec![Gap {
                rule_id: "R-4-4.1".into(),
                gap: "Missing official disinfection documents".into(),
                suggested_action: "Provide latest certified water disinfection documentation"
                    .into(),
            }],
        })))
        .unwrap();

        assert!(!card.contains("Profile"));
        assert!(card.contains("Matches (0):"));
        assert!(card.contains("Gaps (1):"));
        assert!(card.contains("-> Provide latest certified"));
    }
}

//! Engine selection, result normalisation, and persistence of match runs.
//!
//! The orchestrator is I/O-free: rule sources and result stores are traits,
//! implemented over the filesystem by `regmatch-store`.

use std::error::Error as StdError;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::compiled::{match_rules, CompiledMatchResult};
use crate::document::RegulationDocument;
use crate::freetext::{match_document, FreeTextMatchResult};
use crate::profile::BusinessProfile;
use crate::rule::CompiledRule;
use crate::synonyms::SynonymTable;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Which matcher produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    CompiledRules,
    RegulationDocument,
}

impl Engine {
    /// The free-text engine runs when requested, or when no compiled rule set
    /// exists yet.
    pub fn select(use_regdoc: bool, has_compiled_rules: bool) -> Self {
        if use_regdoc || !has_compiled_rules {
            Self::RegulationDocument
        } else {
            Self::CompiledRules
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompiledRules => "compiled rules",
            Self::RegulationDocument => "regdoc",
        }
    }
}

/// Output of either matcher, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchResult {
    Compiled(CompiledMatchResult),
    FreeText(FreeTextMatchResult),
}

impl MatchResult {
    pub fn profile(&self) -> &BusinessProfile {
        match self {
            Self::Compiled(r) => &r.profile,
            Self::FreeText(r) => &r.profile,
        }
    }

    pub fn match_count(&self) -> usize {
        match self {
            Self::Compiled(r) => r.matches.len(),
            Self::FreeText(r) => r.matches.len(),
        }
    }

    pub fn gap_count(&self) -> usize {
        match self {
            Self::Compiled(r) => r.gaps.len(),
            Self::FreeText(_) => 0,
        }
    }

    pub fn engine(&self) -> Engine {
        match self {
            Self::Compiled(_) => Engine::CompiledRules,
            Self::FreeText(_) => Engine::RegulationDocument,
        }
    }
}

/// Where rules come from.
pub trait RuleSource {
    type Error: StdError + Send + Sync + 'static;

    /// Whether a compiled rule set exists for this source.
    fn has_compiled_rules(&self) -> bool;

    fn compiled_rules(&self) -> Result<Vec<CompiledRule>, Self::Error>;

    fn regulation_document(&self) -> Result<RegulationDocument, Self::Error>;
}

/// Where match results go.
pub trait ResultStore {
    type Error: StdError + Send + Sync + 'static;

    /// Persist `result` under `run_id`, replacing any earlier result with the
    /// same id. Returns a location the result can be read back from.
    fn save(&self, run_id: &str, result: &MatchResult) -> Result<String, Self::Error>;
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to load rule source")]
    Source(#[source] BoxError),

    #[error("failed to persist match result {run_id}")]
    Store {
        run_id: String,
        #[source]
        source: BoxError,
    },
}

/// Summary of a persisted match run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub run_id: String,
    pub engine: Engine,
    pub location: String,
    pub result: MatchResult,
}

impl MatchOutcome {
    pub fn message(&self) -> String {
        format!("Match done via {} engine", self.engine.as_str())
    }
}

/// Runs one matcher per request and persists its result.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    synonyms: SynonymTable,
}

impl Orchestrator {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Select an engine and evaluate the profile without persisting.
    pub fn evaluate<S: RuleSource>(
        &self,
        profile: &BusinessProfile,
        source: &S,
        use_regdoc: bool,
    ) -> Result<MatchResult, OrchestratorError> {
        let engine = Engine::select(use_regdoc, source.has_compiled_rules());
        let result = match engine {
            Engine::CompiledRules => {
                let rules = source
                    .compiled_rules()
                    .map_err(|e| OrchestratorError::Source(Box::new(e)))?;
                MatchResult::Compiled(match_rules(profile, &rules))
            }
            Engine::RegulationDocument => {
                let document = source
                    .regulation_document()
                    .map_err(|e| OrchestratorError::Source(Box::new(e)))?;
                MatchResult::FreeText(match_document(profile, &document, &self.synonyms))
            }
        };
        Ok(result)
    }

    /// Evaluate and persist under `profile_id`, or under a generated id.
    pub fn run<S: RuleSource, R: ResultStore>(
        &self,
        profile: &BusinessProfile,
        source: &S,
        store: &R,
        use_regdoc: bool,
        profile_id: Option<&str>,
    ) -> Result<MatchOutcome, OrchestratorError> {
        let run_id = match profile_id {
            Some(id) => id.to_string(),
            None => generate_profile_id(profile, chrono::Local::now().naive_local()),
        };
        info!(%run_id, use_regdoc, "running match");

        let result = self.evaluate(profile, source, use_regdoc)?;
        let location = store
            .save(&run_id, &result)
            .map_err(|e| OrchestratorError::Store {
                run_id: run_id.clone(),
                source: Box::new(e),
            })?;

        let engine = result.engine();
        info!(
            %run_id,
            engine = engine.as_str(),
            matches = result.match_count(),
            %location,
            "match result saved"
        );
        Ok(MatchOutcome {
            run_id,
            engine,
            location,
            result,
        })
    }
}

/// Filename-friendly run id: `<name>_<YYYYmmdd_HHMMSS>`.
///
/// The name is the profile's display name (or `business`), lowercased, with
/// every character other than alphanumerics, `_` and `-` replaced by `_`.
pub fn generate_profile_id(profile: &BusinessProfile, now: NaiveDateTime) -> String {
    let name: String = profile
        .display_name()
        .unwrap_or("business")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{name}_{}", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fmt;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::business_profile;
    use crate::document::{Section, Subsection};

    #[derive(Debug)]
    struct Missing;

    impl fmt::Display for Missing {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("missing")
        }
    }

    impl StdError for Missing {}

    #[derive(Default)]
    struct MemorySource {
        rules: Option<Vec<CompiledRule>>,
        document: Option<RegulationDocument>,
    }

    impl RuleSource for MemorySource {
        type Error = Missing;

        fn has_compiled_rules(&self) -> bool {
            self.rules.is_some()
        }

        fn compiled_rules(&self) -> Result<Vec<CompiledRule>, Missing> {
            self.rules.clone().ok_or(Missing)
        }

        fn regulation_document(&self) -> Result<RegulationDocument, Missing> {
            self.document.clone().ok_or(Missing)
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<HashMap<String, MatchResult>>,
    }

    impl ResultStore for MemoryStore {
        type Error = Missing;

        fn save(&self, run_id: &str, result: &MatchResult) -> Result<String, Missing> {
            self.saved
                .borrow_mut()
                .insert(run_id.to_string(), result.clone());
            Ok(format!("mem://{run_id}"))
        }
    }

    fn source() -> MemorySource {
        let rules = serde_json::from_value(json!([
            {"id": "GAS", "severity": "mandatory", "applies_if": {"uses_gas": true}}
        ]))
        .unwrap();
        let mut doc = RegulationDocument::new("reg", "t");
        let mut section = Section::new("1", "כבאות");
        let mut sub = Subsection::new("1.1", "גז");
        sub.content = "מערכת גז מאושרת ".into();
        section.subsections.push(sub);
        doc.sections.push(section);
        MemorySource {
            rules: Some(rules),
            document: Some(doc),
        }
    }

    #[test]
    fn engine_selection() {
        assert_eq!(Engine::select(false, true), Engine::CompiledRules);
        assert_eq!(Engine::select(true, true), Engine::RegulationDocument);
        assert_eq!(Engine::select(false, false), Engine::RegulationDocument);
    }

    #[test]
    fn runs_compiled_engine_by_default() {
        let orch = Orchestrator::new(SynonymTable::food_service_he());
        let store = MemoryStore::default();
        let profile = business_profile! { "uses_gas" => true };

        let outcome = orch
            .run(&profile, &source(), &store, false, Some("cafe_1"))
            .unwrap();
        assert_eq!(outcome.engine, Engine::CompiledRules);
        assert_eq!(outcome.location, "mem://cafe_1");
        assert_eq!(outcome.result.match_count(), 1);
        assert_eq!(outcome.message(), "Match done via compiled rules engine");
        assert!(store.saved.borrow().contains_key("cafe_1"));
    }

    #[test]
    fn runs_free_text_engine_on_request() {
        let orch = Orchestrator::new(SynonymTable::food_service_he());
        let store = MemoryStore::default();
        let profile = business_profile! { "uses_gas" => true };

        let outcome = orch
            .run(&profile, &source(), &store, true, Some("cafe_2"))
            .unwrap();
        assert_eq!(outcome.engine, Engine::RegulationDocument);
        let MatchResult::FreeText(result) = &outcome.result else {
            panic!("expected free-text result");
        };
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.matches[0].rule_id, "1-1.1");
    }

    #[test]
    fn same_id_overwrites_previous_result() {
        let orch = Orchestrator::new(SynonymTable::food_service_he());
        let store = MemoryStore::default();

        orch.run(&business_profile! { "uses_gas" => true }, &source(), &store, false, Some("x"))
            .unwrap();
        orch.run(&business_profile! { "uses_gas" => false }, &source(), &store, false, Some("x"))
            .unwrap();

        let saved = store.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved["x"].match_count(), 0);
    }

    #[test]
    fn missing_source_is_reported() {
        let orch = Orchestrator::default();
        let store = MemoryStore::default();
        let err = orch
            .run(&business_profile! {}, &MemorySource::default(), &store, false, Some("x"))
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Source(_)));
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn generated_id_uses_profile_name_and_timestamp() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 13)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let profile = business_profile! { "name" => "My Bakery" };
        assert_eq!(generate_profile_id(&profile, now), "my_bakery_20250913_153000");
        assert_eq!(
            generate_profile_id(&business_profile! {}, now),
            "business_20250913_153000"
        );
    }

    #[test]
    fn generated_id_never_contains_path_components() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 13)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let profile = business_profile! { "name" => "A/B ../Foods" };
        assert_eq!(generate_profile_id(&profile, now), "a_b____foods_20250913_153000");

        let profile = business_profile! { "name" => "x\\..\\מאפיית דוד" };
        let id = generate_profile_id(&profile, now);
        assert!(!id.contains(['/', '\\', '.']));
        assert!(id.starts_with("x____מאפיית_דוד_"));
    }

    #[test]
    fn persisted_shapes_deserialise_to_the_right_variant() {
        let profile = business_profile! { "uses_gas" => true };
        let compiled = MatchResult::Compiled(match_rules(&profile, &source().rules.unwrap()));
        let json = serde_json::to_string(&compiled).unwrap();
        assert_eq!(serde_json::from_str::<MatchResult>(&json).unwrap(), compiled);

        let doc = source().document.unwrap();
        let free = MatchResult::FreeText(match_document(&profile, &doc, &SynonymTable::food_service_he()));
        let json = serde_json::to_string(&free).unwrap();
        assert_eq!(serde_json::from_str::<MatchResult>(&json).unwrap().engine(), Engine::RegulationDocument);
    }
}

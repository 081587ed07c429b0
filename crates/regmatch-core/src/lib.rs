//! Core types and engines for regmatch: regulation text structuring, compiled
//! rule evaluation, and free-text matching of business profiles.

pub mod compile;
pub mod compiled;
pub mod document;
pub mod error;
pub mod freetext;
pub mod orchestrator;
pub mod profile;
pub mod rule;
pub mod structure;
pub mod synonyms;

pub use compile::compile_rules;
pub use compiled::{match_rules, CompiledMatchResult, Gap, Match};
pub use document::{RegulationDocument, Section, Subsection};
pub use error::RuleError;
pub use freetext::{match_document, FreeTextMatchResult, RawMatch};
pub use orchestrator::{
    generate_profile_id, Engine, MatchOutcome, MatchResult, Orchestrator, OrchestratorError,
    ResultStore, RuleSource,
};
pub use profile::BusinessProfile;
pub use rule::{CompiledRule, Condition, Severity};
pub use structure::structure_document;
pub use synonyms::SynonymTable;

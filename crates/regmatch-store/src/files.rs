//! Data directory layout and filesystem implementations of the core
//! [`RuleSource`] and [`ResultStore`] seams.

use std::path::{Path, PathBuf};

use regmatch_core::{CompiledRule, MatchResult, RegulationDocument, ResultStore, RuleSource};

use crate::json::{load_document, load_rules, write_json};
use crate::StoreError;

/// Layout under a data root:
///
/// ```text
/// <root>/processed/compiled_rules.json
/// <root>/processed/reg_<id>.json
/// <root>/matches/match_<run_id>.json
/// <root>/report/report_<run_id>.txt
/// ```
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn processed(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn matches(&self) -> PathBuf {
        self.root.join("matches")
    }

    pub fn reports(&self) -> PathBuf {
        self.root.join("report")
    }

    pub fn compiled_rules(&self) -> PathBuf {
        self.processed().join("compiled_rules.json")
    }

    pub fn regulation_document(&self, id: &str) -> PathBuf {
        self.processed().join(format!("reg_{id}.json"))
    }
}

/// Rules read from a compiled rule file and/or a structured document file.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    rules_path: PathBuf,
    document_path: Option<PathBuf>,
}

impl FileRuleSource {
    pub fn new(rules_path: impl Into<PathBuf>) -> Self {
        Self {
            rules_path: rules_path.into(),
            document_path: None,
        }
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }
}

impl RuleSource for FileRuleSource {
    type Error = StoreError;

    fn has_compiled_rules(&self) -> bool {
        self.rules_path.is_file()
    }

    fn compiled_rules(&self) -> Result<Vec<CompiledRule>, StoreError> {
        load_rules(&self.rules_path)
    }

    fn regulation_document(&self) -> Result<RegulationDocument, StoreError> {
        match &self.document_path {
            Some(path) => load_document(path),
            None => Err(StoreError::NoDocument),
        }
    }
}

/// Writes each run to `<dir>/match_<run_id>.json`, overwriting earlier runs
/// with the same id.
#[derive(Debug, Clone)]
pub struct JsonResultStore {
    dir: PathBuf,
}

impl JsonResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("match_{run_id}.json"))
    }
}

impl ResultStore for JsonResultStore {
    type Error = StoreError;

    fn save(&self, run_id: &str, result: &MatchResult) -> Result<String, StoreError> {
        if run_id.is_empty() || run_id == ".." || run_id.contains(['/', '\\']) {
            return Err(StoreError::InvalidRunId(run_id.to_string()));
        }
        let path = self.path_for(run_id);
        write_json(&path, result)?;
        Ok(path.display().to_string())
    }
}

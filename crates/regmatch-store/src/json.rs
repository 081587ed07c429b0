//! Reading and writing regmatch artefacts as UTF-8 JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use regmatch_core::{BusinessProfile, CompiledRule, MatchResult, RegulationDocument, SynonymTable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::StoreError;

/// Deserialise a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::json(path, e))
}

/// Pretty-print `value` to `path`, creating parent directories.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// concurrent reader sees either the old or the new content, never a torn
/// write. Concurrent writers to the same path: last rename wins.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut writer = BufWriter::new(tmp);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| StoreError::json(path, e))?;
    writer.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| StoreError::io(path, e.into_error()))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    debug!(path = %path.display(), "wrote JSON");
    Ok(())
}

pub fn load_document(path: &Path) -> Result<RegulationDocument, StoreError> {
    let doc: RegulationDocument = read_json(path)?;
    info!(
        path = %path.display(),
        doc_id = %doc.doc_id,
        sections = doc.sections.len(),
        "loaded regulation document"
    );
    Ok(doc)
}

pub fn save_document(path: &Path, doc: &RegulationDocument) -> Result<(), StoreError> {
    write_json(path, doc)?;
    info!(path = %path.display(), doc_id = %doc.doc_id, "saved regulation document");
    Ok(())
}

/// Load a compiled rule set. The top level must be a JSON array.
pub fn load_rules(path: &Path) -> Result<Vec<CompiledRule>, StoreError> {
    let value: Value = read_json(path)?;
    if !value.is_array() {
        return Err(StoreError::Schema {
            path: path.to_path_buf(),
            expected: "a JSON array of rules",
        });
    }
    let rules: Vec<CompiledRule> =
        serde_json::from_value(value).map_err(|e| StoreError::json(path, e))?;
    info!(path = %path.display(), rules = rules.len(), "loaded compiled rules");
    Ok(rules)
}

pub fn save_rules(path: &Path, rules: &[CompiledRule]) -> Result<(), StoreError> {
    write_json(path, rules)?;
    info!(path = %path.display(), rules = rules.len(), "saved compiled rules");
    Ok(())
}

/// Load a business profile. The top level must be a JSON object.
pub fn load_profile(path: &Path) -> Result<BusinessProfile, StoreError> {
    let value: Value = read_json(path)?;
    let profile = BusinessProfile::from_value(value).ok_or_else(|| StoreError::Schema {
        path: path.to_path_buf(),
        expected: "a JSON object of profile attributes",
    })?;
    info!(path = %path.display(), attributes = profile.len(), "loaded business profile");
    Ok(profile)
}

pub fn load_synonyms(path: &Path) -> Result<SynonymTable, StoreError> {
    let table: SynonymTable = read_json(path)?;
    info!(path = %path.display(), attributes = table.len(), "loaded synonym table");
    Ok(table)
}

pub fn load_match_result(path: &Path) -> Result<MatchResult, StoreError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmatch_core::{business_profile, match_rules, Section};
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_rules(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "[{").unwrap();
        assert!(matches!(load_rules(&path), Err(StoreError::Json { .. })));
    }

    #[test]
    fn rules_must_be_an_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"id": "R1"}"#).unwrap();
        assert!(matches!(load_rules(&path), Err(StoreError::Schema { .. })));
    }

    #[test]
    fn invalid_threshold_is_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"[{"id": "R1", "applies_if": {"seats_max": "lots"}}]"#).unwrap();
        let err = load_rules(&path).unwrap_err();
        assert!(err.to_string().contains("seats_max"), "{err}");
    }

    #[test]
    fn profile_must_be_an_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "[true]").unwrap();
        assert!(matches!(load_profile(&path), Err(StoreError::Schema { .. })));

        fs::write(&path, r#"{"uses_gas": true, "seats": 40}"#).unwrap();
        let profile = load_profile(&path).unwrap();
        assert_eq!(profile, business_profile! { "uses_gas" => true, "seats" => 40 });
    }

    #[test]
    fn document_written_without_ascii_escapes_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed").join("reg.json");
        let mut doc = RegulationDocument::new("reg", "בית אוכל");
        doc.sections.push(Section::new("1", "הגדרות"));

        save_document(&path, &doc).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("בית אוכל"));
        assert!(raw.contains("\"docId\""));
        assert_eq!(load_document(&path).unwrap(), doc);
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("match_x.json");
        write_json(&path, &serde_json::json!({"v": 1})).unwrap();
        write_json(&path, &serde_json::json!({"v": 2})).unwrap();
        let v: Value = read_json(&path).unwrap();
        assert_eq!(v["v"], 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn match_result_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        let profile = business_profile! { "uses_gas" => true };
        let rules: Vec<CompiledRule> =
            serde_json::from_str(r#"[{"id": "GAS", "applies_if": {"uses_gas": true}}]"#).unwrap();
        let result = MatchResult::Compiled(match_rules(&profile, &rules));

        write_json(&path, &result).unwrap();
        assert_eq!(load_match_result(&path).unwrap(), result);
    }

    #[test]
    fn synonyms_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("syn.json");
        fs::write(&path, r#"{"uses_gas": ["LPG"]}"#).unwrap();
        let table = load_synonyms(&path).unwrap();
        assert!(table.mentions("uses_gas", "LPG tank"));
    }
}

//! The payload handed to a report writer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use regmatch_core::BusinessProfile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ReportError;

/// A business profile and the rules matched for it.
///
/// Matched rules are carried as raw JSON so reports can be written from
/// either engine's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    pub business_profile: BusinessProfile,
    pub matched_rules: Vec<Value>,
}

/// Read a persisted match result. Both `profile` and `matches` must be present.
pub fn load_report_input(path: &Path) -> Result<ReportInput, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json_err = |source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    };
    let mut data: serde_json::Map<String, Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(json_err)?;

    let profile = data.remove("profile").ok_or(ReportError::MissingKey("profile"))?;
    let matches = data.remove("matches").ok_or(ReportError::MissingKey("matches"))?;

    let input = ReportInput {
        business_profile: serde_json::from_value(profile).map_err(json_err)?,
        matched_rules: serde_json::from_value(matches).map_err(json_err)?,
    };
    info!(
        path = %path.display(),
        rules = input.matched_rules.len(),
        "loaded report input"
    );
    Ok(input)
}

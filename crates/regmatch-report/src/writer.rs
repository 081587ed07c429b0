//! Report writers and the report generation step.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::input::load_report_input;
use crate::{ReportError, ReportInput};

/// Turns a report input into report text.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Name used in logs, e.g. the model.
    fn name(&self) -> &str;

    async fn write_report(&self, input: &ReportInput) -> Result<String, ReportError>;
}

/// Run id of a match file: its stem without the `match_` prefix.
pub fn report_id(match_file: &Path) -> String {
    let stem = match_file
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    stem.strip_prefix("match_").unwrap_or(&*stem).to_string()
}

/// Write a report for `match_file` into `<report_dir>/report_<run_id>.txt`.
///
/// Writer failures are returned as-is; nothing is written in that case.
pub async fn generate_report(
    writer: &dyn ReportWriter,
    match_file: &Path,
    report_dir: &Path,
) -> Result<PathBuf, ReportError> {
    let input = load_report_input(match_file)?;

    info!(writer = writer.name(), rules = input.matched_rules.len(), "writing report");
    let text = match writer.write_report(&input).await {
        Ok(text) if text.trim().is_empty() => return Err(ReportError::EmptyReport),
        Ok(text) => text,
        Err(e) => {
            warn!(writer = writer.name(), error = %e, "report writer failed");
            return Err(e);
        }
    };

    let io_err = |path: &Path, source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(report_dir).map_err(|e| io_err(report_dir, e))?;
    let path = report_dir.join(format!("report_{}.txt", report_id(match_file)));
    fs::write(&path, text).map_err(|e| io_err(&path, e))?;

    info!(path = %path.display(), "report saved");
    Ok(path)
}

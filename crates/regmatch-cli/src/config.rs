//! Runtime configuration from global flags and environment variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use regmatch_core::SynonymTable;
use regmatch_report::OllamaReportWriter;
use regmatch_store::{load_synonyms, DataDir};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Root of the data directory (processed/, matches/, report/).
    #[arg(long, env = "REGMATCH_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Compiled rule file [default: <data-dir>/processed/compiled_rules.json].
    #[arg(long, env = "REGMATCH_RULES", global = true)]
    pub rules: Option<PathBuf>,

    /// Synonym table JSON [default: built-in Hebrew food-service table].
    #[arg(long, env = "REGMATCH_SYNONYMS", global = true)]
    pub synonyms: Option<PathBuf>,

    /// Ollama server used for report generation.
    #[arg(long, env = "OLLAMA_HOST", default_value = "http://localhost:11434", global = true)]
    pub ollama_host: String,

    /// Ollama model used for report generation.
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3", global = true)]
    pub ollama_model: String,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataDir,
    pub rules: PathBuf,
    synonyms: Option<PathBuf>,
    ollama_host: String,
    ollama_model: String,
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Self {
        let data = DataDir::new(args.data_dir);
        let rules = args.rules.unwrap_or_else(|| data.compiled_rules());
        Self {
            data,
            rules,
            synonyms: args.synonyms,
            ollama_host: args.ollama_host,
            ollama_model: args.ollama_model,
        }
    }

    pub fn synonym_table(&self) -> anyhow::Result<SynonymTable> {
        match &self.synonyms {
            Some(path) => load_synonyms(path)
                .with_context(|| format!("loading synonyms from {}", path.display())),
            None => Ok(SynonymTable::food_service_he()),
        }
    }

    pub fn report_writer(&self) -> OllamaReportWriter {
        OllamaReportWriter::new(self.ollama_host.clone(), self.ollama_model.clone())
    }
}

//! Subcommand handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use regmatch_core::{
    compile_rules, generate_profile_id, structure_document, Orchestrator, RegulationDocument,
};
use regmatch_report::generate_report;
use regmatch_store::{
    extract_text, load_document, load_profile, save_document, save_rules, FileRuleSource,
    JsonResultStore,
};
use tracing::info;

use crate::config::Config;
use crate::display::print_match_card;

#[derive(Args, Debug)]
pub struct StructureArgs {
    /// Plain-text regulation source.
    pub input: PathBuf,

    /// Output JSON [default: <data-dir>/processed/reg_<doc-id>.json].
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Document id [default: input file stem].
    #[arg(long)]
    pub doc_id: Option<String>,

    /// Document title [default: document id].
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Structured regulation document JSON.
    pub document: PathBuf,

    /// Output rule file [default: the configured rules path].
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Business profile JSON.
    pub profile: PathBuf,

    /// Match against this structured document with the free-text engine.
    #[arg(long)]
    pub regdoc: Option<PathBuf>,

    /// Run id [default: <name>_<timestamp>].
    #[arg(long)]
    pub profile_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Match result JSON (match_<run_id>.json).
    pub match_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Business profile JSON.
    pub profile: PathBuf,

    /// Plain-text regulation source.
    pub source: PathBuf,

    /// Stop after matching.
    #[arg(long)]
    pub skip_report: bool,
}

pub fn run_structure(args: &StructureArgs, config: &Config) -> Result<()> {
    let doc_id = match &args.doc_id {
        Some(id) => id.clone(),
        None => file_stem(&args.input),
    };
    let title = args.title.clone().unwrap_or_else(|| doc_id.clone());
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| config.data.regulation_document(&doc_id));

    let document = structure_from_file(&args.input, &doc_id, &title)?;
    save_document(&out, &document)?;
    println!(
        "Structured {} sections ({} subsections) -> {}",
        document.sections.len(),
        document.subsection_count(),
        out.display()
    );
    Ok(())
}

pub fn run_compile(args: &CompileArgs, config: &Config) -> Result<()> {
    let document = load_document(&args.document)
        .with_context(|| format!("loading {}", args.document.display()))?;
    let rules = compile_rules(&document);
    let out = args.out.as_deref().unwrap_or(&config.rules);
    save_rules(out, &rules)?;
    println!("Compiled {} rules -> {}", rules.len(), out.display());
    Ok(())
}

pub fn run_match(args: &MatchArgs, config: &Config) -> Result<()> {
    let profile = load_profile(&args.profile)
        .with_context(|| format!("loading profile {}", args.profile.display()))?;

    let mut source = FileRuleSource::new(&config.rules);
    if let Some(doc) = &args.regdoc {
        source = source.with_document(doc);
    }
    let store = JsonResultStore::new(config.data.matches());
    let orchestrator = Orchestrator::new(config.synonym_table()?);

    let outcome = orchestrator.run(
        &profile,
        &source,
        &store,
        args.regdoc.is_some(),
        args.profile_id.as_deref(),
    )?;
    print_match_card(&outcome)?;
    Ok(())
}

pub async fn run_report(args: &ReportArgs, config: &Config) -> Result<()> {
    let writer = config.report_writer();
    let path = generate_report(&writer, &args.match_file, &config.data.reports())
        .await
        .with_context(|| format!("generating report for {}", args.match_file.display()))?;
    print_report(&path)
}

/// extract -> structure -> persist -> free-text match -> report.
pub async fn run_pipeline(args: &PipelineArgs, config: &Config) -> Result<()> {
    let profile = load_profile(&args.profile)
        .with_context(|| format!("loading profile {}", args.profile.display()))?;
    let run_id = generate_profile_id(&profile, chrono::Local::now().naive_local());
    info!(%run_id, "starting pipeline");

    let document = structure_from_file(&args.source, &run_id, &file_stem(&args.source))?;
    let doc_path = config.data.regulation_document(&run_id);
    save_document(&doc_path, &document)?;

    let source = FileRuleSource::new(&config.rules).with_document(&doc_path);
    let store = JsonResultStore::new(config.data.matches());
    let outcome = Orchestrator::new(config.synonym_table()?).run(
        &profile,
        &source,
        &store,
        true,
        Some(&run_id),
    )?;
    print_match_card(&outcome)?;

    if args.skip_report {
        return Ok(());
    }
    let path = generate_report(
        &config.report_writer(),
        &store.path_for(&run_id),
        &config.data.reports(),
    )
    .await
    .context("generating report")?;
    print_report(&path)
}

fn structure_from_file(path: &Path, doc_id: &str, title: &str) -> Result<RegulationDocument> {
    let text = extract_text(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(structure_document(&text, doc_id, title))
}

fn print_report(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    println!("{text}");
    println!();
    println!("Report saved to {}", path.display());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

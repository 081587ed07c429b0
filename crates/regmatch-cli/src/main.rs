//! # regmatch CLI entry point
//!
//! Structures regulation text, compiles rules, matches business profiles,
//! and writes compliance reports.

mod commands;
mod config;
mod display;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    run_compile, run_match, run_pipeline, run_report, run_structure, CompileArgs, MatchArgs,
    PipelineArgs, ReportArgs, StructureArgs,
};
use config::{Config, ConfigArgs};

/// Match business profiles against Hebrew licensing regulations.
#[derive(Parser, Debug)]
#[command(name = "regmatch", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a plain-text regulation into chapters and subsections.
    Structure(StructureArgs),

    /// Compile a structured regulation into conditional rules.
    Compile(CompileArgs),

    /// Match a business profile and save the result.
    Match(MatchArgs),

    /// Write a compliance report for a saved match result.
    Report(ReportArgs),

    /// Structure, match, and report in one run.
    Pipeline(PipelineArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("regmatch v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_args(cli.config);
    tracing::debug!(
        data_dir = %config.data.root().display(),
        rules = %config.rules.display(),
        "resolved configuration"
    );

    let result = match &cli.command {
        Commands::Structure(args) => run_structure(args, &config),
        Commands::Compile(args) => run_compile(args, &config),
        Commands::Match(args) => run_match(args, &config),
        Commands::Report(args) => run_report(args, &config).await,
        Commands::Pipeline(args) => run_pipeline(args, &config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

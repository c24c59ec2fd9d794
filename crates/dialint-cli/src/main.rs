//! Dialint CLI - consistency checks for dialogue-agent projects
//!
//! ## Commands
//!
//! - `check`: Report cross-document inconsistencies
//! - `fix`: Back up the affected documents and apply mechanical repairs
//!
//! Exit status: `0` when no issue-level finding remains, `1` when issues
//! remain or a repair failed, `2` on a fatal error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, Level};

use dialint_core::{
    check_report_json, fix_report_json, render_check_report, render_fix_report, Engine,
    FixOptions, LintError, ProjectConfig, RepairMode,
};

#[derive(Parser)]
#[command(name = "dialint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Consistency checker for declarative dialogue-agent projects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Do not write the rolling log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Report inconsistencies between the project documents
    Check {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Repair the auto-fixable inconsistencies
    Fix {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Rewrite undeclared story/rule references to the closest declared name
        #[arg(long)]
        rewrite_references: bool,

        /// Print the repair plan without touching any file
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn path(&self) -> &Path {
        match self {
            Commands::Check { path, .. } | Commands::Fix { path, .. } => path,
        }
    }
}

/// Failures that end the process with status 2.
fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<LintError>(),
            Some(LintError::Config { .. } | LintError::BackupUnavailable { .. })
        )
    })
}

async fn cmd_check(engine: &Engine, format: Format) -> Result<bool> {
    let report = engine.check().await;
    match format {
        Format::Text => print!("{}", render_check_report(&report)),
        Format::Json => println!("{}", check_report_json(&report)?),
    }
    Ok(report.is_clean())
}

async fn cmd_fix(engine: &Engine, format: Format, options: FixOptions) -> Result<bool> {
    let report = engine
        .fix(options)
        .await
        .context("Failed to start the repair run")?;
    match format {
        Format::Text => print!("{}", render_fix_report(&report)),
        Format::Json => println!("{}", fix_report_json(&report)?),
    }
    Ok(report.is_clean())
}

async fn run(cli: Cli) -> Result<bool> {
    let config = ProjectConfig::load(cli.command.path())
        .with_context(|| format!("Failed to load project config in {}", cli.command.path().display()))?;

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let log_dir = (!cli.no_log_file).then(|| config.log_dir.clone());
    let _guard = dialint_core::init_tracing(cli.json, level, log_dir.as_deref());

    let engine = Engine::new(config);
    match cli.command {
        Commands::Check { format, .. } => cmd_check(&engine, format).await,
        Commands::Fix {
            format,
            rewrite_references,
            dry_run,
            ..
        } => {
            let mode = if rewrite_references {
                RepairMode::Rewrite
            } else {
                RepairMode::Declare
            };
            cmd_fix(&engine, format, FixOptions { mode, dry_run }).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!(error = %format!("{err:#}"), "dialint failed");
            eprintln!("Error: {err:#}");
            if is_fatal(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

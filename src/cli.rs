//! Command-line interface definitions using clap

use crate::numbering::NumberingTable;
use crate::settings::{DEFAULT_SETTINGS_FILE, Settings};
use crate::site::{FileFailure, SiteProcessor, SiteReport};
use anyhow::{Result, bail};
use clap::{ArgAction, Parser, ValueHint};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Rewrite generated unit numbers and rebuild the landing-page mini TOC of a built site
#[derive(Parser, Debug)]
#[command(name = "tocnum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// HTML pages or site directories to process
    #[arg(required_unless_present = "print_table", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Write results into this directory instead of rewriting in place
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Settings file (JSON); defaults to tocnum.json when present
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Log file
    #[arg(long, default_value = "tocnum.log", value_hint = ValueHint::FilePath)]
    pub log_file: PathBuf,

    /// Raise log verbosity (-d debug, -dd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Print the numbering table and exit
    #[arg(long)]
    pub print_table: bool,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        let path = self
            .config
            .as_deref()
            .or_else(|| Path::new(DEFAULT_SETTINGS_FILE).exists().then_some(DEFAULT_SETTINGS_FILE));
        Settings::load_or_ephemeral(path)
    }
}

pub fn print_table(table: &NumberingTable, out: &mut impl Write) -> std::io::Result<()> {
    for (position, label) in table.positions() {
        writeln!(out, "{position:>3}  {label}")?;
    }
    Ok(())
}

/// Runs every input path and merges the reports. A path that can't be
/// processed at all is recorded as a failure and the remaining paths still run.
pub fn execute(cli: &Cli) -> Result<SiteReport> {
    if cli.output.is_some() && cli.paths.len() > 1 {
        bail!("--output takes a single input path, got {}", cli.paths.len());
    }

    let settings = cli.settings();
    if let Some(path) = settings.file_path() {
        info!("Using settings from {path}");
    }
    let processor = SiteProcessor::new(settings).dry_run(cli.dry_run);

    let mut total = SiteReport::default();
    for path in &cli.paths {
        let report = match processor.process_path(path, cli.output.as_deref()) {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to process {}: {e}", path.display());
                total.failures.push(FileFailure {
                    path: path.clone(),
                    error: e,
                });
                continue;
            }
        };
        total.files_scanned += report.files_scanned;
        total.files_changed += report.files_changed;
        total.labels_rewritten += report.labels_rewritten;
        total.mini_tocs_installed += report.mini_tocs_installed;
        total.failures.extend(report.failures);
    }
    Ok(total)
}

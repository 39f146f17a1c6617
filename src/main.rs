use std::fs::File;
use std::io::stdout;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use simplelog::{LevelFilter, WriteLogger};

use tocnum::cli::{Cli, execute, print_table};
use tocnum::numbering::NumberingTable;
use tocnum::panic_handler;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout only; an existing log file stays as it is
    if cli.print_table {
        print_table(&NumberingTable::standard(), &mut stdout())?;
        return Ok(());
    }

    let level = match cli.debug {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Initialize logging with html5ever DEBUG logs filtered out
    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_max_level(level)
            .add_filter_ignore_str("html5ever")
            .build(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?,
    )?;

    panic_handler::initialize_panic_handler();

    info!("Starting tocnum");
    let report = execute(&cli).inspect_err(|err| error!("Run failed: {err:?}"))?;

    for failure in &report.failures {
        eprintln!("{}: {}", failure.path.display(), failure.error);
    }
    println!(
        "{}{report}",
        if cli.dry_run { "(dry run) " } else { "" }
    );

    info!("Finished: {report}");
    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

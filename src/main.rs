use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::time::Instant;
use ticket_collate_report::collate::Collator;
use ticket_collate_report::config::Cli;
use ticket_collate_report::logging::setup_logging;
use ticket_collate_report::summary::log_run_summary;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    setup_logging(&cli.log_level, Some(cli.log_file.as_path()))?;
    info!("Starting collation and analysis...");

    let failed = match Collator::new(cli.collate_options()).run() {
        Ok(summary) => {
            log_run_summary(&summary, start_time.elapsed());
            false
        }
        Err(e) => {
            error!("An error occurred during processing: {:#}", e);
            true
        }
    };

    info!("Process finished.");
    log::logger().flush();

    if failed && cli.strict {
        std::process::exit(1);
    }
    Ok(())
}

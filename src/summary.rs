use crate::aggregate::FrequencyTable;
use crate::collate::{MergeOutcome, RunSummary};
use crate::fields::Category;
use log::{info, warn};
use std::time::Duration;

const TOP_VALUES: usize = 10;

pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

pub fn log_run_summary(summary: &RunSummary, elapsed: Duration) {
    let combined = &summary.combined;

    info!("-------------------- FINAL SUMMARY --------------------");
    info!("Total execution time: {}", format_elapsed(elapsed));
    info!("Input files processed: {}", summary.files.len());
    for file in &summary.files {
        info!("  - {}: {} tickets -> {}", file.path.display(), file.tickets, file.report.display());
        if file.parse_errors > 0 {
            warn!("    {} unreadable lines skipped", file.parse_errors);
        }
    }

    match summary.merge {
        MergeOutcome::Written => info!("Merged dataset written."),
        MergeOutcome::Unchanged => info!("Merged dataset already up to date."),
        MergeOutcome::Rewritten { .. } => info!("Merged dataset re-collated."),
    }

    info!("Combined tickets: {}", combined.total_tickets);
    info!("Spam tickets: {}", combined.spam_ticket_count);
    if combined.undated_ticket_count > 0 {
        warn!("Tickets without a usable created_at: {}", combined.undated_ticket_count);
    }

    log_breakdown("tags", &combined.tags);
    for category in Category::ALL {
        log_breakdown(category.name(), combined.category(category));
    }

    info!("Combined analysis written to: {}", summary.combined_report.display());
    info!("Collation and analysis completed successfully.");
}

fn log_breakdown(label: &str, table: &FrequencyTable) {
    info!("Distinct {} values: {}", label, table.distinct());
    let rows = table.sorted_by_count();
    for (value, count) in rows.iter().take(TOP_VALUES) {
        info!("  - {}: {} tickets", value, count);
    }
    if rows.len() > TOP_VALUES {
        info!("  ... ({} more)", rows.len() - TOP_VALUES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_scales_units() {
        assert_eq!(format_elapsed(Duration::from_millis(1_250)), "1.250s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_elapsed(Duration::from_secs(3_725)), "1h 2m 5s");
    }
}

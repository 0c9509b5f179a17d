use crate::collate::CollateOptions;
use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Support Ticket Collator")]
#[command(about = "Collate line-delimited JSON ticket exports and write per-file and combined analysis reports")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[arg(short, long, default_value = "./json_files", help = "Directory containing .json / .json.gz ticket exports")]
    pub input: PathBuf,

    #[arg(short, long, default_value = "combined.json", help = "Merged JSON output file")]
    pub output: PathBuf,

    #[arg(short, long, default_value = "combined_analysis", help = "Path (without extension) of the combined analysis report")]
    pub combined_report: PathBuf,

    #[arg(short, long, help = "Directory for per-file analysis reports (defaults to the input directory)")]
    pub reports_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Xlsx, help = "Report format")]
    pub format: ReportFormat,

    #[arg(long, default_value = "collate_json_files.log", help = "Log file, truncated on every run")]
    pub log_file: PathBuf,

    #[arg(short, long, default_value = "INFO", help = "Logging level (DEBUG, INFO, WARN, ERROR)")]
    pub log_level: String,

    #[arg(long, help = "Exit with a non-zero status when the run fails")]
    pub strict: bool,
}

impl Cli {
    pub fn collate_options(&self) -> CollateOptions {
        CollateOptions {
            input_dir: self.input.clone(),
            merged_output: self.output.clone(),
            combined_report: self.combined_report.clone(),
            reports_dir: self.reports_dir.clone(),
            format: self.format,
        }
    }
}

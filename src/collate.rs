use crate::aggregate::{analyze, AggregationResult};
use crate::error::CollateError;
use crate::loader::{find_input_files, load_records, source_stem};
use crate::report::{ReportDocument, ReportFormat, ReportRenderer};
use crate::summary::format_elapsed;
use crate::validate::validate;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct CollateOptions {
    pub input_dir: PathBuf,
    pub merged_output: PathBuf,
    /// Combined report path without extension.
    pub combined_report: PathBuf,
    /// Where per-file reports go; the input directory when unset.
    pub reports_dir: Option<PathBuf>,
    pub format: ReportFormat,
}

/// What happened to the persisted merged dataset on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No merged file existed; it was written.
    Written,
    /// Existing file has the same record count; left untouched.
    Unchanged,
    /// Existing file disagreed (or was unreadable) and was overwritten.
    Rewritten { persisted: Option<usize> },
}

#[derive(Debug)]
pub struct FileSummary {
    pub path: PathBuf,
    pub tickets: usize,
    pub parse_errors: usize,
    pub report: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub files: Vec<FileSummary>,
    pub merge: MergeOutcome,
    pub combined: AggregationResult,
    pub combined_report: PathBuf,
}

pub struct Collator {
    options: CollateOptions,
    renderer: Box<dyn ReportRenderer>,
}

impl Collator {
    pub fn new(options: CollateOptions) -> Self {
        let renderer = options.format.renderer();
        Self { options, renderer }
    }

    /// Processes every source file, persists the union, validates it and writes
    /// the combined report. Per-file reports already written stay on disk when a
    /// later step fails.
    pub fn run(&self) -> Result<RunSummary> {
        let options = &self.options;
        info!("Searching for input files in: {}", options.input_dir.display());
        let files = find_input_files(&options.input_dir, Some(options.merged_output.as_path()))?;
        if files.is_empty() {
            error!("No JSON files found in the input folder.");
            return Err(CollateError::NoInputFiles { dir: options.input_dir.clone() }.into());
        }
        info!("Found {} files to process.", files.len());

        let reports_dir = options.reports_dir.as_deref().unwrap_or(options.input_dir.as_path());
        let progress_bar = ProgressBar::new(files.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Failed to create progress bar template")?
                .progress_chars("=> "),
        );

        let mut all_records: Vec<Value> = Vec::new();
        let mut file_summaries = Vec::with_capacity(files.len());

        for path in &files {
            let started = Instant::now();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            info!("Processing file: {}", file_name);

            let loaded = load_records(path)?;
            let stats = analyze(&loaded.records);
            let report_stem = reports_dir.join(format!("{}_analysis", source_stem(path)));
            let report = self
                .renderer
                .render(&ReportDocument::from_stats(&stats), &report_stem)
                .with_context(|| format!("Failed to write analysis for {}", path.display()))?;

            file_summaries.push(FileSummary {
                path: path.clone(),
                tickets: loaded.records.len(),
                parse_errors: loaded.parse_errors,
                report,
            });
            all_records.extend(loaded.records);

            progress_bar.inc(1);
            progress_bar.set_message(format!(
                "OK: {} ({} tickets, {})",
                file_name,
                stats.total_tickets,
                format_elapsed(started.elapsed())
            ));
        }
        progress_bar.finish_with_message(format!("{} files processed", files.len()));

        let merge = persist_merged(&options.merged_output, &all_records)?;

        let combined = analyze(&all_records);
        validate(&combined)?;

        let combined_report = self
            .renderer
            .render(&ReportDocument::from_stats(&combined), &options.combined_report)
            .context("Failed to write combined analysis")?;

        Ok(RunSummary {
            files: file_summaries,
            merge,
            combined,
            combined_report,
        })
    }
}

/// Writes the union to `path` unless a previously persisted file already holds the
/// same number of records. Only the count is compared, not the contents.
pub fn persist_merged(path: &Path, records: &[Value]) -> Result<MergeOutcome> {
    if !path.exists() {
        info!("Writing combined JSON data to output file...");
        write_merged(path, records)?;
        return Ok(MergeOutcome::Written);
    }

    info!("{} already exists. Verifying the integrity of the collated data...", path.display());
    let persisted = match persisted_record_count(path) {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Could not read existing collated data ({:#}).", e);
            None
        }
    };

    if persisted == Some(records.len()) {
        info!("The collated data is complete. Skipping re-collation.");
        return Ok(MergeOutcome::Unchanged);
    }

    warn!(
        "The collated data does not match the split files ({} persisted, {} current). Re-collating data...",
        persisted.map_or_else(|| "unreadable".to_string(), |n| n.to_string()),
        records.len()
    );
    write_merged(path, records)?;
    Ok(MergeOutcome::Rewritten { persisted })
}

fn persisted_record_count(path: &Path) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let existing: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    match existing {
        Value::Array(items) => Ok(items.len()),
        _ => Err(anyhow::anyhow!("{} does not hold a JSON array", path.display())),
    }
}

fn write_merged(path: &Path, records: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory structure for: {}", path.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Failed to write merged records to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn writes_when_absent_then_skips_when_count_matches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/combined.json");
        let records = vec![json!({"id": 1}), json!({"id": 2})];

        assert_eq!(persist_merged(&path, &records).unwrap(), MergeOutcome::Written);
        let first = fs::read_to_string(&path).unwrap();

        assert_eq!(persist_merged(&path, &records).unwrap(), MergeOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn equal_count_with_different_content_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("combined.json");
        fs::write(&path, r#"[{"id": "old-a"}, {"id": "old-b"}]"#).unwrap();

        let records = vec![json!({"id": 1}), json!({"id": 2})];
        assert_eq!(persist_merged(&path, &records).unwrap(), MergeOutcome::Unchanged);
        assert!(fs::read_to_string(&path).unwrap().contains("old-a"));
    }

    #[test]
    fn count_mismatch_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("combined.json");
        fs::write(&path, r#"[{"id": 1}]"#).unwrap();

        let records = vec![json!({"id": 1}), json!({"id": 2})];
        assert_eq!(
            persist_merged(&path, &records).unwrap(),
            MergeOutcome::Rewritten { persisted: Some(1) }
        );
        let rewritten: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten, records);
    }

    #[test]
    fn unreadable_persisted_file_is_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("combined.json");
        fs::write(&path, "{ truncated").unwrap();

        let records = vec![json!({"id": 1})];
        assert_eq!(
            persist_merged(&path, &records).unwrap(),
            MergeOutcome::Rewritten { persisted: None }
        );
    }
}

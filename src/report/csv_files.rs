use super::{ReportDocument, ReportRenderer, OVERVIEW_SHEET};
use anyhow::{Context, Result};
use csv::Writer;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a `<stem>/` directory with one CSV per table. Carries no charts.
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn render(&self, document: &ReportDocument, stem: &Path) -> Result<PathBuf> {
        let dir = stem.to_path_buf();
        info!("Writing analysis to CSV directory: {}", dir.display());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

        let overview_rows = document
            .overview
            .iter()
            .map(|(label, value)| (label.as_str(), *value));
        write_table(&dir, OVERVIEW_SHEET, ["Metric", "Value"], overview_rows, None)?;

        for section in &document.sections {
            let rows = section.rows.iter().map(|(value, count)| (value.as_str(), *count));
            write_table(
                &dir,
                section.sheet_name,
                [section.column_title, "Count"],
                rows,
                Some(section.total),
            )?;
        }

        Ok(dir)
    }
}

fn write_table<'a>(
    dir: &Path,
    sheet_name: &str,
    headers: [&str; 2],
    rows: impl Iterator<Item = (&'a str, usize)>,
    total: Option<usize>,
) -> Result<()> {
    let path = dir.join(format!("{}.csv", file_name_for(sheet_name)));
    let mut writer = Writer::from_path(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    writer.write_record(headers)?;
    for (label, count) in rows {
        writer.write_record([label, count.to_string().as_str()])?;
    }
    if let Some(total) = total {
        writer.write_record(["Total", total.to_string().as_str()])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}

fn file_name_for(sheet_name: &str) -> String {
    sheet_name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::analyze;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn writes_one_csv_per_table() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            json!({"tags": ["b", "a", "b"], "custom_fields": [{"id": 38830788, "value": "housing"}]}),
            json!({"created_at": "2023-05-01T10:00:00.000Z", "tags": ["a"]}),
        ];
        let document = ReportDocument::from_stats(&analyze(&records));

        let written = CsvRenderer.render(&document, &dir.path().join("combined_analysis")).unwrap();
        assert_eq!(written, dir.path().join("combined_analysis"));

        let mut names: Vec<String> = fs::read_dir(&written)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "channel_report.csv",
                "overview.csv",
                "program_area_report.csv",
                "segment_report.csv",
                "tag_report.csv",
                "type_report.csv",
            ]
        );

        let tags = fs::read_to_string(written.join("tag_report.csv")).unwrap();
        assert_eq!(tags, "Tag,Count\na,2\nb,2\nTotal,4\n");

        let overview = fs::read_to_string(written.join("overview.csv")).unwrap();
        assert_eq!(
            overview,
            "Metric,Value\nTotal number of tickets,2\nNumber of spam tickets,1\nNumber of tickets for year 2023,1\n"
        );
    }
}

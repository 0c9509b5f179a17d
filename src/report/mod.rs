//! Report document model and the renderers that write it to disk.
//!
//! An [`AggregationResult`] is first turned into a [`ReportDocument`]: an overview
//! table followed by one table per category. Renderers only lay that document out;
//! they never look at tickets or counters directly.

mod csv_files;
mod workbook;

pub use self::csv_files::CsvRenderer;
pub use self::workbook::XlsxRenderer;

use crate::aggregate::{AggregationResult, FrequencyTable};
use anyhow::Result;
use clap::ValueEnum;
use std::path::{Path, PathBuf};

pub const OVERVIEW_SHEET: &str = "Overview";

/// One category table: a row per distinct value, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySection {
    pub sheet_name: &'static str,
    pub column_title: &'static str,
    pub rows: Vec<(String, usize)>,
    pub total: usize,
}

impl CategorySection {
    fn new(sheet_name: &'static str, column_title: &'static str, table: &FrequencyTable) -> Self {
        let rows: Vec<(String, usize)> = table
            .sorted_by_count()
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect();
        let total = rows.iter().map(|(_, count)| count).sum();
        Self { sheet_name, column_title, rows, total }
    }

    pub fn chart_title(&self) -> String {
        format!("{} Distribution", self.column_title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// (metric label, value) pairs for the overview sheet.
    pub overview: Vec<(String, usize)>,
    pub sections: Vec<CategorySection>,
}

impl ReportDocument {
    pub fn from_stats(stats: &AggregationResult) -> Self {
        let mut overview = vec![
            ("Total number of tickets".to_string(), stats.total_tickets),
            ("Number of spam tickets".to_string(), stats.spam_ticket_count),
        ];
        for (year, count) in &stats.created_at_year_count {
            overview.push((format!("Number of tickets for year {}", year), *count));
        }

        let sections = vec![
            CategorySection::new("Tag Report", "Tag", &stats.tags),
            CategorySection::new("Program Area Report", "Program Area", &stats.program_area),
            CategorySection::new("Segment Report", "Segment", &stats.segment),
            CategorySection::new("Channel Report", "Channel", &stats.channel),
            CategorySection::new("Type Report", "Type of Inquiry", &stats.type_of_inquiry),
        ];

        Self { overview, sections }
    }
}

/// Appends `suffix` to the final path component without touching any dots already in it.
pub(crate) fn append_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

pub trait ReportRenderer {
    /// Writes the document next to `stem` and returns the path actually written.
    fn render(&self, document: &ReportDocument, stem: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Excel workbook with one sheet per table and pie charts
    Xlsx,
    /// Directory of CSV files, one per table
    Csv,
}

impl ReportFormat {
    pub fn renderer(self) -> Box<dyn ReportRenderer> {
        match self {
            ReportFormat::Xlsx => Box::new(XlsxRenderer),
            ReportFormat::Csv => Box::new(CsvRenderer),
        }
    }
}

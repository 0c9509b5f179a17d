use super::{append_suffix, CategorySection, ReportDocument, ReportRenderer, OVERVIEW_SHEET};
use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Color, Format, FormatBorder, Workbook, Worksheet,
};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER_BACKGROUND: u32 = 0x003660;
const PIE_CHART_STYLE: u8 = 10;

struct SheetFormats {
    header: Format,
    cell: Format,
}

impl SheetFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_BACKGROUND))
                .set_border(FormatBorder::Thin),
            cell: Format::new().set_border(FormatBorder::Thin),
        }
    }
}

/// Writes `<stem>.xlsx`: an overview sheet plus one sheet and pie chart per category.
pub struct XlsxRenderer;

impl ReportRenderer for XlsxRenderer {
    fn render(&self, document: &ReportDocument, stem: &Path) -> Result<PathBuf> {
        let path = append_suffix(stem, ".xlsx");
        info!("Writing analysis to Excel file: {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory structure for: {}", path.display()))?;
        }

        let formats = SheetFormats::new();
        let mut workbook = Workbook::new();

        let overview = workbook.add_worksheet();
        write_overview(overview, &document.overview, &formats)
            .context("Failed to write overview sheet")?;

        for section in &document.sections {
            let sheet = workbook.add_worksheet();
            write_section(sheet, section, &formats)
                .with_context(|| format!("Failed to write sheet '{}'", section.sheet_name))?;
        }

        workbook
            .save(&path)
            .with_context(|| format!("Failed to save workbook: {}", path.display()))?;
        Ok(path)
    }
}

fn write_overview(sheet: &mut Worksheet, rows: &[(String, usize)], formats: &SheetFormats) -> Result<()> {
    sheet.set_name(OVERVIEW_SHEET)?;
    sheet.write_string_with_format(0, 0, "Metric", &formats.header)?;
    sheet.write_string_with_format(0, 1, "Value", &formats.header)?;

    for (row, (label, value)) in (1u32..).zip(rows) {
        sheet.write_string_with_format(row, 0, label.as_str(), &formats.cell)?;
        sheet.write_number_with_format(row, 1, *value as f64, &formats.cell)?;
    }

    sheet.set_column_width(0, 50.0)?;
    sheet.set_column_width(1, 20.0)?;
    Ok(())
}

fn write_section(sheet: &mut Worksheet, section: &CategorySection, formats: &SheetFormats) -> Result<()> {
    sheet.set_name(section.sheet_name)?;
    sheet.write_string_with_format(0, 0, section.column_title, &formats.header)?;
    sheet.write_string_with_format(0, 1, "Count", &formats.header)?;

    let mut row: u32 = 1;
    for (value, count) in &section.rows {
        sheet.write_string_with_format(row, 0, value.as_str(), &formats.cell)?;
        sheet.write_number_with_format(row, 1, *count as f64, &formats.cell)?;
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "Total", &formats.header)?;
    sheet.write_number_with_format(row, 1, section.total as f64, &formats.header)?;

    sheet.set_column_width(0, 30.0)?;
    sheet.set_column_width(1, 15.0)?;

    // A pie over an empty range is rejected by Excel.
    if section.rows.is_empty() {
        return Ok(());
    }

    let last_row = row - 1;
    let title = section.chart_title();
    let mut chart = Chart::new(ChartType::Pie);
    chart
        .add_series()
        .set_name(title.as_str())
        .set_categories((section.sheet_name, 1, 0, last_row, 0))
        .set_values((section.sheet_name, 1, 1, last_row, 1))
        .set_data_label(ChartDataLabel::new().show_percentage());
    chart.title().set_name(title.as_str());
    chart.set_style(PIE_CHART_STYLE);

    sheet.insert_chart(1, 3, &chart)?;
    Ok(())
}

// Energy-usage appendix: chart images and the monthly bill tables.
//
// Charts come from the spreadsheet saved as a web page. The export folder
// and the numbering of its images depend on the platform it was saved on.
// The bill tables come from two CSV exports next to the charts.
use crate::document::{Alignment, Document, Paragraph};
use crate::error::{ReportError, Result};
use crate::util::{format_rounded, parse_grouped_number};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;
use std::path::{Path, PathBuf};

/// Chart tags in the energy template, with their image width in inches.
pub const CHART_TAGS: [(&str, f32); 9] = [
    ("#EUChart", 6.0),
    ("#ECChart", 6.0),
    ("#DUChart", 6.0),
    ("#DCChart", 6.0),
    ("#FUChart", 6.0),
    ("#FCChart", 6.0),
    ("#PieUChart", 6.0),
    ("#PieCChart", 6.0),
    ("#TotalChart", 9.0),
];

/// Twelve months and the total row.
pub const BILL_ROWS: usize = 13;
/// First data row of each bill table, below its header rows.
pub const BILL_FIRST_ROW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartLayout {
    MacOs,
    Windows,
}

impl ChartLayout {
    pub fn folder_name(self) -> &'static str {
        match self {
            ChartLayout::MacOs => "Energy Charts.fld",
            ChartLayout::Windows => "Energy Charts_files",
        }
    }

    /// Image numbers in `CHART_TAGS` order.
    fn image_numbers(self) -> [u32; 9] {
        match self {
            ChartLayout::MacOs => [1, 2, 3, 4, 5, 6, 7, 8, 9],
            // the Windows export interleaves an extra image after some charts
            ChartLayout::Windows => [1, 2, 3, 5, 6, 7, 9, 11, 13],
        }
    }
}

/// One monthly bill table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillTable {
    pub file_name: &'static str,
    /// Position among the energy template's tables.
    pub table_index: usize,
    /// Numeric columns after the month.
    pub columns: usize,
}

pub const ELECTRICITY_BILLS: BillTable = BillTable {
    file_name: "electricity.csv",
    table_index: 0,
    columns: 7,
};

pub const FUEL_BILLS: BillTable = BillTable {
    file_name: "fuel.csv",
    table_index: 1,
    columns: 3,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BillRow {
    pub month: String,
    pub values: Vec<f64>,
}

/// Located chart export.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyCharts {
    pub layout: ChartLayout,
    pub charts_dir: PathBuf,
    pub image_dir: PathBuf,
}

impl EnergyCharts {
    /// Find the chart export under `charts_dir`, preferring the macOS one.
    pub fn locate(charts_dir: &Path) -> Result<Self> {
        [ChartLayout::MacOs, ChartLayout::Windows]
            .into_iter()
            .map(|layout| (layout, charts_dir.join(layout.folder_name())))
            .find(|(_, dir)| dir.is_dir())
            .map(|(layout, image_dir)| Self {
                layout,
                charts_dir: charts_dir.to_path_buf(),
                image_dir,
            })
            .ok_or_else(|| ReportError::ChartsNotFound(charts_dir.to_path_buf()))
    }

    /// `(tag, image path, width)` for every chart.
    pub fn images(&self) -> Vec<(&'static str, PathBuf, f32)> {
        CHART_TAGS
            .iter()
            .zip(self.layout.image_numbers())
            .map(|(&(tag, width), n)| (tag, self.image_dir.join(format!("image{n:03}.png")), width))
            .collect()
    }

    /// Insert the charts and fill both bill tables.
    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        for (tag, path, width) in self.images() {
            doc.add_image(tag, &path, width)?;
        }
        for bills in [ELECTRICITY_BILLS, FUEL_BILLS] {
            let rows = read_bills(&self.charts_dir.join(bills.file_name), bills.columns)?;
            fill_bill_table(doc, bills.table_index, &rows)?;
        }
        Ok(())
    }
}

fn parse_bill_row(record: &StringRecord, columns: usize, path: &Path) -> Result<BillRow> {
    if record.len() != columns + 1 {
        return Err(ReportError::Parse(format!(
            "{}: expected a month and {} values, found {} fields",
            path.display(),
            columns,
            record.len()
        )));
    }
    let month = record.get(0).unwrap_or_default().trim().to_string();
    let values = record
        .iter()
        .skip(1)
        .map(|field| {
            parse_grouped_number(field).ok_or_else(|| {
                ReportError::Parse(format!("{}: {:?} is not a number", path.display(), field))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(BillRow { month, values })
}

/// Read a bill CSV (header row, then twelve months and a total).
pub fn read_bills(path: &Path, columns: usize) -> Result<Vec<BillRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let rows = rdr
        .records()
        .map(|record| parse_bill_row(&record?, columns, path))
        .collect::<Result<Vec<_>>>()?;
    if rows.len() != BILL_ROWS {
        return Err(ReportError::Parse(format!(
            "{}: expected {} rows, found {}",
            path.display(),
            BILL_ROWS,
            rows.len()
        )));
    }
    debug!(path = %path.display(), rows = rows.len(), "bill table read");
    Ok(rows)
}

fn fill(cell: &mut Paragraph, text: String, alignment: Alignment, bold: bool) {
    cell.set_text(text);
    cell.alignment = Some(alignment);
    cell.bold = bold;
}

/// Write bill rows into a template table. The total row is bold.
pub fn fill_bill_table(doc: &mut Document, table_index: usize, rows: &[BillRow]) -> Result<()> {
    let table = doc
        .table_mut(table_index)
        .ok_or_else(|| ReportError::Template(format!("energy template has no table {table_index}")))?;
    let last = rows.len().saturating_sub(1);
    for (i, row) in rows.iter().enumerate() {
        let cells = table
            .row_mut(i + BILL_FIRST_ROW)
            .filter(|cells| cells.len() > row.values.len())
            .ok_or_else(|| {
                ReportError::Template(format!(
                    "energy table {} has no room for row {}",
                    table_index,
                    i + BILL_FIRST_ROW
                ))
            })?;
        let bold = i == last;
        fill(&mut cells[0], row.month.clone(), Alignment::Center, bold);
        for (cell, value) in cells[1..].iter_mut().zip(&row.values) {
            fill(cell, format_rounded(*value), Alignment::Right, bold);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Table;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use std::fs;

    const MONTHS: [&str; 12] = [
        "Jan-23", "Feb-23", "Mar-23", "Apr-23", "May-23", "Jun-23", "Jul-23", "Aug-23", "Sep-23",
        "Oct-23", "Nov-23", "Dec-23",
    ];

    fn bill_csv(columns: usize) -> String {
        let mut out = String::from("Month");
        for c in 0..columns {
            out.push_str(&format!(",C{c}"));
        }
        out.push('\n');
        for month in MONTHS {
            out.push_str(month);
            for c in 0..columns {
                out.push_str(&format!(",{}", 1000.4 + c as f64));
            }
            out.push('\n');
        }
        out.push_str("Total");
        for c in 0..columns {
            out.push_str(&format!(",\"{}\"", if c == 0 { "12,004.8" } else { "12004.8" }));
        }
        out.push('\n');
        out
    }

    fn chart_dir(layout: ChartLayout) -> TempDir {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join(layout.folder_name());
        fs::create_dir_all(&images).unwrap();
        for n in 1..=13 {
            fs::write(images.join(format!("image{n:03}.png")), b"png").unwrap();
        }
        fs::write(dir.path().join("electricity.csv"), bill_csv(7)).unwrap();
        fs::write(dir.path().join("fuel.csv"), bill_csv(3)).unwrap();
        dir
    }

    fn energy_template() -> Document {
        let mut doc = Document::default();
        for (tag, _) in CHART_TAGS {
            doc.push_paragraph(Paragraph::new(tag));
        }
        for columns in [7, 3] {
            doc.push_table(Table::from_rows(
                (0..BILL_FIRST_ROW + BILL_ROWS).map(|_| vec![""; columns + 1]),
            ));
        }
        doc
    }

    #[test]
    fn missing_export_is_reported() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            EnergyCharts::locate(dir.path()),
            Err(ReportError::ChartsNotFound(_))
        ));
    }

    #[test]
    fn windows_export_uses_its_own_numbering() {
        let dir = chart_dir(ChartLayout::Windows);
        let charts = EnergyCharts::locate(dir.path()).unwrap();
        assert_eq!(charts.layout, ChartLayout::Windows);
        let images = charts.images();
        assert_eq!(images[3].0, "#DCChart");
        assert!(images[3].1.ends_with("Energy Charts_files/image005.png"));
        assert_eq!(images[8].0, "#TotalChart");
        assert!(images[8].1.ends_with("image013.png"));
        assert_eq!(images[8].2, 9.0);
    }

    #[test]
    fn apply_fills_charts_and_tables() {
        let dir = chart_dir(ChartLayout::MacOs);
        let charts = EnergyCharts::locate(dir.path()).unwrap();
        let mut doc = energy_template();
        charts.apply(&mut doc).unwrap();

        let images: Vec<_> = doc.paragraphs().flat_map(|p| p.images.iter()).collect();
        assert_eq!(images.len(), 9);
        assert!(images[8].path.ends_with("image009.png"));
        assert!(doc.paragraphs().all(|p| p.text.is_empty()));

        let electricity = doc.tables().next().unwrap();
        assert_eq!(electricity.cell_text(3, 0), Some("Jan-23"));
        assert_eq!(electricity.cell_text(3, 1), Some("1,000"));
        assert_eq!(electricity.cell_text(3, 7), Some("1,006"));
        assert_eq!(electricity.cell_text(15, 0), Some("Total"));
        assert_eq!(electricity.cell_text(15, 1), Some("12,005"));
        assert!(electricity.rows[15].iter().all(|c| c.bold));
        assert!(!electricity.rows[14][1].bold);
        assert_eq!(electricity.rows[3][0].alignment, Some(Alignment::Center));
        assert_eq!(electricity.rows[3][2].alignment, Some(Alignment::Right));

        let fuel = doc.tables().nth(1).unwrap();
        assert_eq!(fuel.cell_text(4, 3), Some("1,002"));
    }

    #[test]
    fn short_bill_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fuel.csv");
        fs::write(&path, "Month,A,B,C\nJan-23,1,2,3\n").unwrap();
        assert!(matches!(read_bills(&path, 3), Err(ReportError::Parse(_))));
    }
}

// Side outputs of a run: CSV and JSON exports and console previews.
use crate::error::{ReportError, Result};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use std::fs;
use std::path::Path;

/// Manual follow-ups printed after a successful run.
pub const CAVEATS: [&str; 2] = [
    "Please add Process Description, Major Equipment, Current Best Practices, and plant layout image.",
    "Please refresh ToC, tables and figures after running this script.",
];

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s).map_err(|e| ReportError::io(path, e))
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| ReportError::io(path, e))
}

/// Markdown table of the first `max_rows` rows.
pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_rows(rows, max_rows));
}

pub fn print_caveats() {
    for caveat in CAVEATS {
        println!("Caveat: {}", caveat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryRow;
    use tempfile::TempDir;

    fn row(label: &str) -> SummaryRow {
        SummaryRow {
            label: label.to_string(),
            arc: "2.4236.1".to_string(),
            description: "Repair Leaks".to_string(),
            savings_type: "Electricity".to_string(),
            savings_value: "1,000 kWh\n(10 MMBtu)".to_string(),
            annual_cost_savings: "$100".to_string(),
            implementation_cost: "$50".to_string(),
            payback: "0.5".to_string(),
        }
    }

    #[test]
    fn csv_uses_the_column_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recommendations.csv");
        write_csv(&path, &[row("AR 1"), row("AR 2")]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "Recommendation,ARC No.,Description,SavingsType,SavingsValue,AnnualCostSavings,ImplementationCost,PaybackPeriod"
        );
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.records().count(), 2);
    }

    #[test]
    fn preview_is_limited_and_handles_empty_sets() {
        let rows = vec![row("AR 1"), row("AR 2"), row("AR 3")];
        let text = render_rows(&rows, 2);
        assert!(text.contains("AR 2"));
        assert!(!text.contains("AR 3"));
        assert_eq!(render_rows::<SummaryRow>(&[], 5), "(no rows)");
    }
}

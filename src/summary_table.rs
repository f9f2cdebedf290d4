// Summary tables of the introduction.
//
// The introduction template carries one table per recommendation set, each
// with a header row followed by a fixed number of blank rows. Rows are
// filled from the top and the unused blank rows are deleted from the end.
use crate::config::{ReportConfig, TableSlot};
use crate::document::{Alignment, Document, Paragraph, Table};
use crate::error::{ReportError, Result};
use crate::reports::{summary_rows, OrderedRecommendations};
use crate::restyle::canonical_title;
use crate::types::{NumberedRecommendation, SummaryRow};
use crate::util::{format_currency, format_payback, format_truncated};
use tracing::debug;

const COLUMN_ALIGNMENT: [Alignment; 7] = [
    Alignment::Center,
    Alignment::Left,
    Alignment::Center,
    Alignment::Center,
    Alignment::Right,
    Alignment::Right,
    Alignment::Right,
];

const CELL_SPACING_PT: f32 = 3.0;

fn fill_cell(cell: &mut Paragraph, text: String, alignment: Alignment) {
    cell.set_text(text);
    cell.alignment = Some(alignment);
    cell.space_before_pt = Some(CELL_SPACING_PT);
    cell.space_after_pt = Some(CELL_SPACING_PT);
}

fn row_cells(row: &SummaryRow) -> [String; 7] {
    let label = if row.arc.is_empty() {
        row.label.clone()
    } else {
        format!("{}\n{}", row.label, row.arc)
    };
    [
        label,
        row.description.clone(),
        row.savings_type.clone(),
        row.savings_value.clone(),
        row.annual_cost_savings.clone(),
        row.implementation_cost.clone(),
        row.payback.clone(),
    ]
}

/// Fill the table at `slot` with `rows` and drop the blank rows left over.
pub fn write_summary_table(doc: &mut Document, slot: TableSlot, rows: &[SummaryRow]) -> Result<()> {
    if rows.len() > slot.capacity {
        return Err(ReportError::Template(format!(
            "{} recommendations do not fit the {} rows of table {}",
            rows.len(),
            slot.capacity,
            slot.index
        )));
    }
    let table = doc.table_mut(slot.index).ok_or_else(|| {
        ReportError::Template(format!("introduction has no table {}", slot.index))
    })?;
    if table.rows.len() < slot.capacity + 1 {
        return Err(ReportError::Template(format!(
            "table {} has {} rows, expected a header and {} blank rows",
            slot.index,
            table.rows.len(),
            slot.capacity
        )));
    }

    for (i, row) in rows.iter().enumerate() {
        let cells = table
            .row_mut(i + 1)
            .filter(|cells| cells.len() >= COLUMN_ALIGNMENT.len())
            .ok_or_else(|| {
                ReportError::Template(format!(
                    "row {} of table {} has fewer than {} cells",
                    i + 1,
                    slot.index,
                    COLUMN_ALIGNMENT.len()
                ))
            })?;
        for ((cell, text), alignment) in cells.iter_mut().zip(row_cells(row)).zip(COLUMN_ALIGNMENT) {
            fill_cell(cell, text, alignment);
        }
    }

    // Delete from the end so the header row is never touched.
    for index in (rows.len()..slot.capacity).rev() {
        table.remove_row(index + 1);
    }
    debug!(table = slot.index, rows = rows.len(), "summary table written");
    Ok(())
}

/// Write both summary tables. Without supplemental recommendations their
/// table and the `<AAR>`-style block are removed.
pub fn fill_introduction(
    doc: &mut Document,
    ordered: &OrderedRecommendations,
    report: &ReportConfig,
) -> Result<()> {
    let primary = summary_rows(&ordered.primary, &report.primary_label);
    write_summary_table(doc, report.primary_table, &primary)?;

    if ordered.has_supplemental() {
        let supplemental = summary_rows(&ordered.supplemental, &report.supplemental_label);
        write_summary_table(doc, report.supplemental_table, &supplemental)?;
    } else if doc.remove_table(report.supplemental_table.index).is_none() {
        return Err(ReportError::Template(format!(
            "introduction has no table {}",
            report.supplemental_table.index
        )));
    }
    doc.apply_block(&report.supplemental_label, ordered.has_supplemental())
}

/// A stand-alone recommendation document (numbered title plus key/value
/// summary table), in the layout the loader reads.
pub fn recommendation_document(numbered: &NumberedRecommendation, report: &ReportConfig) -> Document {
    let r = &numbered.record;
    let mut rows: Vec<[String; 2]> = Vec::new();
    if let Some(arc) = &r.arc {
        rows.push(["ARC Number".to_string(), arc.to_string()]);
    }
    if let Some(kwh) = r.savings.electricity_kwh {
        rows.push(["Annual Electricity Savings".to_string(), format!("{} kWh", format_truncated(kwh))]);
    }
    if let Some(kw) = r.savings.demand_kw {
        rows.push(["Annual Demand Savings".to_string(), format!("{} kW", format_truncated(kw))]);
    }
    if let Some(mmbtu) = r.savings.natural_gas_mmbtu {
        rows.push(["Annual Natural Gas Savings".to_string(), format!("{} MMBtu", format_truncated(mmbtu))]);
    }
    if let Some(other) = &r.savings.other_energy {
        rows.push([
            format!("Annual {} Savings", other.label),
            format!("{} MMBtu", format_truncated(other.mmbtu)),
        ]);
    }
    if let Some(resource) = &r.savings.other_resource {
        rows.push([format!("Annual {} Savings", resource.label), resource.amount.clone()]);
    }
    rows.push(["Annual Cost Savings".to_string(), format_currency(r.annual_cost_savings, 0)]);
    rows.push(["Implementation Cost".to_string(), format_currency(r.implementation_cost, 0)]);
    rows.push([
        "Payback Period".to_string(),
        format_payback(r.annual_cost_savings, r.implementation_cost),
    ]);

    let mut doc = Document::default();
    doc.push_paragraph(Paragraph::styled(
        canonical_title(numbered, report),
        report.heading_style.clone(),
    ));
    doc.push_table(Table::from_rows(rows));
    doc
}

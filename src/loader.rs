// Reads recommendation documents back into typed records.
//
// Recommendation documents are written by people, so the title separator and
// the summary-table labels vary. Titles are split on the first separator
// found, and table rows are classified by keyword in `classify_row`; all the
// guessing about row labels lives in that one function.
use crate::arc::ArcCode;
use crate::document::Document;
use crate::error::{ReportError, Result};
use crate::types::{
    Classification, EnergySavings, OtherEnergy, OtherResource, RecommendationRecord,
};
use crate::util::{parse_currency, parse_leading_number, title_case};
use tracing::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Title separators: colon, hyphen, en dash, em dash. The title is split at
/// whichever occurs first.
pub const TITLE_SEPARATORS: [&str; 4] = [":", "-", "\u{2013}", "\u{2014}"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub documents: usize,
    pub primary: usize,
    pub supplemental: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTitle {
    pub classification: Classification,
    pub description: String,
}

/// What a summary-table row holds, judged from its label (and, for unnamed
/// energy, its unit).
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    ArcNumber,
    AnnualCostSavings,
    ImplementationCost,
    PaybackPeriod,
    Electricity,
    Demand,
    NaturalGas,
    OtherEnergy { label: String },
    OtherResource { label: String },
    Unrecognized,
}

pub fn parse_title(title: &str) -> Result<ParsedTitle> {
    let (at, sep) = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep).map(|i| (i, *sep)))
        .min_by_key(|(i, _)| *i)
        .ok_or_else(|| ReportError::Parse(format!("can't parse document title: {title:?}")))?;
    let (head, tail) = (&title[..at], &title[at + sep.len()..]);

    let description = title_case(tail.trim());
    if description.is_empty() {
        return Err(ReportError::Parse(format!(
            "document title has no description: {title:?}"
        )));
    }
    Ok(ParsedTitle {
        classification: classify_title_prefix(head),
        description,
    })
}

fn classify_title_prefix(head: &str) -> Classification {
    let lower = head.to_lowercase();
    if head.contains("AAR") || lower.contains("additional") || lower.contains("supplemental") {
        Classification::Supplemental
    } else {
        Classification::Primary
    }
}

/// Classify one key/value row of the summary table.
pub fn classify_row(key: &str, value: &str) -> RowKind {
    let k = key.trim().to_lowercase();
    if k.is_empty() {
        return RowKind::Unrecognized;
    }
    if k.contains("arc") && k.contains("number") {
        RowKind::ArcNumber
    } else if k.contains("annual") && k.contains("cost") {
        RowKind::AnnualCostSavings
    } else if k.contains("implementation") {
        RowKind::ImplementationCost
    } else if k.contains("payback") {
        RowKind::PaybackPeriod
    } else if k.contains("electricity") {
        RowKind::Electricity
    } else if k.contains("demand") {
        RowKind::Demand
    } else if k.contains("natural") {
        RowKind::NaturalGas
    } else {
        let label = display_label(key);
        if label.is_empty() {
            RowKind::Unrecognized
        } else if value.to_lowercase().contains("mmbtu") {
            RowKind::OtherEnergy { label }
        } else {
            RowKind::OtherResource { label }
        }
    }
}

/// `Annual Propane Savings` -> `Propane`.
fn display_label(key: &str) -> String {
    let mut words: Vec<&str> = key.split_whitespace().collect();
    if words
        .first()
        .is_some_and(|w| w.eq_ignore_ascii_case("annual"))
    {
        words.remove(0);
    }
    if words
        .last()
        .is_some_and(|w| w.to_lowercase().starts_with("saving"))
    {
        words.pop();
    }
    title_case(&words.join(" "))
}

fn required(value: Option<f64>, file_name: &str, what: &str) -> Result<f64> {
    let v = value.ok_or_else(|| ReportError::Parse(format!("{file_name}: missing {what}")))?;
    if v < 0.0 {
        return Err(ReportError::Parse(format!(
            "{file_name}: {what} must not be negative, got {v}"
        )));
    }
    Ok(v)
}

fn number(value: &str, file_name: &str, key: &str) -> Result<f64> {
    parse_leading_number(value).ok_or_else(|| {
        ReportError::Parse(format!("{file_name}: {key:?} is not a number: {value:?}"))
    })
}

fn currency(value: &str, file_name: &str, key: &str) -> Result<f64> {
    parse_currency(value).ok_or_else(|| {
        ReportError::Parse(format!("{file_name}: {key:?} is not a dollar amount: {value:?}"))
    })
}

fn set_once<T>(slot: &mut Option<T>, value: T, file_name: &str, key: &str) {
    if slot.replace(value).is_some() {
        warn!(file = file_name, row = key, "row repeated, keeping the last value");
    }
}

/// Build a record from the title paragraph and the first table of `doc`.
pub fn parse_recommendation(doc: &Document, file_name: &str) -> Result<RecommendationRecord> {
    let title = doc
        .paragraphs()
        .next()
        .map(|p| p.text.as_str())
        .ok_or_else(|| ReportError::Parse(format!("{file_name}: document has no title")))?;
    let ParsedTitle {
        classification,
        description,
    } = parse_title(title)?;

    let table = doc.tables().next().ok_or_else(|| ReportError::InvalidDocument {
        path: PathBuf::from(file_name),
        reason: "the summary table is missing".to_string(),
    })?;

    let mut arc = None;
    let mut annual = None;
    let mut implementation = None;
    let mut savings = EnergySavings::default();

    for row in &table.rows {
        let (Some(key), Some(value)) = (row.first(), row.get(1)) else {
            continue;
        };
        let (key, value) = (key.text.as_str(), value.text.trim());
        let kind = classify_row(key, value);
        debug!(file = file_name, row = key, ?kind, "classified summary row");
        match kind {
            RowKind::ArcNumber => arc = Some(ArcCode::parse(value)?),
            RowKind::AnnualCostSavings => {
                set_once(&mut annual, currency(value, file_name, key)?, file_name, key)
            }
            RowKind::ImplementationCost => set_once(
                &mut implementation,
                currency(value, file_name, key)?,
                file_name,
                key,
            ),
            // Recomputed from savings and cost.
            RowKind::PaybackPeriod => {}
            RowKind::Electricity => set_once(
                &mut savings.electricity_kwh,
                number(value, file_name, key)?,
                file_name,
                key,
            ),
            RowKind::Demand => set_once(
                &mut savings.demand_kw,
                number(value, file_name, key)?,
                file_name,
                key,
            ),
            RowKind::NaturalGas => set_once(
                &mut savings.natural_gas_mmbtu,
                number(value, file_name, key)?,
                file_name,
                key,
            ),
            RowKind::OtherEnergy { label } => {
                let mmbtu = number(value, file_name, key)?;
                set_once(
                    &mut savings.other_energy,
                    OtherEnergy { label, mmbtu },
                    file_name,
                    key,
                )
            }
            RowKind::OtherResource { label } => set_once(
                &mut savings.other_resource,
                OtherResource {
                    label,
                    amount: value.to_string(),
                },
                file_name,
                key,
            ),
            RowKind::Unrecognized => {}
        }
    }

    Ok(RecommendationRecord {
        file_name: file_name.to_string(),
        classification,
        description,
        arc,
        savings,
        annual_cost_savings: required(annual, file_name, "annual cost savings")?,
        implementation_cost: required(implementation, file_name, "implementation cost")?,
    })
}

/// Every `*.json` document in `dir`, in file-name order.
pub fn recommendation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ReportError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReportError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every recommendation in `dir`. The first malformed document aborts
/// the whole load.
pub fn load_recommendations(dir: &Path) -> Result<(Vec<RecommendationRecord>, LoadReport)> {
    let mut records = Vec::new();
    for path in recommendation_files(dir)? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let doc = Document::open(&path)?;
        let record = parse_recommendation(&doc, &file_name)?;
        info!(
            file = %file_name,
            supplemental = record.is_supplemental(),
            description = %record.description,
            "read recommendation"
        );
        records.push(record);
    }

    let supplemental = records.iter().filter(|r| r.is_supplemental()).count();
    let report = LoadReport {
        documents: records.len(),
        primary: records.len() - supplemental,
        supplemental,
    };
    Ok((records, report))
}

// Renumbering and re-styling of recommendation documents.
//
// Each document gets its canonical numbered title and the report's heading
// and subtitle styles, and is saved as a new file under the sorted folder;
// the source document is left untouched.
use crate::config::{DescriptionCase, ReportConfig};
use crate::document::{Document, StyleKind};
use crate::error::{ReportError, Result};
use crate::reports::OrderedRecommendations;
use crate::types::{Classification, NumberedRecommendation};
use crate::util::title_case;
use tracing::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Restyled copies, in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedDocuments {
    pub primary: Vec<PathBuf>,
    pub supplemental: Vec<PathBuf>,
}

/// `Recommendation 3: REPAIR LEAKS IN COMPRESSED AIR LINES`
pub fn canonical_title(
    numbered: &NumberedRecommendation,
    report: &ReportConfig,
) -> String {
    let word = match numbered.record.classification {
        Classification::Primary => &report.primary_title,
        Classification::Supplemental => &report.supplemental_title,
    };
    let description = match report.description_case {
        DescriptionCase::Upper => numbered.record.description.to_uppercase(),
        DescriptionCase::Title => title_case(&numbered.record.description),
    };
    format!("{} {}: {}", word, numbered.number, description)
}

fn is_subtitle(text: &str, subtitles: &[String]) -> bool {
    subtitles.iter().any(|s| {
        // singular forms ("Implementation Cost") count as well
        let singular = s.strip_suffix('s').unwrap_or(s);
        text == s || text == singular
    })
}

/// Retitle `doc` and enforce the heading and subtitle styles, defining
/// either style first when the document lacks it.
pub fn restyle(doc: &mut Document, title: &str, report: &ReportConfig) -> Result<()> {
    let heading = report.heading_style.as_str();
    let subtitle = report.subtitle_style.as_str();

    let mut needs_subtitle = false;
    {
        let mut paragraphs = doc.paragraphs_mut();
        let first = paragraphs
            .next()
            .ok_or_else(|| ReportError::Parse("document has no title paragraph".to_string()))?;
        first.set_text(title);
        first.style = Some(heading.to_string());

        for p in paragraphs {
            if is_subtitle(&p.text, &report.subtitles) {
                p.style = Some(subtitle.to_string());
                needs_subtitle = true;
            }
        }
    }

    doc.ensure_style(heading, StyleKind::Paragraph);
    if needs_subtitle {
        doc.ensure_style(subtitle, StyleKind::Paragraph);
    }
    Ok(())
}

/// File name of a restyled copy, e.g. `AR3.json` or `AAR1.json`.
pub fn sorted_file_name(numbered: &NumberedRecommendation, report: &ReportConfig) -> String {
    let label = match numbered.record.classification {
        Classification::Primary => &report.primary_label,
        Classification::Supplemental => &report.supplemental_label,
    };
    format!("{}{}.json", label, numbered.number)
}

fn write_one(
    numbered: &NumberedRecommendation,
    report: &ReportConfig,
    source_dir: &Path,
    sorted_dir: &Path,
) -> Result<PathBuf> {
    let source = source_dir.join(&numbered.record.file_name);
    let mut doc = Document::open(&source)?;
    let title = canonical_title(numbered, report);
    restyle(&mut doc, &title, report)?;
    let target = sorted_dir.join(sorted_file_name(numbered, report));
    doc.save(&target)?;
    debug!(source = %source.display(), target = %target.display(), %title, "restyled");
    Ok(target)
}

/// Write a restyled copy of every recommendation into `sorted_dir`.
pub fn write_sorted(
    ordered: &OrderedRecommendations,
    report: &ReportConfig,
    source_dir: &Path,
    sorted_dir: &Path,
) -> Result<SortedDocuments> {
    fs::create_dir_all(sorted_dir).map_err(|e| ReportError::io(sorted_dir, e))?;
    let write_all = |set: &[NumberedRecommendation]| -> Result<Vec<PathBuf>> {
        set.iter()
            .map(|n| write_one(n, report, source_dir, sorted_dir))
            .collect()
    };
    Ok(SortedDocuments {
        primary: write_all(&ordered.primary)?,
        supplemental: write_all(&ordered.supplemental)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, Table};
    use crate::reports::order_recommendations;
    use crate::types::{EnergySavings, RecommendationRecord};
    use tempfile::TempDir;

    fn numbered(classification: Classification, number: usize) -> NumberedRecommendation {
        NumberedRecommendation {
            number,
            record: RecommendationRecord {
                file_name: "leaks.json".to_string(),
                classification,
                description: "Repair Leaks in Compressed Air Lines".to_string(),
                arc: None,
                savings: EnergySavings::default(),
                annual_cost_savings: 100.0,
                implementation_cost: 50.0,
            },
        }
    }

    fn source_document() -> Document {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::new("AR: repair leaks in compressed air lines"));
        doc.push_paragraph(Paragraph::new("Recommended Actions"));
        doc.push_paragraph(Paragraph::new("Implementation Cost"));
        doc.push_paragraph(Paragraph::new("Anticipated Savings are large"));
        doc.push_table(Table::from_rows([
            ["Annual Cost Savings", "$100"],
            ["Implementation Cost", "$50"],
        ]));
        doc
    }

    #[test]
    fn titles_follow_the_configured_case() {
        let mut report = ReportConfig::default();
        assert_eq!(
            canonical_title(&numbered(Classification::Primary, 3), &report),
            "Recommendation 3: REPAIR LEAKS IN COMPRESSED AIR LINES"
        );
        report.description_case = DescriptionCase::Title;
        assert_eq!(
            canonical_title(&numbered(Classification::Supplemental, 1), &report),
            "Additional Recommendation 1: Repair Leaks in Compressed Air Lines"
        );
    }

    #[test]
    fn restyle_defines_missing_styles() {
        let report = ReportConfig::default();
        let mut doc = source_document();
        restyle(&mut doc, "Recommendation 1: X", &report).unwrap();

        let styles: Vec<_> = doc.paragraphs().map(|p| p.style.as_deref()).collect();
        assert_eq!(
            styles,
            vec![Some("Heading 1"), Some("Subtitle1"), Some("Subtitle1"), None]
        );
        assert_eq!(doc.paragraphs().next().unwrap().text, "Recommendation 1: X");
        assert!(doc.has_style("Heading 1"));
        assert!(doc.has_style("Subtitle1"));
    }

    #[test]
    fn existing_styles_are_not_duplicated() {
        let report = ReportConfig::default();
        let mut doc = source_document();
        doc.ensure_style("Heading 1", StyleKind::Paragraph);
        restyle(&mut doc, "Recommendation 1: X", &report).unwrap();
        assert_eq!(doc.styles.iter().filter(|s| s.name == "Heading 1").count(), 1);
    }

    #[test]
    fn writes_numbered_copies_and_keeps_sources() {
        let dir = TempDir::new().unwrap();
        let source_dir = dir.path().join("ARs");
        let sorted_dir = source_dir.join("Sorted");
        fs::create_dir_all(&source_dir).unwrap();
        let original = source_document();
        original.save(&source_dir.join("leaks.json")).unwrap();

        let record = crate::loader::parse_recommendation(&original, "leaks.json").unwrap();
        let ordered = order_recommendations(vec![record]);
        let sorted = write_sorted(&ordered, &ReportConfig::default(), &source_dir, &sorted_dir)
            .unwrap();

        assert_eq!(sorted.primary, vec![sorted_dir.join("AR1.json")]);
        assert!(sorted.supplemental.is_empty());
        let copy = Document::open(&sorted.primary[0]).unwrap();
        assert_eq!(
            copy.paragraphs().next().unwrap().text,
            "Recommendation 1: REPAIR LEAKS IN COMPRESSED AIR LINES"
        );
        assert_eq!(Document::open(&source_dir.join("leaks.json")).unwrap(), original);
    }
}

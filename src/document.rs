// Word-processor documents as the compiler sees them.
//
// A document is an ordered body of paragraphs, tables and breaks, a style
// sheet, and the page setup of its last section. Documents are stored as
// pretty-printed JSON so that generated recommendations, templates and the
// final report can be diffed and inspected.
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub path: PathBuf,
    pub width_in: f32,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paragraph {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before_pt: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after_pt: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<InlineImage>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Replace the text, keeping formatting.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// A table is a grid of cells; each cell holds one (possibly multi-line)
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub rows: Vec<Vec<Paragraph>>,
}

impl Table {
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            style: None,
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| Paragraph::new(c)).collect())
                .collect(),
        }
    }

    pub fn cell_text(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|p| p.text.as_str())
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut Vec<Paragraph>> {
        self.rows.get_mut(row)
    }

    pub fn remove_row(&mut self, row: usize) -> Option<Vec<Paragraph>> {
        if row < self.rows.len() {
            Some(self.rows.remove(row))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page setup of a section, sizes in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub orientation: Orientation,
    pub page_width: u32,
    pub page_height: u32,
}

impl Default for Section {
    fn default() -> Self {
        // US Letter, portrait
        Self {
            orientation: Orientation::Portrait,
            page_width: 12240,
            page_height: 15840,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    PageBreak,
    /// Ends a section; carries that section's page setup.
    SectionBreak(Section),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
    Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    pub name: String,
    #[serde(default)]
    pub kind: StyleKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub styles: Vec<StyleDef>,
    #[serde(default)]
    pub body: Vec<Block>,
    /// Page setup of the last section.
    #[serde(default)]
    pub section: Section,
}

impl Document {
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| ReportError::io(path, e))
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    pub fn push_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    pub fn add_page_break(&mut self) {
        self.body.push(Block::PageBreak);
    }

    /// Top-level paragraphs in body order; table cells are not included.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.body.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.tables_mut().nth(index)
    }

    /// Delete the `index`-th table from the body.
    pub fn remove_table(&mut self, index: usize) -> Option<Table> {
        let pos = self
            .body
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Table(_)))
            .nth(index)
            .map(|(pos, _)| pos)?;
        match self.body.remove(pos) {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn has_style(&self, name: &str) -> bool {
        self.styles.iter().any(|s| s.name == name)
    }

    /// Define `name` with default properties unless the style sheet already
    /// has it.
    pub fn ensure_style(&mut self, name: &str, kind: StyleKind) {
        if !self.has_style(name) {
            self.styles.push(StyleDef {
                name: name.to_string(),
                kind,
            });
        }
    }

    /// Every paragraph, including the ones inside table cells.
    fn for_each_paragraph_mut(&mut self, mut f: impl FnMut(&mut Paragraph)) {
        for block in &mut self.body {
            match block {
                Block::Paragraph(p) => f(p),
                Block::Table(t) => t.rows.iter_mut().flatten().for_each(&mut f),
                Block::PageBreak | Block::SectionBreak(_) => {}
            }
        }
    }

    /// Fill `${KEY}` placeholders. Returns the number of replacements made.
    pub fn replace_placeholders(&mut self, values: &BTreeMap<String, String>) -> usize {
        let mut replaced = 0usize;
        self.for_each_paragraph_mut(|p| {
            if !p.text.contains("${") {
                return;
            }
            for (key, value) in values {
                let token = format!("${{{}}}", key);
                let hits = p.text.matches(&token).count();
                if hits > 0 {
                    p.text = p.text.replace(&token, value);
                    replaced += hits;
                }
            }
            if p.text.contains("${") {
                warn!(text = %p.text, "unfilled placeholder left in document");
            }
        });
        replaced
    }

    /// Resolve a conditional block delimited by `<name>` and `</name>`
    /// marker paragraphs. When `keep` is true only the markers go; otherwise
    /// everything from the opening to the closing marker is removed.
    pub fn apply_block(&mut self, name: &str, keep: bool) -> Result<()> {
        let open = format!("<{}>", name);
        let close = format!("</{}>", name);
        let contains = |b: &Block, tag: &str| matches!(b, Block::Paragraph(p) if p.text.contains(tag));

        while let Some(start) = self.body.iter().position(|b| contains(b, &open)) {
            let end = self.body[start..]
                .iter()
                .position(|b| contains(b, &close))
                .map(|offset| start + offset)
                .ok_or_else(|| {
                    ReportError::Template(format!("block {open} has no closing {close}"))
                })?;

            if !keep {
                self.body.drain(start..=end);
                continue;
            }
            let markers = if start == end { vec![start] } else { vec![end, start] };
            for pos in markers {
                if let Block::Paragraph(p) = &mut self.body[pos] {
                    p.text = p.text.replace(&open, "").replace(&close, "");
                    if p.text.trim().is_empty() && p.images.is_empty() {
                        self.body.remove(pos);
                    }
                }
            }
        }
        Ok(())
    }

    /// Replace `tag` in the first paragraph that contains it with an inline
    /// image.
    pub fn add_image(&mut self, tag: &str, image: &Path, width_in: f32) -> Result<()> {
        if !image.is_file() {
            return Err(ReportError::Template(format!(
                "image file not found: {}",
                image.display()
            )));
        }
        let paragraph = self
            .paragraphs_mut()
            .find(|p| p.text.contains(tag))
            .ok_or_else(|| ReportError::Template(format!("tag {tag} not found")))?;
        paragraph.text = paragraph.text.replace(tag, "");
        paragraph.images.push(InlineImage {
            path: image.to_path_buf(),
            width_in,
        });
        Ok(())
    }

    /// Append `other` as a new section, merging its styles.
    pub fn append(&mut self, other: Document) {
        self.body.push(Block::SectionBreak(self.section));
        for style in other.styles {
            if !self.has_style(&style.name) {
                self.styles.push(style);
            }
        }
        self.body.extend(other.body);
        self.section = other.section;
    }

    /// Turn the last section to landscape, swapping the page dimensions.
    pub fn set_landscape(&mut self) {
        if self.section.orientation == Orientation::Landscape {
            return;
        }
        let s = &mut self.section;
        std::mem::swap(&mut s.page_width, &mut s.page_height);
        s.orientation = Orientation::Landscape;
    }

    /// Markdown preview: headings from heading styles, tables drawn with
    /// `tabled`.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        for block in &self.body {
            match block {
                Block::Paragraph(p) => {
                    let prefix = match p.style.as_deref() {
                        Some(s) if s.starts_with("Heading") => "# ",
                        Some(s) if s.starts_with("Subtitle") => "## ",
                        _ => "",
                    };
                    if !p.text.is_empty() {
                        out.push_str(prefix);
                        out.push_str(&p.text);
                        out.push('\n');
                    }
                    for image in &p.images {
                        out.push_str(&format!("![]({})\n", image.path.display()));
                    }
                    out.push('\n');
                }
                Block::Table(t) => {
                    if t.rows.is_empty() {
                        continue;
                    }
                    let mut builder = Builder::default();
                    for row in &t.rows {
                        builder.push_record(row.iter().map(|c| c.text.replace('\n', "<br>")));
                    }
                    let mut table = builder.build();
                    table.with(Style::markdown());
                    out.push_str(&table.to_string());
                    out.push_str("\n\n");
                }
                Block::PageBreak => out.push_str("---\n\n"),
                Block::SectionBreak(_) => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Document {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::new("Prepared for ${NAME} on ${RDATE}"));
        doc.push_table(Table::from_rows([["Total", "${ARACS}"]]));
        doc.push_paragraph(Paragraph::new("<AAR>"));
        doc.push_paragraph(Paragraph::new("Additional recommendations follow."));
        doc.push_table(Table::from_rows([["AAR 1", "x"]]));
        doc.push_paragraph(Paragraph::new("</AAR>"));
        doc.push_paragraph(Paragraph::new("End"));
        doc
    }

    #[test]
    fn saves_and_opens_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        let doc = sample();
        doc.save(&path).unwrap();
        assert_eq!(Document::open(&path).unwrap(), doc);
    }

    #[test]
    fn fills_placeholders_in_paragraphs_and_cells() {
        let mut doc = sample();
        let values: BTreeMap<String, String> = [
            ("NAME", "Acme Foundry"),
            ("RDATE", "May 1, 2024"),
            ("ARACS", "$3,000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(doc.replace_placeholders(&values), 3);
        assert_eq!(
            doc.paragraphs().next().unwrap().text,
            "Prepared for Acme Foundry on May 1, 2024"
        );
        assert_eq!(doc.tables().next().unwrap().cell_text(0, 1), Some("$3,000"));
    }

    #[test]
    fn removes_a_block_when_not_kept() {
        let mut doc = sample();
        doc.apply_block("AAR", false).unwrap();
        let texts: Vec<_> = doc.paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Prepared for ${NAME} on ${RDATE}", "End"]);
        assert_eq!(doc.tables().count(), 1);
    }

    #[test]
    fn keeps_a_block_without_markers() {
        let mut doc = sample();
        doc.apply_block("AAR", true).unwrap();
        let texts: Vec<_> = doc.paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Prepared for ${NAME} on ${RDATE}",
                "Additional recommendations follow.",
                "End"
            ]
        );
        assert_eq!(doc.tables().count(), 2);
    }

    #[test]
    fn unclosed_block_is_a_template_error() {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::new("<AAR>"));
        assert!(matches!(doc.apply_block("AAR", true), Err(ReportError::Template(_))));
    }

    #[test]
    fn adds_images_at_tags() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("image001.png");
        fs::write(&image, b"png").unwrap();

        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::new("#EUChart"));
        doc.add_image("#EUChart", &image, 6.0).unwrap();
        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.text, "");
        assert_eq!(p.images.len(), 1);

        assert!(doc.add_image("#Missing", &image, 6.0).is_err());
        assert!(doc.add_image("#EUChart", &dir.path().join("nope.png"), 6.0).is_err());
    }

    #[test]
    fn append_merges_styles_and_sections() {
        let mut master = Document::default();
        master.ensure_style("Heading 1", StyleKind::Paragraph);
        master.push_paragraph(Paragraph::new("intro"));

        let mut appendix = Document::default();
        appendix.ensure_style("Heading 1", StyleKind::Paragraph);
        appendix.ensure_style("Subtitle1", StyleKind::Paragraph);
        appendix.push_paragraph(Paragraph::new("charts"));

        master.append(appendix);
        assert_eq!(master.styles.len(), 2);
        assert!(matches!(master.body[1], Block::SectionBreak(_)));
        assert_eq!(master.paragraphs().count(), 2);

        master.set_landscape();
        assert_eq!(master.section.orientation, Orientation::Landscape);
        assert_eq!(master.section.page_width, 15840);
        master.set_landscape();
        assert_eq!(master.section.page_width, 15840);
    }

    #[test]
    fn removes_tables_by_index() {
        let mut doc = sample();
        let removed = doc.remove_table(1).unwrap();
        assert_eq!(removed.cell_text(0, 0), Some("AAR 1"));
        assert!(doc.remove_table(1).is_none());
    }

    #[test]
    fn renders_markdown_preview() {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::styled("Recommendation 1: X", "Heading 1"));
        doc.push_table(Table::from_rows([["Type", "Value"], ["Electricity", "1 kWh"]]));
        let md = doc.render_markdown();
        assert!(md.starts_with("# Recommendation 1: X\n"));
        assert!(md.contains("| Electricity | 1 kWh |"));
    }
}

// Assembly of the final report.
//
// The filled introduction, background and energy documents are written as
// temporary files next to the report, then everything is composed in order:
// introduction, table of contents, primary recommendations, the supplemental
// separator and supplemental recommendations (if any), background and the
// energy appendix. The last section is turned to landscape.
use crate::config::ReportConfig;
use crate::document::Document;
use crate::energy::EnergyCharts;
use crate::error::{ReportError, Result};
use crate::reports::OrderedRecommendations;
use crate::restyle::SortedDocuments;
use crate::summary_table::fill_introduction;
use tracing::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const INTRODUCTION: &str = "Introduction.json";
pub const TABLE_OF_CONTENTS: &str = "ToC.json";
pub const SUPPLEMENTAL_SEPARATOR: &str = "AAR.json";
pub const BACKGROUND: &str = "Background.json";
pub const ENERGY: &str = "Energy.json";

/// Files removed when the guard goes out of scope, whether or not the run
/// got that far.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: PathBuf) -> &Path {
        self.paths.push(path);
        &self.paths[self.paths.len() - 1]
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "temporary file removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove temporary file"),
            }
        }
    }
}

/// Everything the assembly reads besides the templates.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInputs<'a> {
    pub ordered: &'a OrderedRecommendations,
    pub sorted: &'a SortedDocuments,
    pub placeholders: &'a BTreeMap<String, String>,
    pub charts: &'a EnergyCharts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledReport {
    pub document: Document,
    pub path: PathBuf,
}

fn open_template(templates_dir: &Path, name: &str) -> Result<Document> {
    let path = templates_dir.join(name);
    if !path.is_file() {
        return Err(ReportError::Template(format!(
            "template not found: {}",
            path.display()
        )));
    }
    Document::open(&path)
}

fn save_temp(doc: &Document, path: PathBuf, temps: &mut TempFiles) -> Result<PathBuf> {
    // Tracked before writing so a partial file is still removed.
    let path = temps.track(path).to_path_buf();
    doc.save(&path)?;
    Ok(path)
}

/// Documents appended after the introduction, in report order.
pub fn body_documents(
    templates_dir: &Path,
    ordered: &OrderedRecommendations,
    sorted: &SortedDocuments,
) -> Vec<PathBuf> {
    let mut list = vec![templates_dir.join(TABLE_OF_CONTENTS)];
    list.extend(sorted.primary.iter().cloned());
    if ordered.has_supplemental() {
        list.push(templates_dir.join(SUPPLEMENTAL_SEPARATOR));
        list.extend(sorted.supplemental.iter().cloned());
    }
    list
}

/// Fill the templates and compose `{le}.json` in `output_dir`.
pub fn assemble(
    report: &ReportConfig,
    templates_dir: &Path,
    output_dir: &Path,
    le: &str,
    inputs: AssemblyInputs<'_>,
) -> Result<AssembledReport> {
    fs::create_dir_all(output_dir).map_err(|e| ReportError::io(output_dir, e))?;
    let mut temps = TempFiles::new();

    let mut intro = open_template(templates_dir, INTRODUCTION)?;
    fill_introduction(&mut intro, inputs.ordered, report)?;
    intro.replace_placeholders(inputs.placeholders);
    let intro_path = save_temp(&intro, output_dir.join(format!("{le}-intro.json")), &mut temps)?;
    info!("introduction written");

    let mut back = open_template(templates_dir, BACKGROUND)?;
    back.replace_placeholders(inputs.placeholders);
    let back_path = save_temp(&back, output_dir.join(format!("{le}-back.json")), &mut temps)?;
    info!("background written");

    let mut energy = open_template(templates_dir, ENERGY)?;
    inputs.charts.apply(&mut energy)?;
    energy.replace_placeholders(inputs.placeholders);
    let energy_path = save_temp(&energy, output_dir.join(format!("{le}-energy.json")), &mut temps)?;
    info!(layout = ?inputs.charts.layout, "energy appendix written");

    let mut master = Document::open(&intro_path)?;
    master.add_page_break();
    for path in body_documents(templates_dir, inputs.ordered, inputs.sorted) {
        let mut doc = Document::open(&path)?;
        doc.add_page_break();
        debug!(path = %path.display(), "appending");
        master.append(doc);
    }
    master.append(Document::open(&back_path)?);
    master.append(Document::open(&energy_path)?);
    master.set_landscape();

    let path = output_dir.join(format!("{le}.json"));
    master.save(&path)?;
    info!(path = %path.display(), "report assembled");
    Ok(AssembledReport {
        document: master,
        path,
    })
}

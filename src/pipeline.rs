// One complete compiler run, from recommendation documents to report.
use crate::assembly::{assemble, AssemblyInputs};
use crate::config::{Config, PathsConfig};
use crate::energy::EnergyCharts;
use crate::error::{ReportError, Result};
use crate::loader::{load_recommendations, LoadReport};
use crate::output::{write_csv, write_json, write_text};
use crate::plant::placeholder_map;
use crate::reports::{build_portfolio, order_recommendations, summary_rows, OrderedRecommendations};
use crate::restyle::{write_sorted, SortedDocuments};
use crate::types::{PortfolioSummary, SummaryRow};
use chrono::NaiveDate;
use tracing::info;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.json";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.csv";

/// Configured folders resolved against the working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub recommendations_dir: PathBuf,
    pub sorted_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub charts_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Workspace {
    pub fn resolve(workdir: &Path, paths: &PathsConfig) -> Self {
        Self {
            recommendations_dir: workdir.join(&paths.recommendations_dir),
            sorted_dir: workdir.join(&paths.sorted_dir),
            templates_dir: workdir.join(&paths.templates_dir),
            charts_dir: workdir.join(&paths.charts_dir),
            output_dir: workdir.join(&paths.output_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutcome {
    pub load: LoadReport,
    pub ordered: OrderedRecommendations,
    pub portfolio: PortfolioSummary,
    pub rows: Vec<SummaryRow>,
    pub sorted: SortedDocuments,
    pub report_path: PathBuf,
    pub markdown_path: PathBuf,
    pub summary_path: PathBuf,
    pub csv_path: PathBuf,
}

/// Run every stage in order. The first failure aborts the run.
pub fn compile(config: &Config, workdir: &Path, today: NaiveDate) -> Result<CompileOutcome> {
    let ws = Workspace::resolve(workdir, &config.compiler.paths);
    let report = &config.compiler.report;
    let le = config.compiler.site.le.trim();

    // Checked first so a missing export stops the run before anything is written.
    let charts = EnergyCharts::locate(&ws.charts_dir)?;
    info!(dir = %charts.image_dir.display(), layout = ?charts.layout, "energy charts found");

    let (records, load) = load_recommendations(&ws.recommendations_dir)?;
    if records.is_empty() {
        return Err(ReportError::Parse(format!(
            "no recommendation documents in {}",
            ws.recommendations_dir.display()
        )));
    }
    info!(
        documents = load.documents,
        primary = load.primary,
        supplemental = load.supplemental,
        "recommendations read"
    );

    let ordered = order_recommendations(records);
    let portfolio = build_portfolio(&ordered, config.utility.fuel_type);
    info!(
        combined_mmbtu = portfolio.primary.combined_mmbtu,
        annual_cost_savings = portfolio.primary.annual_cost_savings,
        implementation_cost = portfolio.primary.implementation_cost,
        payback = %portfolio.primary.payback,
        "portfolio analyzed"
    );

    let sorted = write_sorted(&ordered, report, &ws.recommendations_dir, &ws.sorted_dir)?;
    info!(dir = %ws.sorted_dir.display(), "recommendations restyled");

    let placeholders = placeholder_map(config, &portfolio, today)?;
    let assembled = assemble(
        report,
        &ws.templates_dir,
        &ws.output_dir,
        le,
        AssemblyInputs {
            ordered: &ordered,
            sorted: &sorted,
            placeholders: &placeholders,
            charts: &charts,
        },
    )?;

    let markdown_path = ws.output_dir.join(format!("{le}.md"));
    write_text(&markdown_path, &assembled.document.render_markdown())?;

    let mut rows = summary_rows(&ordered.primary, &report.primary_label);
    rows.extend(summary_rows(&ordered.supplemental, &report.supplemental_label));
    let summary_path = ws.output_dir.join(SUMMARY_FILE);
    write_json(&summary_path, &portfolio)?;
    let csv_path = ws.output_dir.join(RECOMMENDATIONS_FILE);
    write_csv(&csv_path, &rows)?;

    Ok(CompileOutcome {
        load,
        ordered,
        portfolio,
        rows,
        sorted,
        report_path: assembled.path,
        markdown_path,
        summary_path,
        csv_path,
    })
}

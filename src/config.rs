// TOML configuration for a report run.
//
// Two files are read, as the assessment team keeps them apart: the compiler
// settings (site, report conventions, folders) and the utility figures
// taken from the bill analysis. Both are immutable once loaded and passed by
// reference to every stage.
use crate::error::{ReportError, Result};
use crate::types::FuelType;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Date format used for the visit and report dates, e.g. `March 3, 2024`.
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub compiler: CompilerConfig,
    pub utility: UtilityConfig,
}

impl Config {
    /// Read and validate both files.
    pub fn load(compiler_path: &Path, utility_path: &Path) -> Result<Self> {
        let compiler = CompilerConfig::from_toml_file(compiler_path)?;
        let utility = UtilityConfig::from_toml_file(utility_path)?;
        let config = Self { compiler, utility };
        match config.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(config),
        }
    }

    /// Every violated constraint, in field order.
    pub fn validate(&self) -> Vec<ReportError> {
        let mut errors = self.compiler.validate();
        errors.extend(self.utility.validate());
        errors
    }
}

/// Compiler settings (`Compiler.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// The assessed plant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Short site identifier; also names the final report file.
    pub le: String,
    /// Assessment visit date, `March 3, 2024` style.
    pub visit_date: String,
    /// Plant personnel who took part in the visit.
    pub participants: Vec<String>,
    /// Assessment team members who contributed to the report.
    pub contributors: Vec<String>,
    /// Free-form `${KEY}` values for the front and back matter.
    pub fields: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            le: "LE0000".to_string(),
            visit_date: "January 1, 2024".to_string(),
            participants: Vec::new(),
            contributors: Vec::new(),
            fields: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    pub fn visit_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(self.visit_date.trim(), DATE_FORMAT).map_err(|e| {
            ReportError::config(
                "site.visit_date",
                format!("{:?} is not a `Month D, YYYY` date: {e}", self.visit_date),
            )
        })
    }
}

/// How recommendation titles are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionCase {
    #[default]
    Upper,
    Title,
}

/// Where a numbered summary table sits in the introduction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSlot {
    /// Position among the template's tables, counting from zero.
    pub index: usize,
    /// Blank rows pre-allocated under the header row.
    pub capacity: usize,
}

/// Report conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub description_case: DescriptionCase,
    /// Word used in titles of primary recommendations.
    pub primary_title: String,
    /// Word used in titles of supplemental recommendations.
    pub supplemental_title: String,
    /// Short label used in the summary table and sorted file names.
    pub primary_label: String,
    pub supplemental_label: String,
    pub heading_style: String,
    pub subtitle_style: String,
    /// Section headers that receive the subtitle style.
    pub subtitles: Vec<String>,
    pub primary_table: TableSlot,
    pub supplemental_table: TableSlot,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            description_case: DescriptionCase::Upper,
            primary_title: "Recommendation".to_string(),
            supplemental_title: "Additional Recommendation".to_string(),
            primary_label: "AR".to_string(),
            supplemental_label: "AAR".to_string(),
            heading_style: "Heading 1".to_string(),
            subtitle_style: "Subtitle1".to_string(),
            subtitles: [
                "Recommended Actions",
                "Summary of Estimated Savings and Implementation Costs",
                "Current Practice and Observations",
                "Anticipated Savings",
                "Implementation Costs",
                "Implementation Cost References",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            primary_table: TableSlot {
                index: 2,
                capacity: 15,
            },
            supplemental_table: TableSlot {
                index: 3,
                capacity: 5,
            },
        }
    }
}

/// Folders, relative to the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub recommendations_dir: PathBuf,
    pub sorted_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub charts_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            recommendations_dir: PathBuf::from("ARs"),
            sorted_dir: PathBuf::from("ARs").join("Sorted"),
            templates_dir: PathBuf::from("Report"),
            charts_dir: PathBuf::from("Energy Charts"),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Site-wide utility figures (`Utility.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UtilityConfig {
    /// Electricity usage rate, $/kWh.
    pub electricity_rate: f64,
    /// Demand rate, $/kW per month.
    pub demand_rate: f64,
    /// Fuel rate, $ per fuel unit.
    pub fuel_rate: f64,
    pub fuel_type: FuelType,
    pub fuel_unit: String,
    /// First and last billing month covered by the analysis.
    pub start_month: String,
    pub end_month: String,
    pub total_electricity_kwh: f64,
    pub total_electricity_mmbtu: f64,
    pub total_demand_kw: f64,
    pub total_fuel_mmbtu: f64,
    pub total_electricity_cost: f64,
    pub total_fuel_cost: f64,
    pub total_mmbtu: f64,
    pub total_cost: f64,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            electricity_rate: 0.0,
            demand_rate: 0.0,
            fuel_rate: 0.0,
            fuel_type: FuelType::NaturalGas,
            fuel_unit: "MMBtu".to_string(),
            start_month: String::new(),
            end_month: String::new(),
            total_electricity_kwh: 0.0,
            total_electricity_mmbtu: 0.0,
            total_demand_kw: 0.0,
            total_fuel_mmbtu: 0.0,
            total_electricity_cost: 0.0,
            total_fuel_cost: 0.0,
            total_mmbtu: 0.0,
            total_cost: 0.0,
        }
    }
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    Ok(toml::from_str(&text)?)
}

impl CompilerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Vec<ReportError> {
        let mut errors = Vec::new();

        let le = self.site.le.trim();
        if le.is_empty() {
            errors.push(ReportError::config("site.le", "must not be empty"));
        } else if le.contains(['/', '\\']) {
            errors.push(ReportError::config(
                "site.le",
                "must not contain path separators",
            ));
        }
        if let Err(err) = self.site.visit_date() {
            errors.push(err);
        }
        for (field, names) in [
            ("site.participants", &self.site.participants),
            ("site.contributors", &self.site.contributors),
        ] {
            if names.iter().any(|n| n.trim().is_empty()) {
                errors.push(ReportError::config(field, "names must not be blank"));
            }
        }

        let r = &self.report;
        for (field, value) in [
            ("report.primary_title", &r.primary_title),
            ("report.supplemental_title", &r.supplemental_title),
            ("report.primary_label", &r.primary_label),
            ("report.supplemental_label", &r.supplemental_label),
            ("report.heading_style", &r.heading_style),
            ("report.subtitle_style", &r.subtitle_style),
        ] {
            if value.trim().is_empty() {
                errors.push(ReportError::config(field, "must not be empty"));
            }
        }
        if r.primary_label == r.supplemental_label {
            errors.push(ReportError::config(
                "report.supplemental_label",
                "must differ from report.primary_label",
            ));
        }
        if r.primary_table.capacity == 0 {
            errors.push(ReportError::config(
                "report.primary_table.capacity",
                "must be > 0",
            ));
        }
        if r.supplemental_table.capacity == 0 {
            errors.push(ReportError::config(
                "report.supplemental_table.capacity",
                "must be > 0",
            ));
        }
        if r.primary_table.index == r.supplemental_table.index {
            errors.push(ReportError::config(
                "report.supplemental_table.index",
                "must differ from report.primary_table.index",
            ));
        }

        errors
    }
}

impl UtilityConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Vec<ReportError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("utility.electricity_rate", self.electricity_rate),
            ("utility.demand_rate", self.demand_rate),
            ("utility.fuel_rate", self.fuel_rate),
            ("utility.total_electricity_kwh", self.total_electricity_kwh),
            ("utility.total_electricity_mmbtu", self.total_electricity_mmbtu),
            ("utility.total_demand_kw", self.total_demand_kw),
            ("utility.total_fuel_mmbtu", self.total_fuel_mmbtu),
            ("utility.total_electricity_cost", self.total_electricity_cost),
            ("utility.total_fuel_cost", self.total_fuel_cost),
            ("utility.total_mmbtu", self.total_mmbtu),
            ("utility.total_cost", self.total_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ReportError::config(field, "must be a number >= 0"));
            }
        }
        errors
    }
}

use crate::arc::{ApplicationArea, ArcCode};
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use std::fmt;

/// Heat content of one kWh, in MMBtu.
pub const MMBTU_PER_KWH: f64 = 0.003413;
/// Generation efficiency used to express site electricity as source energy.
pub const GRID_EFFICIENCY: f64 = 0.33;
/// kg CO2 emitted per kWh of grid electricity.
pub const ELECTRICITY_CO2_KG_PER_KWH: f64 = 0.315;

pub fn kwh_to_mmbtu(kwh: f64) -> f64 {
    kwh * MMBTU_PER_KWH / GRID_EFFICIENCY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    Primary,
    Supplemental,
}

/// Savings of a fuel other than natural gas, already expressed in MMBtu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherEnergy {
    pub label: String,
    pub mmbtu: f64,
}

/// Savings of a non-energy resource (water, waste, ...). The amount is kept
/// as the text the document carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherResource {
    pub label: String,
    pub amount: String,
}

/// Energy savings reported by one recommendation. A field is `None` when the
/// document does not report it, which is not the same as reporting zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergySavings {
    pub electricity_kwh: Option<f64>,
    pub demand_kw: Option<f64>,
    pub natural_gas_mmbtu: Option<f64>,
    pub other_energy: Option<OtherEnergy>,
    pub other_resource: Option<OtherResource>,
}

impl EnergySavings {
    pub fn electricity_mmbtu(&self) -> Option<f64> {
        self.electricity_kwh.map(kwh_to_mmbtu)
    }

    pub fn other_energy_mmbtu(&self) -> Option<f64> {
        self.other_energy.as_ref().map(|e| e.mmbtu)
    }
}

/// One recommendation read back from its document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub file_name: String,
    pub classification: Classification,
    pub description: String,
    pub arc: Option<ArcCode>,
    pub savings: EnergySavings,
    pub annual_cost_savings: f64,
    pub implementation_cost: f64,
}

impl RecommendationRecord {
    /// Simple payback in years. Zero when nothing is spent, infinite when
    /// nothing is saved.
    pub fn payback(&self) -> f64 {
        if self.implementation_cost == 0.0 {
            0.0
        } else if self.annual_cost_savings == 0.0 {
            f64::INFINITY
        } else {
            self.implementation_cost / self.annual_cost_savings
        }
    }

    pub fn is_supplemental(&self) -> bool {
        self.classification == Classification::Supplemental
    }
}

/// A record at its final position in the report, numbered within its own
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberedRecommendation {
    pub number: usize,
    pub record: RecommendationRecord,
}

/// Fuel burned on site, as named on the utility bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "Natural Gas")]
    NaturalGas,
    Propane,
    Butane,
    #[serde(rename = "Fuel Oil #1")]
    FuelOil1,
    #[serde(rename = "Fuel Oil #2")]
    FuelOil2,
    #[serde(rename = "Fuel Oil #4")]
    FuelOil4,
    #[serde(rename = "Fuel Oil #6")]
    FuelOil6,
    Coal,
}

impl FuelType {
    /// kg CO2 per MMBtu burned.
    pub fn emission_factor(self) -> f64 {
        match self {
            FuelType::NaturalGas => 53.0,
            FuelType::Propane => 61.7,
            FuelType::Butane => 64.77,
            FuelType::FuelOil1 => 73.25,
            FuelType::FuelOil2 => 73.51,
            FuelType::FuelOil4 => 75.04,
            FuelType::FuelOil6 => 75.1,
            FuelType::Coal => 95.52,
        }
    }

    /// Natural gas savings are reported in their own row; every other fuel
    /// shows up as "other energy".
    pub fn reported_as_natural_gas(self) -> bool {
        matches!(self, FuelType::NaturalGas)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FuelType::NaturalGas => "Natural Gas",
            FuelType::Propane => "Propane",
            FuelType::Butane => "Butane",
            FuelType::FuelOil1 => "Fuel Oil #1",
            FuelType::FuelOil2 => "Fuel Oil #2",
            FuelType::FuelOil4 => "Fuel Oil #4",
            FuelType::FuelOil6 => "Fuel Oil #6",
            FuelType::Coal => "Coal",
        };
        f.write_str(name)
    }
}

/// Sum of one energy category over a set of recommendations, counting only
/// the recommendations that report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub total: f64,
    pub reporting: usize,
}

impl CategoryTotal {
    pub fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.total += v;
            self.reporting += 1;
        }
    }
}

/// Payback of a whole set of recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BlendedPayback {
    Immediate,
    Years(f64),
}

impl fmt::Display for BlendedPayback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlendedPayback::Immediate => f.write_str(crate::util::IMMEDIATE),
            BlendedPayback::Years(years) => write!(f, "{:.1}", years),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionSummary {
    pub count: usize,
    pub electricity_kwh: CategoryTotal,
    pub electricity_mmbtu: CategoryTotal,
    pub demand_kw: CategoryTotal,
    pub natural_gas_mmbtu: CategoryTotal,
    pub other_energy_mmbtu: CategoryTotal,
    pub combined_mmbtu: f64,
    /// Metric tons of CO2 avoided; only computed for the primary set.
    pub co2_tonnes: Option<f64>,
    pub annual_cost_savings: f64,
    pub implementation_cost: f64,
    pub payback: BlendedPayback,
    /// Plant areas touched by the set, from the ARC numbers, in code order.
    pub application_areas: Vec<ApplicationArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub fuel_type: FuelType,
    pub primary: PartitionSummary,
    pub supplemental: Option<PartitionSummary>,
}

/// One line of the recommendation summary table, fully formatted.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct SummaryRow {
    #[serde(rename = "Recommendation")]
    #[tabled(rename = "Recommendation")]
    pub label: String,
    #[serde(rename = "ARC No.")]
    #[tabled(rename = "ARC No.")]
    pub arc: String,
    #[serde(rename = "Description")]
    #[tabled(rename = "Description")]
    pub description: String,
    #[serde(rename = "SavingsType")]
    #[tabled(rename = "Savings Type")]
    pub savings_type: String,
    #[serde(rename = "SavingsValue")]
    #[tabled(rename = "Savings Value")]
    pub savings_value: String,
    #[serde(rename = "AnnualCostSavings")]
    #[tabled(rename = "Annual Cost Savings")]
    pub annual_cost_savings: String,
    #[serde(rename = "ImplementationCost")]
    #[tabled(rename = "Implementation Cost")]
    pub implementation_cost: String,
    #[serde(rename = "PaybackPeriod")]
    #[tabled(rename = "Payback (yr)")]
    pub payback: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(savings: f64, cost: f64) -> RecommendationRecord {
        RecommendationRecord {
            file_name: "x.json".to_string(),
            classification: Classification::Primary,
            description: "X".to_string(),
            arc: None,
            savings: EnergySavings::default(),
            annual_cost_savings: savings,
            implementation_cost: cost,
        }
    }

    #[test]
    fn payback_edges() {
        assert_eq!(record(1000.0, 0.0).payback(), 0.0);
        assert_eq!(record(0.0, 0.0).payback(), 0.0);
        assert!(record(0.0, 10.0).payback().is_infinite());
        assert_relative_eq!(record(2000.0, 10000.0).payback(), 5.0);
    }

    #[test]
    fn electricity_converts_to_source_mmbtu() {
        assert_relative_eq!(kwh_to_mmbtu(2000.0), 20.684848, epsilon = 1e-5);
    }

    #[test]
    fn category_total_skips_unreported() {
        let mut total = CategoryTotal::default();
        total.add(Some(100.0));
        total.add(None);
        total.add(Some(0.0));
        assert_eq!(total.reporting, 2);
        assert_relative_eq!(total.total, 100.0);
    }

    #[test]
    fn fuel_types_read_their_bill_names() {
        #[derive(Deserialize)]
        struct Holder {
            fuel: FuelType,
        }
        let h: Holder = toml::from_str("fuel = \"Fuel Oil #2\"").expect("known fuel");
        assert_eq!(h.fuel, FuelType::FuelOil2);
        assert_eq!(h.fuel.to_string(), "Fuel Oil #2");
        assert!(toml::from_str::<Holder>("fuel = \"Wood\"").is_err());
    }
}

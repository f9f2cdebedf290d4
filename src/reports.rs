use crate::arc::ApplicationArea;
use crate::savings::format_savings;
use crate::types::{
    BlendedPayback, CategoryTotal, FuelType, NumberedRecommendation, PartitionSummary,
    PortfolioSummary, RecommendationRecord, SummaryRow, ELECTRICITY_CO2_KG_PER_KWH,
};
use crate::util::{ceil_tenth, format_currency, IMMEDIATE, INFINITE};

/// Recommendations in report order, each set numbered from 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedRecommendations {
    pub primary: Vec<NumberedRecommendation>,
    pub supplemental: Vec<NumberedRecommendation>,
}

impl OrderedRecommendations {
    pub fn has_supplemental(&self) -> bool {
        !self.supplemental.is_empty()
    }
}

fn number_by_payback(mut records: Vec<RecommendationRecord>) -> Vec<NumberedRecommendation> {
    // `sort_by` is stable: equal paybacks keep their input order.
    records.sort_by(|a, b| a.payback().total_cmp(&b.payback()));
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| NumberedRecommendation {
            number: idx + 1,
            record,
        })
        .collect()
}

/// Split into primary and supplemental sets, sort each by ascending payback
/// and number them separately.
pub fn order_recommendations(records: Vec<RecommendationRecord>) -> OrderedRecommendations {
    let (supplemental, primary): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.is_supplemental());
    OrderedRecommendations {
        primary: number_by_payback(primary),
        supplemental: number_by_payback(supplemental),
    }
}

/// Payback of a set: total cost over total savings, rounded up to a tenth
/// of a year.
pub fn blended_payback(annual_cost_savings: f64, implementation_cost: f64) -> BlendedPayback {
    if annual_cost_savings == 0.0 || implementation_cost == 0.0 {
        BlendedPayback::Immediate
    } else {
        BlendedPayback::Years(ceil_tenth(implementation_cost / annual_cost_savings))
    }
}

/// Metric tons of CO2 avoided. The fuel factor applies to the natural gas
/// savings when the site burns natural gas, and to the "other energy"
/// savings for any other fuel.
pub fn co2_tonnes(
    fuel: FuelType,
    natural_gas_mmbtu: f64,
    other_energy_mmbtu: f64,
    electricity_kwh: f64,
) -> f64 {
    let fuel_mmbtu = if fuel.reported_as_natural_gas() {
        natural_gas_mmbtu
    } else {
        other_energy_mmbtu
    };
    (fuel.emission_factor() * fuel_mmbtu + ELECTRICITY_CO2_KG_PER_KWH * electricity_kwh) / 1000.0
}

/// Totals for one set. `co2_fuel` is given for the primary set only.
pub fn summarize<'a, I>(records: I, co2_fuel: Option<FuelType>) -> PartitionSummary
where
    I: IntoIterator<Item = &'a RecommendationRecord>,
{
    let mut count = 0usize;
    let mut electricity_kwh = CategoryTotal::default();
    let mut electricity_mmbtu = CategoryTotal::default();
    let mut demand_kw = CategoryTotal::default();
    let mut natural_gas_mmbtu = CategoryTotal::default();
    let mut other_energy_mmbtu = CategoryTotal::default();
    let mut annual_cost_savings = 0.0;
    let mut implementation_cost = 0.0;
    let mut application_areas = Vec::new();

    for r in records {
        count += 1;
        electricity_kwh.add(r.savings.electricity_kwh);
        electricity_mmbtu.add(r.savings.electricity_mmbtu());
        demand_kw.add(r.savings.demand_kw);
        natural_gas_mmbtu.add(r.savings.natural_gas_mmbtu);
        other_energy_mmbtu.add(r.savings.other_energy_mmbtu());
        annual_cost_savings += r.annual_cost_savings;
        implementation_cost += r.implementation_cost;
        match r.arc.as_ref().map(|arc| arc.application()) {
            Some(ApplicationArea::Unknown) | None => {}
            Some(area) => application_areas.push(area),
        }
    }
    application_areas.sort();
    application_areas.dedup();

    let combined_mmbtu =
        electricity_mmbtu.total + natural_gas_mmbtu.total + other_energy_mmbtu.total;
    let co2_tonnes = co2_fuel.map(|fuel| {
        co2_tonnes(
            fuel,
            natural_gas_mmbtu.total,
            other_energy_mmbtu.total,
            electricity_kwh.total,
        )
    });

    PartitionSummary {
        count,
        electricity_kwh,
        electricity_mmbtu,
        demand_kw,
        natural_gas_mmbtu,
        other_energy_mmbtu,
        combined_mmbtu,
        co2_tonnes,
        annual_cost_savings,
        implementation_cost,
        payback: blended_payback(annual_cost_savings, implementation_cost),
        application_areas,
    }
}

pub fn build_portfolio(ordered: &OrderedRecommendations, fuel: FuelType) -> PortfolioSummary {
    let primary = summarize(ordered.primary.iter().map(|n| &n.record), Some(fuel));
    let supplemental = ordered
        .has_supplemental()
        .then(|| summarize(ordered.supplemental.iter().map(|n| &n.record), None));
    PortfolioSummary {
        fuel_type: fuel,
        primary,
        supplemental,
    }
}

/// Payback as shown in the summary table. Short but non-zero paybacks are
/// floored at `0.1` so the table never shows `0.0`.
pub fn payback_cell(payback: f64) -> String {
    if payback == 0.0 {
        IMMEDIATE.to_string()
    } else if payback.is_infinite() {
        INFINITE.to_string()
    } else if payback < 0.1 {
        "0.1".to_string()
    } else {
        format!("{:.1}", (payback * 10.0).round() / 10.0)
    }
}

/// Formatted table rows for a numbered set, labelled `{label} {n}`.
pub fn summary_rows(numbered: &[NumberedRecommendation], label: &str) -> Vec<SummaryRow> {
    numbered
        .iter()
        .map(|n| {
            let r = &n.record;
            let text = format_savings(&r.savings);
            SummaryRow {
                label: format!("{} {}", label, n.number),
                arc: r.arc.as_ref().map(|a| a.to_string()).unwrap_or_default(),
                description: r.description.clone(),
                savings_type: text.savings_type,
                savings_value: text.savings_value,
                annual_cost_savings: format_currency(r.annual_cost_savings, 0),
                implementation_cost: format_currency(r.implementation_cost, 0),
                payback: payback_cell(r.payback()),
            }
        })
        .collect()
}

// Plant information and the `${KEY}` values of the front and back matter.
use crate::arc::ApplicationArea;
use crate::config::{Config, DATE_FORMAT};
use crate::error::Result;
use crate::types::PortfolioSummary;
use crate::util::{
    combine_words, format_currency, format_payback, format_rounded, trim_decimal,
};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Days after the visit by which the report is due.
pub const REPORT_DUE_DAYS: i64 = 60;

/// The report is dated today, or at the due date if that has passed.
pub fn report_date(visit: NaiveDate, today: NaiveDate) -> NaiveDate {
    (visit + Duration::days(REPORT_DUE_DAYS)).min(today)
}

fn last_name(name: &str) -> &str {
    name.trim().rsplit(' ').next().unwrap_or(name)
}

/// Sort names by last name, keeping the given order on ties.
pub fn sort_by_last_name(names: &[String]) -> Vec<String> {
    let mut sorted: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
    sorted.sort_by(|a, b| last_name(a).cmp(last_name(b)));
    sorted
}

/// Every placeholder value the templates use. Configured site fields come
/// first so computed keys win on a clash.
/// Plant areas as prose, e.g. "Manufacturing Process and Building and Grounds".
fn area_list(areas: &[ApplicationArea]) -> String {
    let names: Vec<String> = areas.iter().map(|a| a.to_string()).collect();
    combine_words(&names)
}

pub fn placeholder_map(
    config: &Config,
    portfolio: &PortfolioSummary,
    today: NaiveDate,
) -> Result<BTreeMap<String, String>> {
    let site = &config.compiler.site;
    let utility = &config.utility;
    let mut map = site.fields.clone();
    let mut set = |key: &str, value: String| {
        map.insert(key.to_string(), value);
    };

    set("LE", site.le.clone());
    set("VDATE", site.visit_date.trim().to_string());
    set(
        "RDATE",
        report_date(site.visit_date()?, today)
            .format(DATE_FORMAT)
            .to_string(),
    );
    set("PART", sort_by_last_name(&site.participants).join("\n"));
    set("CONT", sort_by_last_name(&site.contributors).join("\n"));

    set("EC", format_currency(utility.electricity_rate, 3));
    set("DC", format_currency(utility.demand_rate, 2));
    set("FC", format_currency(utility.fuel_rate, 2));
    let ngc = if utility.fuel_type.reported_as_natural_gas() {
        utility.fuel_rate
    } else {
        0.0
    };
    set("NGC", format_currency(ngc, 2));
    set("FuelType", utility.fuel_type.to_string());
    set("FuelUnit", utility.fuel_unit.clone());
    set("StartMo", utility.start_month.clone());
    set("EndMo", utility.end_month.clone());
    set("TotalEkWh", format_rounded(utility.total_electricity_kwh));
    set("TotalEBtu", format_rounded(utility.total_electricity_mmbtu));
    set("TotalDkW", format_rounded(utility.total_demand_kw));
    set("TotalFBtu", format_rounded(utility.total_fuel_mmbtu));
    set("TotalBtu", format_rounded(utility.total_mmbtu));
    set("TotalECost", format_currency(utility.total_electricity_cost, 0));
    set("TotalFCost", format_currency(utility.total_fuel_cost, 0));
    set("TotalCost", format_currency(utility.total_cost, 0));

    let primary = &portfolio.primary;
    set("ARMMBtu", format_rounded(primary.combined_mmbtu));
    set("CO2", format_rounded(primary.co2_tonnes.unwrap_or_default()));
    set("FuelCO2", trim_decimal(portfolio.fuel_type.emission_factor()));
    set("ARACS", format_currency(primary.annual_cost_savings, 0));
    set("ARIC", format_currency(primary.implementation_cost, 0));
    set("ARPB", primary.payback.to_string());
    set("ARAreas", area_list(&primary.application_areas));
    set(
        "PB",
        format_payback(primary.annual_cost_savings, primary.implementation_cost),
    );

    if let Some(supplemental) = &portfolio.supplemental {
        set("AARMMBtu", format_rounded(supplemental.combined_mmbtu));
        set("AARACS", format_currency(supplemental.annual_cost_savings, 0));
        set("AARIC", format_currency(supplemental.implementation_cost, 0));
        set("AARPB", supplemental.payback.to_string());
        set("AARAreas", area_list(&supplemental.application_areas));
    }

    Ok(map)
}

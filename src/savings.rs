// "Savings Type" / "Savings Value" cell text for the summary table.
//
// The two columns are printed side by side, one line per savings category,
// so their lines must stay aligned with the template layout: electricity
// takes two value lines (kWh and its MMBtu equivalent) and is followed by a
// blank line in the type column.
use crate::types::EnergySavings;
use crate::util::format_truncated;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavingsText {
    pub savings_type: String,
    pub savings_value: String,
}

/// Compose the two columns in fixed order: electricity, demand, natural
/// gas, other energy, other resource. Unreported categories emit nothing.
pub fn format_savings(savings: &EnergySavings) -> SavingsText {
    let mut types = String::new();
    let mut values = String::new();

    if let Some(kwh) = savings.electricity_kwh {
        let mmbtu = savings.electricity_mmbtu().unwrap_or_default();
        types.push_str("Electricity\n\n");
        values.push_str(&format!("{} kWh\n", format_truncated(kwh)));
        values.push_str(&format!("({} MMBtu)\n", format_truncated(mmbtu)));
    }
    if let Some(kw) = savings.demand_kw {
        types.push_str("Demand\n");
        values.push_str(&format!("{} kW\n", format_truncated(kw)));
    }
    if let Some(mmbtu) = savings.natural_gas_mmbtu {
        types.push_str("Natural Gas\n");
        values.push_str(&format!("{} MMBtu\n", format_truncated(mmbtu)));
    }
    if let Some(other) = &savings.other_energy {
        types.push_str(&other.label);
        types.push('\n');
        values.push_str(&format!("{} MMBtu\n", format_truncated(other.mmbtu)));
    }
    if let Some(resource) = &savings.other_resource {
        types.push_str(&resource.label);
        types.push('\n');
        values.push_str(&resource.amount);
        values.push('\n');
    }

    SavingsText {
        savings_type: types.trim_end_matches('\n').to_string(),
        savings_value: values.trim_end_matches('\n').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OtherEnergy, OtherResource};
    use pretty_assertions::assert_eq;

    #[test]
    fn electricity_shows_mmbtu_and_a_blank_type_line() {
        let text = format_savings(&EnergySavings {
            electricity_kwh: Some(12345.0),
            demand_kw: Some(14.0),
            ..EnergySavings::default()
        });
        assert_eq!(text.savings_type, "Electricity\n\nDemand");
        assert_eq!(text.savings_value, "12,345 kWh\n(127 MMBtu)\n14 kW");
    }

    #[test]
    fn all_categories_in_fixed_order() {
        let text = format_savings(&EnergySavings {
            electricity_kwh: Some(2000.0),
            demand_kw: Some(3.0),
            natural_gas_mmbtu: Some(50.0),
            other_energy: Some(OtherEnergy {
                label: "Propane".to_string(),
                mmbtu: 1200.7,
            }),
            other_resource: Some(OtherResource {
                label: "Water".to_string(),
                amount: "40,000 gal".to_string(),
            }),
        });
        assert_eq!(
            text.savings_type,
            "Electricity\n\nDemand\nNatural Gas\nPropane\nWater"
        );
        assert_eq!(
            text.savings_value,
            "2,000 kWh\n(20 MMBtu)\n3 kW\n50 MMBtu\n1,200 MMBtu\n40,000 gal"
        );
    }

    #[test]
    fn electricity_alone_has_no_trailing_newlines() {
        let text = format_savings(&EnergySavings {
            electricity_kwh: Some(1000.0),
            ..EnergySavings::default()
        });
        assert_eq!(text.savings_type, "Electricity");
        assert_eq!(text.savings_value, "1,000 kWh\n(10 MMBtu)");
    }

    #[test]
    fn nothing_reported_gives_empty_columns() {
        assert_eq!(format_savings(&EnergySavings::default()), SavingsText::default());
    }
}

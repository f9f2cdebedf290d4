use approx::assert_relative_eq;
use iac_compiler::arc::ArcCode;
use iac_compiler::config::ReportConfig;
use iac_compiler::loader::parse_recommendation;
use iac_compiler::reports::{order_recommendations, payback_cell, summarize, summary_rows};
use iac_compiler::summary_table::recommendation_document;
use iac_compiler::types::{
    BlendedPayback, Classification, EnergySavings, OtherResource, RecommendationRecord,
};
use iac_compiler::util::format_payback;
use rstest::rstest;

fn record(name: &str, savings: f64, cost: f64) -> RecommendationRecord {
    RecommendationRecord {
        file_name: format!("{name}.json"),
        classification: Classification::Primary,
        description: name.to_string(),
        arc: None,
        savings: EnergySavings::default(),
        annual_cost_savings: savings,
        implementation_cost: cost,
    }
}

#[rstest]
#[case(1000.0, 0.0, "Immediate")]
#[case(0.0, 500.0, "Infinite")]
#[case(1200.0, 100.0, "1 month")]
#[case(1200.0, 600.0, "6 months")]
#[case(1000.0, 1000.0, "1 year")]
#[case(1000.0, 1010.0, "1.1 years")]
#[case(1000.0, 2000.0, "2 years")]
fn payback_text(#[case] savings: f64, #[case] cost: f64, #[case] expected: &str) {
    assert_eq!(format_payback(savings, cost), expected);
}

#[test]
fn payback_cell_boundaries() {
    assert_eq!(payback_cell(0.0), "Immediate");
    assert_eq!(payback_cell(0.05), "0.1");
    assert_eq!(payback_cell(0.1), "0.1");
    assert_eq!(payback_cell(f64::INFINITY), "Infinite");

    let ordered = order_recommendations(vec![record("Tiny", 10000.0, 500.0)]);
    let rows = summary_rows(&ordered.primary, "AR");
    assert_eq!(rows[0].payback, "0.1");
}

#[test]
fn ties_keep_their_input_order() {
    let records = vec![
        record("A", 100.0, 320.0),
        record("B", 100.0, 100.0),
        record("C", 100.0, 100.0),
        record("D", 100.0, 500.0),
    ];
    let ordered = order_recommendations(records);
    let order: Vec<_> = ordered
        .primary
        .iter()
        .map(|n| (n.number, n.record.description.as_str()))
        .collect();
    assert_eq!(order, vec![(1, "B"), (2, "C"), (3, "A"), (4, "D")]);
}

#[test]
fn absent_energy_is_not_counted_as_zero() {
    let mut a = record("A", 100.0, 100.0);
    a.savings.electricity_kwh = Some(1000.0);
    let mut b = record("B", 100.0, 100.0);
    b.savings.electricity_kwh = Some(3000.0);
    b.savings.demand_kw = Some(0.0);
    let c = record("C", 100.0, 100.0);

    let summary = summarize([&a, &b, &c], None);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.electricity_kwh.reporting, 2);
    assert_relative_eq!(summary.electricity_kwh.total, 4000.0);
    // a reported zero still counts as reported
    assert_eq!(summary.demand_kw.reporting, 1);
    assert_eq!(summary.natural_gas_mmbtu.reporting, 0);
    assert_eq!(summary.payback, BlendedPayback::Years(1.0));
}

#[test]
fn zero_savings_give_an_immediate_blended_payback() {
    let summary = summarize([&record("A", 0.0, 100.0)], None);
    assert_eq!(summary.payback, BlendedPayback::Immediate);
    assert_eq!(summary.payback.to_string(), "Immediate");
}

#[rstest]
#[case(Classification::Primary, "Insulate Steam Lines", 845.6, 1200.0)]
#[case(Classification::Supplemental, "Install LED Lighting", 12500.0, 0.0)]
fn table_round_trip(
    #[case] classification: Classification,
    #[case] description: &str,
    #[case] savings: f64,
    #[case] cost: f64,
) {
    let mut source = record(description, savings, cost);
    source.classification = classification;
    source.arc = Some(ArcCode::parse("2.7142.1").unwrap());
    source.savings.demand_kw = Some(12.0);
    source.savings.other_resource = Some(OtherResource {
        label: "Water".to_string(),
        amount: "40,000 gal".to_string(),
    });

    let ordered = order_recommendations(vec![source.clone()]);
    let numbered = ordered
        .primary
        .first()
        .or_else(|| ordered.supplemental.first())
        .unwrap();
    let doc = recommendation_document(numbered, &ReportConfig::default());
    let parsed = parse_recommendation(&doc, "copy.json").unwrap();

    assert_eq!(parsed.classification, classification);
    assert_eq!(parsed.description, description);
    assert_eq!(parsed.arc, source.arc);
    assert_eq!(parsed.savings, source.savings);
    assert_relative_eq!(parsed.annual_cost_savings, savings.round());
    assert_relative_eq!(parsed.implementation_cost, cost.round());
}

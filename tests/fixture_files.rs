//! Ranking over the bundled event fixture files.

use std::path::PathBuf;

use customer_ltv::prelude::*;
use rust_decimal_macros::dec;
use testresult::TestResult;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("events")
        .join(name)
}

fn ranked(name: &str, top: usize) -> TestResult<Vec<(String, rust_decimal::Decimal)>> {
    let records = load_events(fixture(name))?;
    let mut engine = Engine::default();
    engine.parse_events(&records)?;

    Ok(engine
        .top_ltv_customers(top)?
        .into_iter()
        .map(|value| (value.customer.to_string(), value.ltv))
        .collect())
}

#[test]
fn sample_ranking() -> TestResult {
    assert_eq!(
        ranked("sample.json", 10)?,
        [
            ("1".to_string(), dec!(3208.4)),
            ("2".to_string(), dec!(2600)),
            ("3".to_string(), dec!(0)),
        ]
    );

    Ok(())
}

#[test]
fn sample_ranking_is_truncated() -> TestResult {
    assert_eq!(
        ranked("sample.json", 1)?,
        [("1".to_string(), dec!(3208.4))]
    );

    Ok(())
}

#[test]
fn updates_and_unknown_types() -> TestResult {
    // alice: 2 visits over 2 weeks, order updated from 40.00 to 25.00.
    // bob: 1 visit, 15.50. Image and customer events are ignored, including a customer
    // record that carries no customer_id.
    assert_eq!(
        ranked("updates.yml", 10)?,
        [
            ("bob".to_string(), dec!(8060)),
            ("alice".to_string(), dec!(6500)),
        ]
    );

    Ok(())
}

#[test]
fn report_renders_fixture_ranking() -> TestResult {
    let records = load_events(fixture("sample.json"))?;
    let mut engine = Engine::default();
    engine.parse_events(&records)?;

    let mut out = Vec::new();
    write_ranking(&mut out, &engine.top_ltv_customers(2)?, rusty_money::iso::USD)?;

    let rendered = String::from_utf8(out)?;
    assert!(rendered.contains("Lifetime Value"), "missing header");
    assert!(!rendered.contains(" 3 "), "customer 3 should be cut off");

    Ok(())
}

use personal_finance_core::savings::projection::{project_savings, Compounding, GrantMatch, SavingsInput};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn resp_plan() -> SavingsInput {
    // RESP-style plan: 2500/yr attracts a 20% grant, capped at 7200 for life.
    serde_json::from_value(serde_json::json!({
        "initial_balance": "0",
        "monthly_contribution": "250",
        "annual_rate": "0.05",
        "compounding": "monthly",
        "term_years": 18,
        "start_date": "2024-01-01",
        "grant": {
            "match_rate": "0.20",
            "annual_eligible_cap": "2500",
            "lifetime_cap": "7200"
        }
    }))
    .unwrap()
}

#[test]
fn test_resp_grant_stops_at_lifetime_cap() {
    let out = project_savings(&resp_plan()).unwrap();
    let s = &out.result.summary;

    assert_eq!(s.months, 216);
    assert_eq!(s.total_contributions, dec!(54000));
    assert_eq!(s.total_grants, dec!(7200));
    assert!(out.warnings.iter().any(|w| w.contains("Lifetime grant cap")));
    assert_eq!(
        s.final_balance,
        s.total_contributions + s.total_grants + s.total_interest
    );
}

#[test]
fn test_balance_identity_holds_every_month() {
    let input = SavingsInput {
        initial_balance: dec!(5000),
        compounding: Compounding::Annually,
        annual_contribution_limit: Some(dec!(2000)),
        grant: Some(GrantMatch {
            match_rate: dec!(0.10),
            annual_eligible_cap: dec!(1000),
            lifetime_cap: dec!(10000),
        }),
        ..resp_plan()
    };
    let out = project_savings(&input).unwrap();
    let mut expected = dec!(5000);
    for p in &out.result.periods {
        expected += p.interest + p.contribution + p.grant;
        assert_eq!(p.balance, expected);
        assert!(p.contribution + p.refused_contribution == dec!(250));
    }
    assert!(out.result.summary.refused_contributions > Decimal::ZERO);
}

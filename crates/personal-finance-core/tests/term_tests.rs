use personal_finance_core::term::{
    months_to_term_parts, normalize_term_parts, term_parts_to_months, TermPart, TermParts,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_documented_examples() {
    assert_eq!(term_parts_to_months(25, 6), 306);
    assert_eq!(term_parts_to_months(None::<u32>, None::<u32>), 0);
    assert_eq!(term_parts_to_months("not-a-number", -3), 0);
    assert_eq!(months_to_term_parts(306), TermParts { years: 25, months: 6 });
    assert_eq!(months_to_term_parts(None::<u32>), TermParts { years: 0, months: 0 });
    assert_eq!(normalize_term_parts(24, 18), TermParts { years: 25, months: 6 });
}

#[test]
fn test_form_values_from_json() {
    let form = json!({"years": "30", "months": null});
    let months = term_parts_to_months(&form["years"], &form["months"]);
    assert_eq!(months, 360);
    // Missing keys index to Null.
    assert_eq!(term_parts_to_months(&form["nope"], &form["months"]), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_round_trip_preserves_total(years in 0u32..1000, months in 0u32..10_000) {
        let total = term_parts_to_months(years, months);
        let parts = months_to_term_parts(total);
        prop_assert_eq!(parts.total_months(), total);
        prop_assert!(parts.months < 12);
    }

    #[test]
    fn prop_normalize_keeps_months_in_range(years in 0u32..1000, months in 0u32..10_000) {
        let parts = normalize_term_parts(years, months);
        prop_assert!(parts.months <= 11);
        prop_assert!(parts.years >= years);
        prop_assert_eq!(parts.total_months(), term_parts_to_months(years, months));
    }

    #[test]
    fn prop_negative_or_garbage_components_are_zero(neg in i64::MIN..0, text in "[a-z]{1,8}") {
        prop_assert_eq!(TermPart::from(neg), TermPart::ZERO);
        prop_assert_eq!(TermPart::from(text.as_str()), TermPart::ZERO);
    }
}

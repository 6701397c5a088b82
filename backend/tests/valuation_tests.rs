//! Tests for item valuation
//! Verifies net weight and fine derivation, lenient input parsing and the
//! form recompute rules end to end

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    carat_total, compute_fine, compute_net_weight, normalize_decimal_input, parse_decimal_prefix,
    to_fixed, total_inclusion_weight, Inclusion, InclusionField, InclusionKind, ItemField,
    ItemForm, Valuation, CARAT_TO_GRAM,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn inclusion(weight: &str, pieces: &str) -> Inclusion {
    Inclusion {
        id: String::new(),
        weight: weight.to_string(),
        pieces: pieces.to_string(),
        rate: String::new(),
    }
}

// =============================================================================
// Inclusion totals
// =============================================================================

mod inclusion_totals {
    use super::*;

    #[test]
    fn empty_sequence_is_zero() {
        assert_eq!(total_inclusion_weight(&[]), Decimal::ZERO);
    }

    #[test]
    fn weight_times_pieces() {
        assert_eq!(total_inclusion_weight(&[inclusion("2", "3")]), dec("6"));
    }

    #[test]
    fn blank_weight_contributes_nothing() {
        assert_eq!(total_inclusion_weight(&[inclusion("", "3")]), Decimal::ZERO);
    }

    #[test]
    fn non_numeric_pieces_contribute_nothing() {
        let rows = [inclusion("0.5", "many"), inclusion("0.25", "4")];
        assert_eq!(total_inclusion_weight(&rows), dec("1"));
    }

    #[test]
    fn rate_is_ignored() {
        let mut row = inclusion("1.5", "2");
        row.rate = "45000".to_string();
        assert_eq!(total_inclusion_weight(&[row]), dec("3"));
    }

    #[test]
    fn carat_total_has_two_decimals() {
        assert_eq!(carat_total(&[]).to_string(), "0.00");
        assert_eq!(carat_total(&[inclusion("0.333", "3")]).to_string(), "1.00");
        assert_eq!(carat_total(&[inclusion("0.125", "1")]).to_string(), "0.13");
    }
}

// =============================================================================
// Net weight and fine
// =============================================================================

mod derived_values {
    use super::*;

    #[test]
    fn net_weight_has_three_decimals() {
        let net = compute_net_weight("10", &[], &[]);
        assert_eq!(net.to_string(), "10.000");
    }

    #[test]
    fn net_weight_converts_carats_to_grams() {
        let diamonds = [inclusion("0.5", "4")];
        let stones = [inclusion("1", "1")];
        assert_eq!(compute_net_weight("5", &diamonds, &stones).to_string(), "5.600");
    }

    #[test]
    fn invalid_gross_weight_reads_as_zero() {
        let stones = [inclusion("1", "5")];
        assert_eq!(compute_net_weight("abc", &[], &stones).to_string(), "1.000");
        assert_eq!(compute_net_weight("", &[], &[]).to_string(), "0.000");
    }

    #[test]
    fn fine_has_two_decimals() {
        assert_eq!(compute_fine("10.000", "75").to_string(), "7.50");
        assert_eq!(compute_fine("5.600", "91.6").to_string(), "5.13");
    }

    #[test]
    fn fine_rounds_half_away_from_zero() {
        // 1.005 exactly; banker's rounding would give 1.00
        assert_eq!(compute_fine("1.005", "100").to_string(), "1.01");
    }

    #[test]
    fn fine_of_invalid_input_is_zero() {
        assert_eq!(compute_fine("", "91.6").to_string(), "0.00");
        assert_eq!(compute_fine("10", "n/a").to_string(), "0.00");
    }

    #[test]
    fn decimal_inputs_are_accepted() {
        assert_eq!(compute_fine(dec("5.2"), dec("91.6")).to_string(), "4.76");
    }

    #[test]
    fn valuation_derives_both_fields() {
        let valuation = Valuation::derive("5", &[inclusion("0.5", "4")], &[], "91.6");
        assert_eq!(valuation.net_weight.to_string(), "5.400");
        assert_eq!(valuation.fine.to_string(), "4.95");
    }

    #[test]
    fn carat_constant() {
        assert_eq!(CARAT_TO_GRAM, dec("0.2"));
    }
}

// =============================================================================
// Input parsing and normalization
// =============================================================================

mod input_parsing {
    use super::*;

    #[test]
    fn normalize_leading_dot() {
        assert_eq!(normalize_decimal_input(".5"), "0.5");
        assert_eq!(normalize_decimal_input("1.5"), "1.5");
        assert_eq!(normalize_decimal_input(""), "");
    }

    #[test]
    fn numeric_prefix_is_read() {
        assert_eq!(parse_decimal_prefix("12.5g"), Some(dec("12.5")));
        assert_eq!(parse_decimal_prefix(".5"), Some(dec("0.5")));
        assert_eq!(parse_decimal_prefix("  7"), Some(dec("7")));
        assert_eq!(parse_decimal_prefix("-3"), Some(dec("-3")));
    }

    #[test]
    fn exponent_is_read() {
        assert_eq!(parse_decimal_prefix("1e3"), Some(dec("1000")));
        assert_eq!(parse_decimal_prefix("2.5E-1"), Some(dec("0.25")));
        assert_eq!(parse_decimal_prefix("4e"), Some(dec("4")));
    }

    #[test]
    fn no_leading_digit_is_none() {
        assert_eq!(parse_decimal_prefix(""), None);
        assert_eq!(parse_decimal_prefix("."), None);
        assert_eq!(parse_decimal_prefix("abc"), None);
        assert_eq!(parse_decimal_prefix("-"), None);
    }
}

// =============================================================================
// Form scenarios
// =============================================================================

mod form_scenarios {
    use super::*;

    #[test]
    fn scenario_gross_and_percentage_only() {
        let mut form = ItemForm::new();
        form.set_field(ItemField::GrossWeight, "10");
        form.set_field(ItemField::Percentage, "75");

        assert_eq!(form.net_weight(), "10.000");
        assert_eq!(form.fine(), "7.50");
    }

    fn scenario_with_inclusions() -> (ItemForm, String) {
        let mut form = ItemForm::new();
        form.set_field(ItemField::GrossWeight, "5");

        let diamond = form.add_inclusion(InclusionKind::Diamond);
        form.update_inclusion(InclusionKind::Diamond, &diamond, InclusionField::Weight, "0.5")
            .unwrap();
        form.update_inclusion(InclusionKind::Diamond, &diamond, InclusionField::Pieces, "4")
            .unwrap();

        let stone = form.add_inclusion(InclusionKind::Stone);
        form.update_inclusion(InclusionKind::Stone, &stone, InclusionField::Weight, "1")
            .unwrap();
        form.update_inclusion(InclusionKind::Stone, &stone, InclusionField::Pieces, "1")
            .unwrap();

        form.set_field(ItemField::Percentage, "91.6");
        (form, diamond)
    }

    #[test]
    fn scenario_diamond_and_stone() {
        let (form, _) = scenario_with_inclusions();
        assert_eq!(form.net_weight(), "5.600");
        assert_eq!(form.fine(), "5.13");
    }

    #[test]
    fn scenario_remove_only_diamond() {
        let (mut form, diamond) = scenario_with_inclusions();
        form.remove_inclusion(InclusionKind::Diamond, &diamond).unwrap();

        assert_eq!(form.net_weight(), "5.200");
        assert_eq!(form.fine(), "4.76");
    }

    #[test]
    fn scenario_percentage_edit_keeps_net_weight() {
        let (mut form, _) = scenario_with_inclusions();
        form.set_field(ItemField::Percentage, "75");

        assert_eq!(form.net_weight(), "5.600");
        assert_eq!(form.fine(), "4.20");
    }
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use super::*;

    /// Non-negative decimal with up to `scale` fractional digits
    fn decimal_strategy(max: i64, scale: u32) -> impl Strategy<Value = Decimal> {
        (0i64..=max).prop_map(move |units| Decimal::new(units, scale))
    }

    fn inclusion_strategy() -> impl Strategy<Value = Inclusion> {
        (decimal_strategy(10_000, 2), 0u32..=200).prop_map(|(weight, pieces)| Inclusion {
            id: String::new(),
            weight: weight.to_string(),
            pieces: pieces.to_string(),
            rate: String::new(),
        })
    }

    fn inclusions_strategy() -> impl Strategy<Value = Vec<Inclusion>> {
        prop::collection::vec(inclusion_strategy(), 0..8)
    }

    proptest! {
        /// Net weight = gross + 0.2 × total carats, to three decimals
        #[test]
        fn prop_net_weight_formula(
            gross in decimal_strategy(10_000_000, 3),
            diamonds in inclusions_strategy(),
            stones in inclusions_strategy(),
        ) {
            let expected = to_fixed(
                gross + dec("0.2") * (total_inclusion_weight(&diamonds) + total_inclusion_weight(&stones)),
                3,
            );
            let net = compute_net_weight(gross.to_string(), &diamonds, &stones);

            prop_assert_eq!(net, expected);
            prop_assert_eq!(net.scale(), 3);
        }

        /// Row order never changes the result
        #[test]
        fn prop_order_independent(
            gross in decimal_strategy(10_000_000, 3),
            diamonds in inclusions_strategy(),
            stones in inclusions_strategy(),
        ) {
            let forward = compute_net_weight(gross, &diamonds, &stones);

            let mut reversed_diamonds = diamonds.clone();
            reversed_diamonds.reverse();
            let mut rotated_stones = stones.clone();
            if !rotated_stones.is_empty() {
                rotated_stones.rotate_left(1);
            }

            prop_assert_eq!(forward, compute_net_weight(gross, &reversed_diamonds, &rotated_stones));
        }

        /// Fine never decreases when either input grows
        #[test]
        fn prop_fine_monotonic(
            net in decimal_strategy(10_000_000, 3),
            net_step in decimal_strategy(1_000_000, 3),
            percentage in decimal_strategy(10_000, 2),
            percentage_step in decimal_strategy(10_000, 2),
        ) {
            let base = compute_fine(net, percentage);
            prop_assert!(compute_fine(net + net_step, percentage) >= base);
            prop_assert!(compute_fine(net, percentage + percentage_step) >= base);
        }

        /// Arbitrary typed text never panics; unparseable text counts as zero
        #[test]
        fn prop_any_text_is_tolerated(gross in "\\PC{0,24}", percentage in "\\PC{0,24}") {
            let net = compute_net_weight(gross.as_str(), &[], &[]);
            let fine = compute_fine(net, percentage.as_str());

            let parsed = parse_decimal_prefix(&percentage).unwrap_or(Decimal::ZERO);
            prop_assert_eq!(fine, compute_fine(net, parsed));
            if parse_decimal_prefix(&gross).is_none() {
                prop_assert_eq!(net, Decimal::ZERO);
            }
        }
    }
}

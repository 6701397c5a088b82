//! Item valuation: net weight and fine derived from raw form measurements
//!
//! Inputs arrive exactly as the user typed them. Anything that does not parse
//! as a number counts as zero, so the derived fields keep updating while a
//! value is still half-typed.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::Inclusion;

/// Grams per carat.
pub const CARAT_TO_GRAM: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Fractional digits shown for net weight (grams).
pub const NET_WEIGHT_SCALE: u32 = 3;

/// Fractional digits shown for fine.
pub const FINE_SCALE: u32 = 2;

/// Fractional digits shown for carat totals.
pub const CARAT_SCALE: u32 = 2;

/// A value that can feed the calculator, raw text or an already-parsed number
pub trait NumericInput {
    /// Numeric value, or zero when the input does not parse
    fn to_decimal_or_zero(&self) -> Decimal;
}

impl NumericInput for str {
    fn to_decimal_or_zero(&self) -> Decimal {
        parse_decimal_prefix(self).unwrap_or(Decimal::ZERO)
    }
}

impl NumericInput for String {
    fn to_decimal_or_zero(&self) -> Decimal {
        self.as_str().to_decimal_or_zero()
    }
}

impl NumericInput for Decimal {
    fn to_decimal_or_zero(&self) -> Decimal {
        *self
    }
}

impl<T: NumericInput + ?Sized> NumericInput for &T {
    fn to_decimal_or_zero(&self) -> Decimal {
        (**self).to_decimal_or_zero()
    }
}

/// Parse the longest numeric prefix of `raw`, the way a browser number field
/// reads partially typed input ("12.5g" reads as 12.5, ".5" as 0.5).
///
/// Returns `None` when no digit leads the input.
pub fn parse_decimal_prefix(raw: &str) -> Option<Decimal> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_part = &s[int_start..pos];

    let mut frac_part = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_part = &s[frac_start..end];
        pos = end;
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut mantissa = String::with_capacity(int_part.len() + frac_part.len() + 3);
    if negative {
        mantissa.push('-');
    }
    mantissa.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        mantissa.push('.');
        mantissa.push_str(frac_part);
    }

    if let Some(exponent) = exponent_suffix(&s[pos..]) {
        return Decimal::from_scientific(&format!("{}e{}", mantissa, exponent)).ok();
    }

    Decimal::from_str(&mantissa).ok()
}

/// `e`/`E` followed by an optionally signed integer
fn exponent_suffix(rest: &str) -> Option<&str> {
    let tail = rest.strip_prefix(['e', 'E'])?;
    let digits_from = usize::from(tail.starts_with(['+', '-']));
    let digit_count = tail[digits_from..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digit_count == 0 {
        return None;
    }
    Some(&tail[..digits_from + digit_count])
}

/// Round half away from zero and pad to exactly `scale` fractional digits
pub fn to_fixed(value: Decimal, scale: u32) -> Decimal {
    let mut fixed = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(scale);
    fixed
}

/// Total carats of a sequence of inclusions: Σ weight × pieces
///
/// Rows whose weight or pieces do not parse contribute nothing.
pub fn total_inclusion_weight(items: &[Inclusion]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |total, item| {
        let carats = item
            .weight
            .to_decimal_or_zero()
            .checked_mul(item.pieces.to_decimal_or_zero())
            .unwrap_or(Decimal::ZERO);
        total.checked_add(carats).unwrap_or(total)
    })
}

/// Carat total as displayed under an inclusion list, two fractional digits
pub fn carat_total(items: &[Inclusion]) -> Decimal {
    to_fixed(total_inclusion_weight(items), CARAT_SCALE)
}

/// Net weight in grams: gross + 0.2 × (diamond carats + stone carats),
/// to exactly three fractional digits
pub fn compute_net_weight<G>(gross_weight: G, diamonds: &[Inclusion], stones: &[Inclusion]) -> Decimal
where
    G: NumericInput,
{
    let gross = gross_weight.to_decimal_or_zero();
    let inclusion_grams = total_inclusion_weight(diamonds)
        .checked_add(total_inclusion_weight(stones))
        .and_then(|carats| carats.checked_mul(CARAT_TO_GRAM))
        .unwrap_or(Decimal::ZERO);

    to_fixed(
        gross.checked_add(inclusion_grams).unwrap_or(gross),
        NET_WEIGHT_SCALE,
    )
}

/// Fine: net weight × percentage / 100, to exactly two fractional digits
pub fn compute_fine<N, P>(net_weight: N, percentage: P) -> Decimal
where
    N: NumericInput,
    P: NumericInput,
{
    let fine = net_weight
        .to_decimal_or_zero()
        .checked_mul(percentage.to_decimal_or_zero())
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO);

    to_fixed(fine, FINE_SCALE)
}

/// Prefix a bare leading `.` with `0`; anything else passes through
pub fn normalize_decimal_input(raw: &str) -> String {
    if raw.starts_with('.') {
        format!("0{}", raw)
    } else {
        raw.to_string()
    }
}

/// Both derived values for an item, computed in one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub net_weight: Decimal,
    pub fine: Decimal,
}

impl Valuation {
    /// Derive net weight and fine from the raw measurements
    pub fn derive<G, P>(
        gross_weight: G,
        diamonds: &[Inclusion],
        stones: &[Inclusion],
        percentage: P,
    ) -> Self
    where
        G: NumericInput,
        P: NumericInput,
    {
        let net_weight = compute_net_weight(gross_weight, diamonds, stones);
        let fine = compute_fine(net_weight, percentage);
        Self { net_weight, fine }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(weight: &str, pieces: &str) -> Inclusion {
        Inclusion {
            id: String::new(),
            weight: weight.to_string(),
            pieces: pieces.to_string(),
            rate: String::new(),
        }
    }

    #[test]
    fn test_carat_constant() {
        assert_eq!(CARAT_TO_GRAM, dec("0.2"));
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_decimal_prefix("12"), Some(dec("12")));
        assert_eq!(parse_decimal_prefix(" 12.50 "), Some(dec("12.50")));
        assert_eq!(parse_decimal_prefix(".5"), Some(dec("0.5")));
        assert_eq!(parse_decimal_prefix("5."), Some(dec("5")));
        assert_eq!(parse_decimal_prefix("-3.2"), Some(dec("-3.2")));
        assert_eq!(parse_decimal_prefix("7.25g"), Some(dec("7.25")));
        assert_eq!(parse_decimal_prefix("1e3"), Some(dec("1000")));
        assert_eq!(parse_decimal_prefix("2e"), Some(dec("2")));
    }

    #[test]
    fn test_parse_prefix_rejects_non_numeric() {
        assert_eq!(parse_decimal_prefix(""), None);
        assert_eq!(parse_decimal_prefix("   "), None);
        assert_eq!(parse_decimal_prefix("abc"), None);
        assert_eq!(parse_decimal_prefix("."), None);
        assert_eq!(parse_decimal_prefix("-"), None);
    }

    #[test]
    fn test_to_fixed_pads_and_rounds() {
        assert_eq!(to_fixed(dec("10"), 3).to_string(), "10.000");
        assert_eq!(to_fixed(dec("5.1296"), 2).to_string(), "5.13");
        assert_eq!(to_fixed(dec("0.125"), 2).to_string(), "0.13");
        assert_eq!(to_fixed(dec("4.7632"), 2).to_string(), "4.76");
    }

    #[test]
    fn test_total_inclusion_weight() {
        assert_eq!(total_inclusion_weight(&[]), Decimal::ZERO);
        assert_eq!(total_inclusion_weight(&[row("2", "3")]), dec("6"));
        assert_eq!(total_inclusion_weight(&[row("", "3")]), Decimal::ZERO);
        assert_eq!(total_inclusion_weight(&[row("0.5", "x")]), Decimal::ZERO);
        assert_eq!(
            total_inclusion_weight(&[row("0.5", "4"), row("1", "1")]),
            dec("3")
        );
    }

    #[test]
    fn test_net_weight_without_inclusions() {
        assert_eq!(compute_net_weight("10", &[], &[]).to_string(), "10.000");
        assert_eq!(compute_net_weight("", &[], &[]).to_string(), "0.000");
    }

    #[test]
    fn test_net_weight_with_inclusions() {
        let net = compute_net_weight("5", &[row("0.5", "4")], &[row("1", "1")]);
        assert_eq!(net.to_string(), "5.600");
    }

    #[test]
    fn test_fine() {
        assert_eq!(compute_fine("10.000", "75").to_string(), "7.50");
        assert_eq!(compute_fine(dec("5.600"), "91.6").to_string(), "5.13");
        assert_eq!(compute_fine("abc", "91.6").to_string(), "0.00");
        assert_eq!(compute_fine("5.6", "").to_string(), "0.00");
    }

    #[test]
    fn test_normalize_decimal_input() {
        assert_eq!(normalize_decimal_input(".5"), "0.5");
        assert_eq!(normalize_decimal_input("1.5"), "1.5");
        assert_eq!(normalize_decimal_input(""), "");
        assert_eq!(normalize_decimal_input("."), "0.");
    }

    #[test]
    fn test_valuation_derive() {
        let valuation = Valuation::derive("5", &[], &[row("1", "1")], "91.6");
        assert_eq!(valuation.net_weight.to_string(), "5.200");
        assert_eq!(valuation.fine.to_string(), "4.76");
    }
}

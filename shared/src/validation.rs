//! Validation rules and reference generators for Jewel Ledger
//!
//! The `validate_*` functions plug into `validator` derives on the input
//! models; each returns a `ValidationError` carrying the user-facing message.

use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::valuation::parse_decimal_prefix;

/// Alphabet for client codes.
pub const CLIENT_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated client code.
pub const CLIENT_ID_LEN: usize = 8;

const BASE36_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn owned_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

// ============================================================================
// Numeric fields
// ============================================================================

/// Lower bound a numeric field must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Greater than zero
    Positive,
    /// Zero or more
    NonNegative,
}

impl Bound {
    fn admits(&self, value: Decimal) -> bool {
        match self {
            Bound::Positive => value > Decimal::ZERO,
            Bound::NonNegative => value >= Decimal::ZERO,
        }
    }
}

/// Digits a stored numeric column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub integer_digits: u32,
    pub scale: u32,
}

impl Precision {
    /// Weights in grams, `NUMERIC(14, 3)`
    pub const GRAMS: Precision = Precision {
        integer_digits: 11,
        scale: 3,
    };

    /// `NUMERIC(7, 3)`
    pub const PERCENTAGE: Precision = Precision {
        integer_digits: 4,
        scale: 3,
    };

    /// Making charge and fine, `NUMERIC(14, 2)`
    pub const AMOUNT: Precision = Precision {
        integer_digits: 12,
        scale: 2,
    };

    /// Reject values the column would overflow or silently round
    pub fn check(&self, value: Decimal) -> Result<(), ValidationError> {
        if value.normalize().scale() > self.scale {
            return Err(owned_error(
                "too_precise",
                format!("Use at most {} decimal places", self.scale),
            ));
        }
        let limit = Decimal::from(10u64.pow(self.integer_digits));
        if value.abs() >= limit {
            return Err(owned_error(
                "too_large",
                format!("Must be less than {}", limit),
            ));
        }
        Ok(())
    }
}

/// Check a required numeric text field
///
/// Blank input fails with `required`; input that does not read as a number or
/// falls below `bound` fails with `invalid`; input the column cannot hold
/// exactly fails with `too_large` or `too_precise`.
pub fn check_decimal_text(
    value: &str,
    bound: Bound,
    precision: Precision,
    required: &'static str,
    invalid: &'static str,
) -> Result<Decimal, ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", required));
    }
    match parse_decimal_prefix(value) {
        Some(parsed) if bound.admits(parsed) => {
            precision.check(parsed)?;
            Ok(parsed)
        }
        _ => Err(error("invalid_number", invalid)),
    }
}

pub fn validate_positive_gross_weight(value: &str) -> Result<(), ValidationError> {
    check_decimal_text(
        value,
        Bound::Positive,
        Precision::GRAMS,
        "Gross weight is required",
        "Gross weight must be a positive number",
    )
    .map(|_| ())
}

pub fn validate_net_weight(value: &str) -> Result<(), ValidationError> {
    check_decimal_text(
        value,
        Bound::Positive,
        Precision::GRAMS,
        "Net weight is required",
        "Net weight must be a positive number",
    )
    .map(|_| ())
}

pub fn validate_percentage(value: &str) -> Result<(), ValidationError> {
    check_decimal_text(
        value,
        Bound::NonNegative,
        Precision::PERCENTAGE,
        "Percentage is required",
        "Percentage must be 0 or greater",
    )
    .map(|_| ())
}

pub fn validate_fine(value: &str) -> Result<(), ValidationError> {
    check_decimal_text(
        value,
        Bound::NonNegative,
        Precision::AMOUNT,
        "Fine is required",
        "Fine must be 0 or greater",
    )
    .map(|_| ())
}

/// Making charge is optional; blank passes
pub fn validate_making(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    check_decimal_text(
        value,
        Bound::NonNegative,
        Precision::AMOUNT,
        "Making is required",
        "Please enter a valid making amount",
    )
    .map(|_| ())
}

// ============================================================================
// Text fields
// ============================================================================

pub fn validate_item_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Item name is required"));
    }
    if value.chars().count() > 200 {
        return Err(error("too_long", "Name must be less than 200 characters"));
    }
    Ok(())
}

/// Item dates are calendar dates as sent by a date input (`YYYY-MM-DD`)
pub fn validate_item_date(value: &str) -> Result<(), ValidationError> {
    parse_item_date(value).map(|_| ())
}

pub fn parse_item_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error("required", "Date is required"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| error("invalid_date", "Date must be in YYYY-MM-DD format"))
}

pub fn validate_client_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Name is required"));
    }
    if value.chars().count() > 100 {
        return Err(error("too_long", "Name must be less than 100 characters"));
    }
    Ok(())
}

pub fn validate_client_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Phone number is required"));
    }
    if !is_phone_format(value) {
        return Err(error("invalid_phone", "Please enter a valid phone number"));
    }
    Ok(())
}

pub fn validate_onboarding_name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 2 {
        return Err(error("too_short", "Name must be at least 2 characters"));
    }
    if len > 50 {
        return Err(error("too_long", "Name must be less than 50 characters"));
    }
    Ok(())
}

pub fn validate_onboarding_phone(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 10 {
        return Err(error("too_short", "Phone number must be at least 10 digits"));
    }
    if len > 15 {
        return Err(error("too_long", "Phone number must be less than 15 digits"));
    }
    if !is_phone_format(value) {
        return Err(error("invalid_phone", "Invalid phone number format"));
    }
    Ok(())
}

/// Optional leading `+`, then at least one digit, space, dash or parenthesis
pub fn is_phone_format(phone: &str) -> bool {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'))
}

// ============================================================================
// Reference generators
// ============================================================================

/// Random 8-character client code, uniform over `[A-Z0-9]`
pub fn generate_client_id() -> String {
    random_code(CLIENT_ID_ALPHABET, CLIENT_ID_LEN)
}

/// Item reference: `ITEM-<millis since epoch, base36>-<4 random base36 chars>`
pub fn generate_item_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("ITEM-{}-{}", to_base36(millis), random_code(BASE36_DIGITS, 4))
}

fn random_code(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Upper-case base 36 rendering
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

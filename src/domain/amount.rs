//! JSON representation of monetary amounts.
//!
//! Amounts are held as `BigDecimal` and written to JSON as plain numbers.
//! On input both numbers and numeric strings are accepted; only values that
//! pass [`in_range`] may be stored.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::Serializer;
use serde_json::Value;
use std::str::FromStr;

/// Digits allowed before the decimal point.
pub const MAX_INTEGER_DIGITS: i64 = 18;
/// Digits allowed after the decimal point.
pub const MAX_SCALE: i64 = 20;

pub fn serialize<S>(amount: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match amount.to_f64() {
        Some(value) if value.is_finite() => serializer.serialize_f64(value),
        _ => Err(serde::ser::Error::custom(format!(
            "amount {} is not representable as a JSON number",
            amount
        ))),
    }
}

/// Whether `amount` fits the stored precision and still serializes as a
/// finite JSON number.
pub fn in_range(amount: &BigDecimal) -> bool {
    let (mantissa, scale) = amount.as_bigint_and_exponent();
    if scale > MAX_SCALE {
        return false;
    }

    let digits = mantissa.magnitude().to_string().len() as i64;
    let integer_digits = match digits.checked_sub(scale) {
        Some(digits) => digits,
        None => return false,
    };
    if integer_digits > MAX_INTEGER_DIGITS {
        return false;
    }

    amount.to_f64().is_some_and(f64::is_finite)
}

/// Parses a JSON number or numeric string. Returns `None` for anything else.
pub fn parse(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => BigDecimal::from_str(&number.to_string()).ok(),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            BigDecimal::from_str(text).ok()
        }
        _ => None,
    }
}

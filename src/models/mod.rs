// ABOUTME: Typed DTOs for GuruFocus API responses, built as records of optionals
// ABOUTME: Shared numeric coercion tolerating nulls, sentinels, and string-encoded numbers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod dividends;
pub mod estimates;
pub mod financials;
pub mod insider_updates;
pub mod insiders;
pub mod keyratios;
pub mod personal;
pub mod price;
pub mod summary;

pub use dividends::{CurrentDividend, DividendHistory, DividendPayment};
pub use estimates::{AnalystEstimates, EstimatePeriod, GrowthEstimates};
pub use financials::{FinancialPeriod, FinancialStatements};
pub use insider_updates::{InsiderRecord, InsiderSignalPage};
pub use insiders::{InsiderTrade, InsiderTrades};
pub use keyratios::KeyRatios;
pub use personal::ApiUsage;
pub use price::{PricePoint, PriceHistory};
pub use summary::StockSummary;

use crate::errors::{GuruFocusError, GuruFocusResult};
use serde_json::{Map, Value};

/// Parse an optional numeric field.
///
/// The upstream API encodes absent numbers as JSON null, `""`, `"N/A"`, or
/// `"-"`, and present numbers either natively or as strings (sometimes with
/// thousands separators). All absent forms and parse failures map to `None`.
#[must_use]
pub fn parse_optional_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "N/A" || s == "-" {
                return None;
            }
            s.replace(',', "").parse().ok()
        }
        _ => None,
    }
}

/// Parse an optional integer field with the same coercion as
/// [`parse_optional_f64`], truncating fractional values.
#[must_use]
pub fn parse_optional_i64(value: Option<&Value>) -> Option<i64> {
    parse_optional_f64(value).map(|f| f as i64)
}

/// Optional string field; non-strings map to `None`.
pub(crate) fn opt_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

/// Require the top-level response to be a JSON object.
///
/// Field-level faults never fail a parse; this is the only shape check that
/// raises [`GuruFocusError::Validation`].
pub(crate) fn require_object<'a>(
    value: &'a Value,
    what: &str,
) -> GuruFocusResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        GuruFocusError::Validation(format!(
            "expected a JSON object for {what}, got {}",
            json_type_name(value)
        ))
    })
}

/// Index into a column array, coercing the element to a float.
pub(crate) fn column_f64(column: Option<&Value>, index: usize) -> Option<f64> {
    column
        .and_then(Value::as_array)
        .and_then(|arr| arr.get(index))
        .and_then(|v| parse_optional_f64(Some(v)))
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_coercion_accepts_numbers_and_strings() {
        assert_eq!(parse_optional_f64(Some(&json!(12.5))), Some(12.5));
        assert_eq!(parse_optional_f64(Some(&json!("12.5"))), Some(12.5));
        assert_eq!(parse_optional_f64(Some(&json!("1,234.5"))), Some(1234.5));
        assert_eq!(parse_optional_i64(Some(&json!("42"))), Some(42));
        assert_eq!(parse_optional_i64(Some(&json!(41.9))), Some(41));
    }

    #[test]
    fn numeric_coercion_maps_sentinels_to_absent() {
        for sentinel in [json!(null), json!(""), json!("N/A"), json!("-"), json!("abc")] {
            assert_eq!(parse_optional_f64(Some(&sentinel)), None, "{sentinel:?}");
        }
        assert_eq!(parse_optional_f64(None), None);
        assert_eq!(parse_optional_f64(Some(&json!([1]))), None);
    }

    #[test]
    fn require_object_rejects_scalars() {
        assert!(require_object(&json!({"a": 1}), "summary").is_ok());
        let err = require_object(&json!(3), "summary").unwrap_err();
        assert!(matches!(err, GuruFocusError::Validation(msg) if msg.contains("number")));
    }
}

// ABOUTME: Dividend history and current-dividend DTOs
// ABOUTME: Tolerates the several nestings the dividend endpoint uses for its payment list
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{opt_string, parse_optional_f64};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::Value;

/// A single dividend payment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DividendPayment {
    /// Ex-dividend date (YYYY-MM-DD).
    pub ex_date: Option<String>,
    pub record_date: Option<String>,
    pub pay_date: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    /// Payment type, e.g. "Cash Div.".
    pub dividend_type: Option<String>,
}

/// Dividend payment history, most recent first.
#[derive(Debug, Clone, Serialize)]
pub struct DividendHistory {
    pub symbol: String,
    pub payments: Vec<DividendPayment>,
}

impl DividendHistory {
    /// Parse the raw dividend response.
    ///
    /// The payment list arrives either as a bare array or nested under
    /// `dividends` / `data` / the first object value.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let payments = list_payload(data, &["dividends", "data"])
            .iter()
            .filter_map(|item| item.as_object().map(|_| parse_payment(item)))
            .collect();

        Ok(Self {
            symbol: symbol.to_owned(),
            payments,
        })
    }
}

/// Current dividend information: yield, TTM amount, and schedule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CurrentDividend {
    pub symbol: String,
    pub dividends_per_share_ttm: Option<f64>,
    pub dividend_yield: Option<f64>,
    /// 10-year yield range, e.g. "1.2 - 3.5".
    pub dividend_yield_10y_range: Option<String>,
    pub dividend_yield_10y_median: Option<f64>,
    pub next_payment_date: Option<String>,
    pub frequency: Option<String>,
    pub currency: Option<String>,
}

impl CurrentDividend {
    /// Parse the raw current-dividend response.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let root = super::require_object(data, "current dividend")?;

        let next_payment_date =
            opt_string(root.get("Next Dividend Payment Date")).filter(|d| d != "N/A");

        Ok(Self {
            symbol: symbol.trim().to_uppercase(),
            dividends_per_share_ttm: parse_optional_f64(root.get("Dividends per Share (TTM)")),
            dividend_yield: parse_optional_f64(root.get("Dividend Yield %")),
            dividend_yield_10y_range: opt_string(root.get("Dividend Yield % (10y Range)")),
            dividend_yield_10y_median: parse_optional_f64(
                root.get("Dividend Yield % (10y Median)"),
            ),
            next_payment_date,
            frequency: opt_string(root.get("Dividend Frequency")),
            currency: opt_string(root.get("Currency")),
        })
    }
}

/// Locate a list payload: bare array, one of the named keys, or the first
/// array-valued field of the object.
pub(crate) fn list_payload(data: &Value, keys: &[&str]) -> Vec<Value> {
    if let Some(items) = data.as_array() {
        return items.clone();
    }
    if let Some(object) = data.as_object() {
        for key in keys {
            if let Some(items) = object.get(*key).and_then(Value::as_array) {
                if !items.is_empty() {
                    return items.clone();
                }
            }
        }
        for value in object.values() {
            if let Some(items) = value.as_array() {
                return items.clone();
            }
        }
    }
    Vec::new()
}

fn parse_payment(item: &Value) -> DividendPayment {
    DividendPayment {
        ex_date: opt_string(item.get("ex_date")),
        record_date: opt_string(item.get("record_date")),
        pay_date: opt_string(item.get("pay_date")),
        amount: parse_optional_f64(item.get("amount")),
        currency: opt_string(item.get("currency")),
        dividend_type: opt_string(item.get("type")),
    }
}

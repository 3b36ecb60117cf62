// ABOUTME: Per-symbol insider trading DTOs
// ABOUTME: Decodes the {SYMBOL: [trades]} response shape with comma-formatted numerics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{opt_string, parse_optional_f64, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::Value;

/// A single insider transaction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsiderTrade {
    /// Transaction date (YYYY-MM-DD).
    pub trade_date: Option<String>,
    pub insider_name: Option<String>,
    pub insider_title: Option<String>,
    /// Transaction type: "S" (sell), "B"/"P" (buy), etc.
    pub transaction_type: Option<String>,
    pub shares: Option<f64>,
    pub price: Option<f64>,
    /// Total transaction value.
    pub value: Option<f64>,
    pub shares_owned_after: Option<f64>,
    /// Percent change in holdings.
    pub change: Option<f64>,
}

/// Insider trading history for a stock, most recent first.
#[derive(Debug, Clone, Serialize)]
pub struct InsiderTrades {
    pub symbol: String,
    pub trades: Vec<InsiderTrade>,
}

impl InsiderTrades {
    /// Parse the raw insider response, shaped `{"AAPL": [{...}, ...]}`.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let root = require_object(data, "insider trades")?;

        let trades = root
            .get(symbol)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(parse_trade)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            symbol: symbol.to_owned(),
            trades,
        })
    }
}

fn parse_trade(item: &Value) -> InsiderTrade {
    InsiderTrade {
        trade_date: opt_string(item.get("date")),
        insider_name: opt_string(item.get("insider")),
        insider_title: opt_string(item.get("position")),
        transaction_type: opt_string(item.get("type")),
        shares: parse_optional_f64(item.get("trans_share")),
        price: parse_optional_f64(item.get("price")),
        value: parse_optional_f64(item.get("cost")),
        shares_owned_after: parse_optional_f64(item.get("final_share")),
        change: parse_optional_f64(item.get("change")),
    }
}

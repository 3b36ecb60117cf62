// ABOUTME: Market-wide insider activity feed DTOs (updates and executive buy signals)
// ABOUTME: One record shape covers all feeds; signal endpoints add a pagination envelope
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::GuruFocusResult;
use crate::pagination::Page;
use serde::Serialize;
use serde_json::Value;

use super::{opt_string, parse_optional_f64};

/// One row from an insider activity feed.
///
/// The updates feed and the executive buy-signal feeds share most fields;
/// the ones a given feed omits stay absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsiderRecord {
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    pub company: Option<String>,
    /// Insider name; the updates feed calls this `insider`, signals `name`.
    pub insider: Option<String>,
    pub position: Option<String>,
    /// Transaction date (YYYY-MM-DD).
    pub date: Option<String>,
    /// "P" (purchase) or "S" (sell).
    pub transaction_type: Option<String>,
    pub shares: Option<f64>,
    pub shares_change_pct: Option<f64>,
    pub price: Option<f64>,
    /// Total transaction cost, in thousands.
    pub cost: Option<f64>,
    pub final_shares: Option<f64>,
    /// Price change since the insider trade, percent.
    pub change_since_trade_pct: Option<f64>,
    /// SEC filing date.
    pub file_date: Option<String>,
    pub add_date: Option<String>,
}

impl InsiderRecord {
    fn from_item(item: &Value) -> Self {
        Self {
            symbol: opt_string(item.get("symbol")),
            exchange: opt_string(item.get("exchange")),
            company: opt_string(item.get("company")),
            insider: opt_string(item.get("insider")).or_else(|| opt_string(item.get("name"))),
            position: opt_string(item.get("position")),
            date: opt_string(item.get("date")),
            transaction_type: opt_string(item.get("type")),
            shares: parse_optional_f64(item.get("trans_share")),
            shares_change_pct: parse_optional_f64(item.get("shares_change")),
            price: parse_optional_f64(item.get("price"))
                .or_else(|| parse_optional_f64(item.get("trade_price"))),
            cost: parse_optional_f64(item.get("cost")),
            final_shares: parse_optional_f64(item.get("final_share")),
            change_since_trade_pct: parse_optional_f64(item.get("change_from_insider_trade")),
            file_date: opt_string(item.get("file_date")),
            add_date: opt_string(item.get("add_date")),
        }
    }
}

/// One page of an insider feed, with the upstream pagination envelope when
/// the endpoint provides one.
#[derive(Debug, Clone, Serialize)]
pub struct InsiderSignalPage {
    pub records: Vec<InsiderRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
}

impl InsiderSignalPage {
    /// Parse one raw feed page. Accepts both the `{data, current_page,
    /// last_page}` envelope and the bare-array shape of the updates feed.
    pub fn from_api_response(data: &Value) -> GuruFocusResult<Self> {
        let page = Page::from_response(data);
        let records = page
            .items
            .iter()
            .filter(|item| item.is_object())
            .map(InsiderRecord::from_item)
            .collect();

        Ok(Self {
            records,
            current_page: page.current_page,
            last_page: page.last_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_enveloped_signal_page() {
        let data = json!({
            "total": 120,
            "per_page": 50,
            "current_page": 1,
            "last_page": 3,
            "data": [
                {
                    "symbol": "XYZ",
                    "company": "Xyz Corp",
                    "name": "DOE JANE",
                    "position": "CEO",
                    "type": "P",
                    "trans_share": "10,000",
                    "trade_price": "12.50",
                    "cost": 125.0,
                    "change_from_insider_trade": "-3.1",
                },
            ]
        });

        let page = InsiderSignalPage::from_api_response(&data).unwrap();
        assert_eq!(page.current_page, Some(1));
        assert_eq!(page.last_page, Some(3));
        assert_eq!(page.records.len(), 1);
        let record = &page.records[0];
        assert_eq!(record.insider.as_deref(), Some("DOE JANE"));
        assert_eq!(record.shares, Some(10_000.0));
        assert_eq!(record.price, Some(12.5));
        assert_eq!(record.change_since_trade_pct, Some(-3.1));
    }

    #[test]
    fn parses_bare_updates_array() {
        let data = json!([
            {"symbol": "AAPL", "insider": "COOK TIMOTHY D", "type": "S", "price": 198.1},
        ]);
        let page = InsiderSignalPage::from_api_response(&data).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.current_page, None);
        assert_eq!(page.records[0].insider.as_deref(), Some("COOK TIMOTHY D"));
    }
}

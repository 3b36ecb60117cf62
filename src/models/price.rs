// ABOUTME: Historical price DTOs decoding [date, price] pair arrays
// ABOUTME: Normalizes the API's MM-DD-YYYY dates to YYYY-MM-DD
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::parse_optional_f64;
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::Value;

/// A single historical price point.
#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    /// Date in YYYY-MM-DD.
    pub date: String,
    /// Closing price.
    pub price: f64,
}

/// Daily closing-price history, oldest first as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub prices: Vec<PricePoint>,
}

impl PriceHistory {
    /// Parse the raw price response.
    ///
    /// Points arrive as `[date, price]` pairs, either bare or nested under
    /// `prices` / `data` / `price`. Pairs with unparseable prices are
    /// skipped.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let rows = super::dividends::list_payload(data, &["prices", "data", "price"]);

        let prices = rows
            .iter()
            .filter_map(|row| {
                let pair = row.as_array()?;
                let date = pair.first()?.as_str()?;
                let price = parse_optional_f64(pair.get(1))?;
                Some(PricePoint {
                    date: convert_date(date),
                    price,
                })
            })
            .collect();

        Ok(Self {
            symbol: symbol.to_owned(),
            prices,
        })
    }
}

/// Convert MM-DD-YYYY to YYYY-MM-DD; anything else passes through.
fn convert_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [month, day, year] if year.len() == 4 => format!("{year}-{month}-{day}"),
        _ => date.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_pairs_and_converts_dates() {
        let data = json!({"prices": [["01-15-2025", 234.5], ["01-16-2025", "236.1"]]});
        let history = PriceHistory::from_api_response(&data, "AAPL").unwrap();
        assert_eq!(history.prices.len(), 2);
        assert_eq!(history.prices[0].date, "2025-01-15");
        assert_eq!(history.prices[0].price, 234.5);
        assert_eq!(history.prices[1].price, 236.1);
    }

    #[test]
    fn skips_malformed_rows() {
        let data = json!([["01-15-2025", "N/A"], ["01-16-2025"], "junk", ["01-17-2025", 230.0]]);
        let history = PriceHistory::from_api_response(&data, "AAPL").unwrap();
        assert_eq!(history.prices.len(), 1);
        assert_eq!(history.prices[0].date, "2025-01-17");
    }

    #[test]
    fn already_iso_dates_pass_through() {
        assert_eq!(convert_date("2025-01-15"), "2025-01-15");
        assert_eq!(convert_date("garbage"), "garbage");
    }
}

// ABOUTME: Analyst estimate DTOs covering forward periods and long-term growth rates
// ABOUTME: Transposes column-oriented annual and quarterly estimate arrays into period records
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{column_f64, parse_optional_f64, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// Analyst estimates for a single forward period.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EstimatePeriod {
    /// Period in YYYYMM format (e.g. "202609").
    pub period: String,
    pub revenue_estimate: Option<f64>,
    pub ebit_estimate: Option<f64>,
    pub ebitda_estimate: Option<f64>,
    pub net_income_estimate: Option<f64>,
    pub pretax_income_estimate: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub eps_nri_estimate: Option<f64>,
    pub dividend_estimate: Option<f64>,
    pub book_value_per_share_estimate: Option<f64>,
    pub operating_cash_flow_per_share_estimate: Option<f64>,
    pub roa_estimate: Option<f64>,
    pub roe_estimate: Option<f64>,
    pub gross_margin_estimate: Option<f64>,
    pub pe_ttm_estimate: Option<f64>,
}

/// Consensus long-term growth estimates, in percent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GrowthEstimates {
    pub long_term_growth_rate: Option<f64>,
    pub long_term_revenue_growth_rate: Option<f64>,
    pub eps_growth: Option<f64>,
    pub eps_nri_growth: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub ebit_growth: Option<f64>,
    pub ebitda_growth: Option<f64>,
    pub dividend_growth: Option<f64>,
    pub net_income_growth: Option<f64>,
    pub book_value_growth: Option<f64>,
}

/// Analyst estimates from the analyst_estimate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnalystEstimates {
    pub symbol: String,
    pub annual_estimates: Vec<EstimatePeriod>,
    pub quarterly_estimates: Vec<EstimatePeriod>,
    pub growth_estimates: GrowthEstimates,
}

impl AnalystEstimates {
    /// Parse the raw analyst estimates response.
    ///
    /// Both `annual` and `quarterly` sections carry parallel arrays keyed by
    /// metric with a `date` array naming the periods. Growth rates are
    /// scalars on the annual section, falling back to quarterly.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let root = require_object(data, "analyst estimates")?;

        let empty = Map::new();
        let annual = root.get("annual").and_then(Value::as_object).unwrap_or(&empty);
        let quarterly = root
            .get("quarterly")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let growth_source = if annual.is_empty() { quarterly } else { annual };
        let g = |key: &str| parse_optional_f64(growth_source.get(key));

        Ok(Self {
            symbol: symbol.to_owned(),
            annual_estimates: parse_estimate_columns(annual),
            quarterly_estimates: parse_estimate_columns(quarterly),
            growth_estimates: GrowthEstimates {
                long_term_growth_rate: g("long_term_growth_rate_mean"),
                long_term_revenue_growth_rate: g("long_term_revenue_growth_rate_mean"),
                eps_growth: g("future_per_share_eps_estimate_growth"),
                eps_nri_growth: g("future_eps_nri_estimate_growth"),
                revenue_growth: g("future_revenue_estimate_growth"),
                ebit_growth: g("future_ebit_estimate_growth"),
                ebitda_growth: g("future_ebitda_estimate_growth"),
                dividend_growth: g("future_dividend_estimate_growth"),
                net_income_growth: g("future_net_income_estimate_growth"),
                book_value_growth: g("future_book_value_per_share_estimate_growth"),
            },
        })
    }
}

fn parse_estimate_columns(data: &Map<String, Value>) -> Vec<EstimatePeriod> {
    let Some(dates) = data.get("date").and_then(Value::as_array) else {
        return Vec::new();
    };

    let col = |key: &str, i: usize| column_f64(data.get(key), i);

    dates
        .iter()
        .enumerate()
        .map(|(i, date)| EstimatePeriod {
            period: date.as_str().map_or_else(|| date.to_string(), str::to_owned),
            revenue_estimate: col("revenue_estimate", i),
            ebit_estimate: col("ebit_estimate", i),
            ebitda_estimate: col("ebitda_estimate", i),
            net_income_estimate: col("net_income_estimate", i),
            pretax_income_estimate: col("pretax_income_estimate", i),
            eps_estimate: col("per_share_eps_estimate", i),
            eps_nri_estimate: col("eps_nri_estimate", i),
            dividend_estimate: col("dividend_estimate", i),
            book_value_per_share_estimate: col("book_value_per_share_estimate", i),
            operating_cash_flow_per_share_estimate: col(
                "operating_cash_flow_per_share_estimate",
                i,
            ),
            roa_estimate: col("roa_estimate", i),
            roe_estimate: col("roe_estimate", i),
            gross_margin_estimate: col("gross_margin_estimate", i),
            pe_ttm_estimate: col("pettm_estimate", i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_annual_columns_and_growth() {
        let data = json!({
            "annual": {
                "date": ["202509", "202609"],
                "revenue_estimate": ["416,000", "445,000"],
                "per_share_eps_estimate": [7.1, 7.9],
                "long_term_growth_rate_mean": "9.5",
            },
            "quarterly": {},
        });

        let estimates = AnalystEstimates::from_api_response(&data, "AAPL").unwrap();
        assert_eq!(estimates.annual_estimates.len(), 2);
        assert_eq!(estimates.annual_estimates[0].period, "202509");
        assert_eq!(estimates.annual_estimates[0].revenue_estimate, Some(416_000.0));
        assert_eq!(estimates.annual_estimates[1].eps_estimate, Some(7.9));
        assert!(estimates.quarterly_estimates.is_empty());
        assert_eq!(estimates.growth_estimates.long_term_growth_rate, Some(9.5));
    }
}

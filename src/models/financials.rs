// ABOUTME: Financial statement DTOs parsed from column-oriented endpoint data
// ABOUTME: Transposes parallel metric arrays into per-period records, most recent first
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{column_f64, opt_string, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// Financial data for a single fiscal period (annual or quarterly).
///
/// Monetary values are in the company's reporting currency, typically
/// millions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialPeriod {
    /// Fiscal period, e.g. "2024-09" or "TTM".
    pub period: String,
    pub is_preliminary: bool,

    // Per-share data
    pub revenue_per_share: Option<f64>,
    pub ebitda_per_share: Option<f64>,
    pub ebit_per_share: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub eps_without_nri: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub operating_cf_per_share: Option<f64>,
    pub dividends_per_share: Option<f64>,
    pub book_value_per_share: Option<f64>,

    // Income statement
    pub revenue: Option<f64>,
    pub cost_of_goods_sold: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub pretax_income: Option<f64>,
    pub net_income: Option<f64>,
    pub ebitda: Option<f64>,

    // Balance sheet
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub total_current_liabilities: Option<f64>,

    // Cash flow
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditures: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub dividends_paid: Option<f64>,

    // Margins
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
}

/// Historical financial statements for a company.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialStatements {
    pub symbol: String,
    pub currency: Option<String>,
    /// "annual" or "quarterly".
    pub period_type: String,
    pub report_frequency: Option<String>,
    /// Periods ordered most recent first.
    pub periods: Vec<FinancialPeriod>,
}

impl FinancialStatements {
    /// Parse the raw financials response.
    ///
    /// The upstream shape is `{financials: {financial_template_parameters,
    /// annuals | quarterly: {"Fiscal Year": [...], income_statement: {...}, ...}}}`
    /// with one parallel array per metric.
    pub fn from_api_response(
        data: &Value,
        symbol: &str,
        period_type: &str,
    ) -> GuruFocusResult<Self> {
        let root = require_object(data, "financial statements")?;
        let financials = root
            .get("financials")
            .and_then(Value::as_object)
            .unwrap_or(root);

        let params = financials
            .get("financial_template_parameters")
            .and_then(Value::as_object);

        let period_key = if period_type == "annual" {
            "annuals"
        } else {
            "quarterly"
        };
        let empty = Map::new();
        let period_data = financials
            .get(period_key)
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut periods = parse_periods(period_data);
        // The API returns oldest first
        periods.reverse();

        Ok(Self {
            symbol: symbol.to_owned(),
            currency: params.and_then(|p| opt_string(p.get("currency"))),
            period_type: period_type.to_owned(),
            report_frequency: params
                .and_then(|p| opt_string(p.get("financial_report_frequency"))),
            periods,
        })
    }
}

fn parse_periods(data: &Map<String, Value>) -> Vec<FinancialPeriod> {
    let Some(fiscal_years) = data.get("Fiscal Year").and_then(Value::as_array) else {
        return Vec::new();
    };

    let per_share = data.get("per_share_data_array").and_then(Value::as_object);
    let income = data.get("income_statement").and_then(Value::as_object);
    let balance = data.get("balance_sheet").and_then(Value::as_object);
    let cashflow = data.get("cashflow_statement").and_then(Value::as_object);
    let ratios = data.get("common_size_ratios").and_then(Value::as_object);
    let preliminary = data.get("Preliminary").and_then(Value::as_array);

    let col = |section: Option<&Map<String, Value>>, key: &str, i: usize| {
        column_f64(section.and_then(|s| s.get(key)), i)
    };

    fiscal_years
        .iter()
        .enumerate()
        .map(|(i, period)| FinancialPeriod {
            period: period
                .as_str()
                .map_or_else(|| period.to_string(), str::to_owned),
            is_preliminary: preliminary
                .and_then(|p| p.get(i))
                .is_some_and(|v| v.as_i64().unwrap_or(0) != 0 || v.as_bool().unwrap_or(false)),
            revenue_per_share: col(per_share, "Revenue per Share", i),
            ebitda_per_share: col(per_share, "EBITDA per Share", i),
            ebit_per_share: col(per_share, "EBIT per Share", i),
            eps_diluted: col(per_share, "Earnings per Share (Diluted)", i),
            eps_without_nri: col(per_share, "EPS without NRI", i),
            fcf_per_share: col(per_share, "Free Cash Flow per Share", i),
            operating_cf_per_share: col(per_share, "Operating Cash Flow per Share", i),
            dividends_per_share: col(per_share, "Dividends per Share", i),
            book_value_per_share: col(per_share, "Book Value per Share", i),
            revenue: col(income, "Revenue", i),
            cost_of_goods_sold: col(income, "Cost of Goods Sold", i),
            gross_profit: col(income, "Gross Profit", i),
            operating_income: col(income, "Operating Income", i),
            pretax_income: col(income, "Pretax Income", i),
            net_income: col(income, "Net Income", i),
            ebitda: col(income, "EBITDA", i),
            total_assets: col(balance, "Total Assets", i),
            total_liabilities: col(balance, "Total Liabilities", i),
            total_equity: col(balance, "Total Stockholders Equity", i),
            total_debt: col(balance, "Total Debt", i),
            cash_and_equivalents: col(balance, "Cash and Cash Equivalents", i),
            total_current_assets: col(balance, "Total Current Assets", i),
            total_current_liabilities: col(balance, "Total Current Liabilities", i),
            operating_cash_flow: col(cashflow, "Cash Flow from Operations", i),
            capital_expenditures: col(cashflow, "Purchase Of Property, Plant, Equipment", i),
            free_cash_flow: col(cashflow, "Free Cash Flow", i),
            dividends_paid: col(cashflow, "Common Stock Dividends Paid", i),
            gross_margin: col(ratios, "Gross Margin", i),
            operating_margin: col(ratios, "Operating Margin", i),
            net_margin: col(ratios, "Net Margin", i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transposes_columns_and_reverses_order() {
        let data = json!({
            "financials": {
                "financial_template_parameters": {"currency": "USD"},
                "annuals": {
                    "Fiscal Year": ["2022-09", "2023-09", "TTM"],
                    "Preliminary": [0, 0, 1],
                    "income_statement": {
                        "Revenue": ["394,328", "383,285", "400,000"],
                        "Net Income": [99803, 96995, "N/A"],
                    },
                    "per_share_data_array": {
                        "Earnings per Share (Diluted)": [6.11, 6.13, 6.6],
                    },
                }
            }
        });

        let statements = FinancialStatements::from_api_response(&data, "AAPL", "annual").unwrap();
        assert_eq!(statements.currency.as_deref(), Some("USD"));
        assert_eq!(statements.periods.len(), 3);
        // Most recent (TTM) first after the reverse
        assert_eq!(statements.periods[0].period, "TTM");
        assert!(statements.periods[0].is_preliminary);
        assert_eq!(statements.periods[0].revenue, Some(400_000.0));
        assert_eq!(statements.periods[0].net_income, None);
        assert_eq!(statements.periods[2].revenue, Some(394_328.0));
        assert_eq!(statements.periods[2].eps_diluted, Some(6.11));
    }

    #[test]
    fn missing_period_section_yields_no_periods() {
        let statements =
            FinancialStatements::from_api_response(&json!({"financials": {}}), "AAPL", "quarterly")
                .unwrap();
        assert!(statements.periods.is_empty());
        assert_eq!(statements.period_type, "quarterly");
    }
}

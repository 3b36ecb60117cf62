// ABOUTME: Key financial ratio DTOs grouped by profitability, liquidity, solvency, and growth
// ABOUTME: Parses the keyratios endpoint's named sections into records of optionals
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_optional_f64, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// Profitability ratios and margins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfitabilityRatios {
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub roic: Option<f64>,
    pub roce: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub ebitda_margin: Option<f64>,
}

/// Short-term liquidity ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LiquidityRatios {
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub cash_ratio: Option<f64>,
}

/// Leverage and solvency ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SolvencyRatios {
    pub debt_to_equity: Option<f64>,
    pub debt_to_asset: Option<f64>,
    pub debt_to_ebitda: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub equity_to_asset: Option<f64>,
}

/// Asset and working-capital efficiency ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EfficiencyRatios {
    pub asset_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub receivables_turnover: Option<f64>,
    pub days_sales_outstanding: Option<f64>,
    pub days_inventory: Option<f64>,
    pub days_payable: Option<f64>,
    pub cash_conversion_cycle: Option<f64>,
}

/// Per-share growth rates over standard lookback windows, in percent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GrowthRatios {
    pub revenue_growth_1y: Option<f64>,
    pub revenue_growth_3y: Option<f64>,
    pub revenue_growth_5y: Option<f64>,
    pub revenue_growth_10y: Option<f64>,
    pub eps_growth_1y: Option<f64>,
    pub eps_growth_3y: Option<f64>,
    pub eps_growth_5y: Option<f64>,
    pub eps_growth_10y: Option<f64>,
    pub fcf_growth_1y: Option<f64>,
    pub fcf_growth_3y: Option<f64>,
    pub fcf_growth_5y: Option<f64>,
}

/// Trailing per-share fundamentals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerShareData {
    pub eps_ttm: Option<f64>,
    pub eps_without_nri: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub tangible_book_per_share: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub dividends_per_share_ttm: Option<f64>,
}

/// Market valuation ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValuationRatios {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub ev_revenue: Option<f64>,
    pub price_to_fcf: Option<f64>,
}

/// Comprehensive key ratios from the keyratios endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRatios {
    pub symbol: String,
    pub profitability: ProfitabilityRatios,
    pub liquidity: LiquidityRatios,
    pub solvency: SolvencyRatios,
    pub efficiency: EfficiencyRatios,
    pub growth: GrowthRatios,
    pub per_share: PerShareData,
    pub valuation: ValuationRatios,
}

impl KeyRatios {
    /// Parse the raw keyratios response.
    ///
    /// The upstream groups metrics under named sections ("Fundamental",
    /// "Profitability", "Growth", "Valuation Ratio", "Dividends"); each
    /// metric key is a display label.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let root = require_object(data, "key ratios")?;

        let empty = Map::new();
        let fundamental = section(root, "Fundamental", &empty);
        let profitability_section = section(root, "Profitability", &empty);
        let growth_section = section(root, "Growth", &empty);
        let valuation_section = section(root, "Valuation Ratio", &empty);
        let dividends_section = section(root, "Dividends", &empty);

        let f = |m: &Map<String, Value>, key: &str| parse_optional_f64(m.get(key));

        Ok(Self {
            symbol: symbol.to_owned(),
            profitability: ProfitabilityRatios {
                roe: f(fundamental, "ROE %"),
                roa: f(fundamental, "ROA %"),
                roic: f(fundamental, "ROIC %"),
                roce: f(fundamental, "ROCE %"),
                gross_margin: f(profitability_section, "Gross Margin %"),
                operating_margin: f(profitability_section, "Operating Margin %"),
                net_margin: f(profitability_section, "Net Margin %"),
                fcf_margin: f(profitability_section, "FCF Margin %"),
                ebitda_margin: f(profitability_section, "EBITDA Margin %"),
            },
            liquidity: LiquidityRatios {
                current_ratio: f(fundamental, "Current Ratio"),
                quick_ratio: f(fundamental, "Quick Ratio"),
                cash_ratio: f(fundamental, "Cash Ratio"),
            },
            solvency: SolvencyRatios {
                debt_to_equity: f(fundamental, "Debt-to-Equity"),
                debt_to_asset: f(fundamental, "Debt-to-Asset"),
                debt_to_ebitda: f(fundamental, "Debt-to-EBITDA"),
                interest_coverage: f(fundamental, "Interest Coverage"),
                equity_to_asset: f(fundamental, "Equity-to-Asset"),
            },
            efficiency: EfficiencyRatios {
                asset_turnover: f(fundamental, "Asset Turnover"),
                inventory_turnover: f(fundamental, "Inventory Turnover"),
                receivables_turnover: f(fundamental, "Receivables Turnover"),
                days_sales_outstanding: f(fundamental, "Days Sales Outstanding"),
                days_inventory: f(fundamental, "Days Inventory"),
                days_payable: f(fundamental, "Days Payable"),
                cash_conversion_cycle: f(fundamental, "Cash Conversion Cycle"),
            },
            growth: GrowthRatios {
                revenue_growth_1y: f(growth_section, "1-Year Revenue Growth Rate (Per Share)"),
                revenue_growth_3y: f(growth_section, "3-Year Revenue Growth Rate (Per Share)"),
                revenue_growth_5y: f(growth_section, "5-Year Revenue Growth Rate (Per Share)"),
                revenue_growth_10y: f(growth_section, "10-Year Revenue Growth Rate (Per Share)"),
                eps_growth_1y: f(growth_section, "1-Year EPS without NRI Growth Rate"),
                eps_growth_3y: f(growth_section, "3-Year EPS without NRI Growth Rate"),
                eps_growth_5y: f(growth_section, "5-Year EPS without NRI Growth Rate"),
                eps_growth_10y: f(growth_section, "10-Year EPS without NRI Growth Rate"),
                fcf_growth_1y: f(growth_section, "1-Year FCF Growth Rate (Per Share)"),
                fcf_growth_3y: f(growth_section, "3-Year FCF Growth Rate (Per Share)"),
                fcf_growth_5y: f(growth_section, "5-Year FCF Growth Rate (Per Share)"),
            },
            per_share: PerShareData {
                eps_ttm: f(fundamental, "EPS (TTM)"),
                eps_without_nri: f(fundamental, "EPS without NRI"),
                book_value_per_share: f(fundamental, "Book Value per Share"),
                tangible_book_per_share: f(valuation_section, "Tangible Book per Share"),
                fcf_per_share: f(fundamental, "Trailing 12-Month FCF per Share"),
                dividends_per_share_ttm: f(dividends_section, "Dividends per Share (TTM)"),
            },
            valuation: ValuationRatios {
                pe_ratio: f(valuation_section, "PE Ratio"),
                forward_pe: f(valuation_section, "Forward PE Ratio"),
                pb_ratio: f(valuation_section, "PB Ratio"),
                ps_ratio: f(valuation_section, "PS Ratio"),
                peg_ratio: f(valuation_section, "PEG Ratio"),
                ev_ebitda: f(valuation_section, "EV-to-EBITDA"),
                ev_revenue: f(valuation_section, "EV-to-Revenue"),
                price_to_fcf: f(valuation_section, "Price-to-Free-Cash-Flow"),
            },
        })
    }
}

fn section<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    empty: &'a Map<String, Value>,
) -> &'a Map<String, Value> {
    parent.get(key).and_then(Value::as_object).unwrap_or(empty)
}

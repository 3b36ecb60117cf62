// ABOUTME: Typed stock summary DTO covering general info, quality scores, and valuation
// ABOUTME: Parses the summary endpoint's nested sections into records of optionals
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{opt_string, parse_optional_f64, parse_optional_i64, require_object};
use crate::errors::GuruFocusResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// General company information.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneralInfo {
    pub company_name: Option<String>,
    pub current_price: Option<f64>,
    pub currency: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub subindustry: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    /// Market capitalization in millions.
    pub market_cap: Option<f64>,
}

/// Current price and change information.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceInfo {
    pub current: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
}

/// GuruFocus quality scores and rankings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityScores {
    /// Overall GF Score (0-100).
    pub gf_score: Option<i64>,
    /// Financial strength rank (0-10).
    pub financial_strength: Option<i64>,
    /// Profitability rank (0-10).
    pub profitability_rank: Option<i64>,
    /// Growth rank (0-10).
    pub growth_rank: Option<i64>,
    /// GF Value rank (0-10).
    pub gf_value_rank: Option<i64>,
    /// Momentum rank (0-10).
    pub momentum_rank: Option<i64>,
    pub risk_assessment: Option<String>,
    /// Valuation status (e.g. "Modestly Overvalued").
    pub valuation_status: Option<String>,
}

/// Valuation metrics from the chart section and simple company-data ratios.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValuationMetrics {
    /// GuruFocus intrinsic value.
    pub gf_value: Option<f64>,
    pub earnings_power_value: Option<f64>,
    pub tangible_book: Option<f64>,
    pub projected_fcf: Option<f64>,
    pub dcf_fcf_based: Option<f64>,
    pub dcf_earnings_based: Option<f64>,
    pub median_ps_value: Option<f64>,
    pub graham_number: Option<f64>,
    pub peter_lynch_value: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    /// Discount to GF Value in percent, positive when the price trades below it.
    pub discount_to_gf_value: Option<f64>,
}

/// Historical range for a single ratio.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatioHistory {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub med: Option<f64>,
}

/// Industry comparison data for a single ratio.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatioIndustry {
    pub global_rank: Option<i64>,
    pub indu_med: Option<f64>,
    pub indu_tot: Option<i64>,
}

/// One financial ratio with history and industry comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatioValue {
    pub value: Option<f64>,
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub his: Option<RatioHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indu: Option<RatioIndustry>,
}

/// Key financial ratios from the summary's ratio section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialRatios {
    pub pe_ttm: Option<RatioValue>,
    pub forward_pe: Option<RatioValue>,
    pub pb_ratio: Option<RatioValue>,
    pub ps_ratio: Option<RatioValue>,
    pub peg_ratio: Option<RatioValue>,
    pub ev_ebitda: Option<RatioValue>,
    pub current_ratio: Option<RatioValue>,
    pub quick_ratio: Option<RatioValue>,
    pub cash_ratio: Option<RatioValue>,
    pub piotroski_score: Option<RatioValue>,
    pub roe: Option<RatioValue>,
    pub roa: Option<RatioValue>,
    pub roic: Option<RatioValue>,
}

/// Institutional and guru activity summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstitutionalActivity {
    pub guru_buys_pct: Option<f64>,
    pub guru_sells_pct: Option<f64>,
    pub guru_holds_pct: Option<f64>,
    pub fund_buys_pct: Option<f64>,
    pub fund_sells_pct: Option<f64>,
    pub etf_buys_pct: Option<f64>,
    pub etf_sells_pct: Option<f64>,
}

/// Comprehensive stock summary from the summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub symbol: String,
    pub general: GeneralInfo,
    pub quality: QualityScores,
    pub valuation: ValuationMetrics,
    pub ratios: FinancialRatios,
    pub institutional: InstitutionalActivity,
    pub price: PriceInfo,
}

impl StockSummary {
    /// Parse the raw summary response.
    ///
    /// The upstream shape is `{summary: {general, chart, ratio, company_data}}`;
    /// a response missing the outer wrapper is treated as the inner object.
    /// Field-level faults become absent fields; only a non-object top level
    /// fails the parse.
    pub fn from_api_response(data: &Value, symbol: &str) -> GuruFocusResult<Self> {
        let root = require_object(data, "stock summary")?;
        let summary = root
            .get("summary")
            .and_then(Value::as_object)
            .unwrap_or(root);

        let empty = Map::new();
        let general_data = section(summary, "general", &empty);
        let chart_data = section(summary, "chart", &empty);
        let ratio_data = section(summary, "ratio", &empty);
        let company_data = section(summary, "company_data", &empty);

        let current_price = parse_optional_f64(general_data.get("price"))
            .or_else(|| parse_optional_f64(company_data.get("price")));

        let general = GeneralInfo {
            company_name: opt_string(general_data.get("company"))
                .or_else(|| opt_string(company_data.get("company"))),
            current_price,
            currency: opt_string(general_data.get("currency"))
                .or_else(|| opt_string(company_data.get("currency"))),
            country: opt_string(general_data.get("country"))
                .or_else(|| opt_string(company_data.get("country"))),
            exchange: opt_string(company_data.get("exchange")),
            sector: opt_string(general_data.get("sector"))
                .or_else(|| opt_string(company_data.get("sector"))),
            industry: opt_string(general_data.get("group"))
                .or_else(|| opt_string(company_data.get("industry"))),
            subindustry: opt_string(general_data.get("subindustry")),
            description: opt_string(general_data.get("desc")),
            short_description: opt_string(general_data.get("short_desc")),
            market_cap: parse_optional_f64(company_data.get("mktcap")),
        };

        let quality = QualityScores {
            gf_score: parse_optional_i64(general_data.get("gf_score")),
            financial_strength: parse_optional_i64(general_data.get("rank_financial_strength")),
            profitability_rank: parse_optional_i64(general_data.get("rank_profitability")),
            growth_rank: parse_optional_i64(general_data.get("rank_growth")),
            gf_value_rank: parse_optional_i64(general_data.get("rank_gf_value")),
            momentum_rank: parse_optional_i64(general_data.get("rank_momentum")),
            risk_assessment: opt_string(general_data.get("risk_assessment")),
            valuation_status: opt_string(general_data.get("gf_valuation")),
        };

        let gf_value = parse_optional_f64(chart_data.get("GF Value"));
        let discount_to_gf_value = match (gf_value, current_price) {
            (Some(gf), Some(price)) if gf > 0.0 => {
                Some(((gf - price) / gf * 100.0 * 100.0).round() / 100.0)
            }
            _ => None,
        };

        let valuation = ValuationMetrics {
            gf_value,
            earnings_power_value: parse_optional_f64(chart_data.get("Earnings Power Value")),
            tangible_book: parse_optional_f64(chart_data.get("Tangible Book")),
            projected_fcf: parse_optional_f64(chart_data.get("Projected FCF")),
            dcf_fcf_based: parse_optional_f64(chart_data.get("DCF (FCF Based)")),
            dcf_earnings_based: parse_optional_f64(chart_data.get("DCF (Earnings Based)")),
            median_ps_value: parse_optional_f64(chart_data.get("Median P/S Value")),
            graham_number: parse_optional_f64(chart_data.get("Graham Number")),
            peter_lynch_value: parse_optional_f64(chart_data.get("Peter Lynch Value")),
            pe_ratio: parse_optional_f64(company_data.get("pe")),
            pb_ratio: parse_optional_f64(company_data.get("pb")),
            ps_ratio: parse_optional_f64(company_data.get("ps")),
            peg_ratio: parse_optional_f64(company_data.get("peg")),
            ev_ebitda: parse_optional_f64(company_data.get("ev2ebitda")),
            discount_to_gf_value,
        };

        let ratios = FinancialRatios {
            pe_ttm: parse_ratio(ratio_data.get("P/E(ttm)")),
            forward_pe: parse_ratio(ratio_data.get("Forward P/E")),
            pb_ratio: parse_ratio(ratio_data.get("P/B")),
            ps_ratio: parse_ratio(ratio_data.get("P/S")),
            peg_ratio: parse_ratio(ratio_data.get("PEG")),
            ev_ebitda: parse_ratio(ratio_data.get("EV-to-EBITDA")),
            current_ratio: parse_ratio(ratio_data.get("Current Ratio")),
            quick_ratio: parse_ratio(ratio_data.get("Quick Ratio")),
            cash_ratio: parse_ratio(ratio_data.get("Cash Ratio")),
            piotroski_score: parse_ratio(ratio_data.get("F-Score")),
            roe: parse_ratio(ratio_data.get("ROE (%)")),
            roa: parse_ratio(ratio_data.get("ROA (%)")),
            roic: parse_ratio(ratio_data.get("ROIC (%)")),
        };

        let institutional = InstitutionalActivity {
            guru_buys_pct: parse_optional_f64(
                general_data.get("percentage_of_premium_guru_buys"),
            ),
            guru_sells_pct: parse_optional_f64(
                general_data.get("percentage_of_premium_guru_sells"),
            ),
            guru_holds_pct: parse_optional_f64(
                general_data.get("percentage_of_premium_guru_holds"),
            ),
            fund_buys_pct: parse_optional_f64(general_data.get("percentage_of_mutual_fund_buys")),
            fund_sells_pct: parse_optional_f64(
                general_data.get("percentage_of_mutual_fund_sells"),
            ),
            etf_buys_pct: parse_optional_f64(general_data.get("percentage_of_etf_buys")),
            etf_sells_pct: parse_optional_f64(general_data.get("percentage_of_etf_sells")),
        };

        let price = PriceInfo {
            current: current_price,
            change: parse_optional_f64(company_data.get("p_change")),
            change_pct: parse_optional_f64(company_data.get("p_pct_change")),
        };

        Ok(Self {
            symbol: symbol.to_owned(),
            general,
            quality,
            valuation,
            ratios,
            institutional,
            price,
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

fn parse_ratio(data: Option<&Value>) -> Option<RatioValue> {
    let data = data?.as_object()?;

    let his = data.get("his").and_then(Value::as_object).map(|his| RatioHistory {
        low: parse_optional_f64(his.get("low")),
        high: parse_optional_f64(his.get("high")),
        med: parse_optional_f64(his.get("med")),
    });

    let indu = data.get("indu").and_then(Value::as_object).map(|indu| RatioIndustry {
        global_rank: parse_optional_i64(indu.get("global_rank")),
        indu_med: parse_optional_f64(indu.get("indu_med")),
        indu_tot: parse_optional_i64(indu.get("indu_tot")),
    });

    Some(RatioValue {
        value: parse_optional_f64(data.get("value")),
        status: parse_optional_i64(data.get("status")),
        his,
        indu,
    })
}

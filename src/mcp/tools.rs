// ABOUTME: MCP tool registry: definitions with JSON schemas and execution against the client
// ABOUTME: One tool per endpoint family plus cache and rate-limit administration tools
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::client::GuruFocusClient;
use crate::endpoints::insiders::{InsiderSignal, UpdatesFilter};
use crate::endpoints::stocks::PeriodType;
use crate::errors::{GuruFocusError, GuruFocusResult};
use serde::Serialize;
use serde_json::{json, Value};

/// A tool advertised through `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Stock ticker symbol, e.g. AAPL or XTER:DAI"
            },
            "bypass_cache": {
                "type": "boolean",
                "description": "Skip the cache and fetch fresh data",
                "default": false
            }
        },
        "required": ["symbol"]
    })
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Every tool this server advertises.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "get_stock_summary",
            description: "Comprehensive stock summary: company info, price, valuation, GF scores",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_stock_quote",
            description: "Real-time quote for a stock",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_key_ratios",
            description: "Key financial ratios: profitability, liquidity, solvency, growth",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_financials",
            description: "Historical financial statements (annual or quarterly)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string", "description": "Stock ticker symbol"},
                    "period_type": {
                        "type": "string",
                        "enum": ["annual", "quarterly"],
                        "default": "annual"
                    },
                    "bypass_cache": {"type": "boolean", "default": false}
                },
                "required": ["symbol"]
            }),
        },
        ToolDef {
            name: "get_analyst_estimates",
            description: "Analyst EPS and revenue estimates with long-term growth rates",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_dividend_history",
            description: "Historical dividend payments",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_current_dividend",
            description: "Current dividend yield, TTM amount, and payment schedule",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_price_history",
            description: "Daily closing-price history",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_insider_trades",
            description: "Insider transactions for a stock",
            input_schema: symbol_schema(),
        },
        ToolDef {
            name: "get_insider_updates",
            description: "Market-wide insider transaction updates as new SEC filings arrive",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page": {"type": "integer", "minimum": 1, "default": 1},
                    "date": {"type": "string", "description": "Transaction date filter (YYYYMMDD)"},
                    "region": {"type": "string"},
                    "bypass_cache": {"type": "boolean", "default": false}
                }
            }),
        },
        ToolDef {
            name: "get_insider_signals",
            description: "Executive buy signals: CEO, CFO, cluster, double-down, triple-down buys",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "signal": {
                        "type": "string",
                        "enum": ["ceo_buys", "cfo_buys", "cluster_buys", "double_buys", "triple_buys"]
                    },
                    "page": {"type": "integer", "minimum": 1, "default": 1},
                    "within_days": {"type": "integer", "minimum": 1},
                    "bypass_cache": {"type": "boolean", "default": false}
                },
                "required": ["signal"]
            }),
        },
        ToolDef {
            name: "get_api_usage",
            description: "Upstream API quota usage; also syncs the local usage estimate",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "bypass_cache": {"type": "boolean", "default": false}
                }
            }),
        },
        ToolDef {
            name: "get_usage_estimate",
            description: "Local estimate of remaining API quota, no upstream call",
            input_schema: empty_schema(),
        },
        ToolDef {
            name: "get_cache_stats",
            description: "Cache hit/miss statistics and storage usage",
            input_schema: empty_schema(),
        },
        ToolDef {
            name: "invalidate_symbol_cache",
            description: "Drop every cached entry for a symbol (e.g. after earnings)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": {"type": "string", "description": "Stock ticker symbol"}
                },
                "required": ["symbol"]
            }),
        },
        ToolDef {
            name: "get_rate_limit_stats",
            description: "Token bucket state and daily request counters",
            input_schema: empty_schema(),
        },
    ]
}

fn require_symbol(args: &Value) -> GuruFocusResult<String> {
    args.get("symbol")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| GuruFocusError::Validation("missing required argument: symbol".into()))
}

fn bypass(args: &Value) -> bool {
    args.get("bypass_cache").and_then(Value::as_bool).unwrap_or(false)
}

fn page(args: &Value) -> u32 {
    args.get("page").and_then(Value::as_u64).map_or(1, |p| p.max(1) as u32)
}

fn to_value<T: Serialize>(value: &T) -> GuruFocusResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| GuruFocusError::Validation(format!("result serialization failed: {e}")))
}

/// Execute one tool call against the client.
pub async fn call_tool(
    client: &GuruFocusClient,
    name: &str,
    args: &Value,
) -> GuruFocusResult<Value> {
    match name {
        "get_stock_summary" => {
            let summary = client
                .stocks()
                .get_summary(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&summary)
        }
        "get_stock_quote" => {
            client
                .stocks()
                .get_quote_raw(&require_symbol(args)?, bypass(args))
                .await
        }
        "get_key_ratios" => {
            let ratios = client
                .stocks()
                .get_keyratios(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&ratios)
        }
        "get_financials" => {
            let period_type = match args.get("period_type").and_then(Value::as_str) {
                Some("quarterly") => PeriodType::Quarterly,
                _ => PeriodType::Annual,
            };
            let financials = client
                .stocks()
                .get_financials(&require_symbol(args)?, period_type, bypass(args))
                .await?;
            to_value(&financials)
        }
        "get_analyst_estimates" => {
            let estimates = client
                .stocks()
                .get_analyst_estimates(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&estimates)
        }
        "get_dividend_history" => {
            let dividends = client
                .stocks()
                .get_dividends(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&dividends)
        }
        "get_current_dividend" => {
            let current = client
                .stocks()
                .get_current_dividend(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&current)
        }
        "get_price_history" => {
            let prices = client
                .stocks()
                .get_price_history(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&prices)
        }
        "get_insider_trades" => {
            let trades = client
                .stocks()
                .get_insider_trades(&require_symbol(args)?, bypass(args))
                .await?;
            to_value(&trades)
        }
        "get_insider_updates" => {
            let filter = UpdatesFilter {
                date: args.get("date").and_then(Value::as_str).map(str::to_owned),
                region: args.get("region").and_then(Value::as_str).map(str::to_owned),
                ..UpdatesFilter::default()
            };
            let updates = client
                .insiders()
                .get_updates(page(args), &filter, bypass(args))
                .await?;
            to_value(&updates)
        }
        "get_insider_signals" => {
            let signal = match args.get("signal").and_then(Value::as_str) {
                Some("ceo_buys") => InsiderSignal::CeoBuys,
                Some("cfo_buys") => InsiderSignal::CfoBuys,
                Some("cluster_buys") => InsiderSignal::ClusterBuys,
                Some("double_buys") => InsiderSignal::DoubleBuys,
                Some("triple_buys") => InsiderSignal::TripleBuys,
                other => {
                    return Err(GuruFocusError::Validation(format!(
                        "unknown insider signal: {other:?}"
                    )))
                }
            };
            let within_days = args
                .get("within_days")
                .and_then(Value::as_u64)
                .map(|d| d as u32);
            let signals = client
                .insiders()
                .get_signal(signal, page(args), within_days, bypass(args))
                .await?;
            to_value(&signals)
        }
        "get_api_usage" => {
            let usage = client.personal().get_api_usage(bypass(args)).await?;
            to_value(&usage)
        }
        "get_usage_estimate" => {
            let estimate = client.personal().get_usage_estimate().await;
            Ok(json!({"remaining_estimate": estimate}))
        }
        "get_cache_stats" => {
            let stats = client.cache().await.stats().await;
            to_value(&stats)
        }
        "invalidate_symbol_cache" => {
            let symbol = require_symbol(args)?;
            let deleted = client.cache().await.invalidate_symbol(&symbol).await;
            Ok(json!({"symbol": symbol.trim().to_uppercase(), "entries_deleted": deleted}))
        }
        "get_rate_limit_stats" => {
            let stats = client.rate_limiter().stats().await;
            to_value(&stats)
        }
        _ => Err(GuruFocusError::NotFound(format!("tool '{name}'"))),
    }
}

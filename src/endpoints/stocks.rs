// ABOUTME: Stock data endpoints: summary, ratios, financials, estimates, dividends, prices
// ABOUTME: Raw variants return decoded JSON, typed variants parse into DTOs
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{cached_get, normalize_symbol};
use crate::cache::CacheCategory;
use crate::client::GuruFocusClient;
use crate::errors::GuruFocusResult;
use crate::models::{
    AnalystEstimates, CurrentDividend, DividendHistory, FinancialStatements, InsiderTrades,
    KeyRatios, PriceHistory, StockSummary,
};
use serde_json::Value;
use std::fmt;

/// Reporting period selector for the financials endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodType {
    #[default]
    Annual,
    Quarterly,
}

impl PeriodType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoints for per-symbol stock data.
///
/// ```no_run
/// # use gurufocus_mcp_server::client::GuruFocusClient;
/// # async fn example(client: &GuruFocusClient) -> Result<(), Box<dyn std::error::Error>> {
/// let summary = client.stocks().get_summary("AAPL", false).await?;
/// println!("{:?}: GF score {:?}", summary.general.company_name, summary.quality.gf_score);
/// # Ok(())
/// # }
/// ```
pub struct StocksEndpoint<'a> {
    client: &'a GuruFocusClient,
}

impl<'a> StocksEndpoint<'a> {
    pub(crate) const fn new(client: &'a GuruFocusClient) -> Self {
        Self { client }
    }

    /// Shared shape of the simple per-symbol endpoints: fingerprint is
    /// `(category, SYMBOL)`, path is `stock/SYMBOL/<suffix>`.
    async fn symbol_raw(
        &self,
        category: CacheCategory,
        suffix: &str,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        let symbol = normalize_symbol(symbol);
        cached_get(
            self.client,
            category,
            &[&symbol],
            &format!("stock/{symbol}/{suffix}"),
            None,
            bypass_cache,
        )
        .await
    }

    /// Comprehensive summary: general info, price, valuation, quality scores.
    pub async fn get_summary(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<StockSummary> {
        let data = self.get_summary_raw(symbol, bypass_cache).await?;
        StockSummary::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw summary response.
    pub async fn get_summary_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Summary, "summary", symbol, bypass_cache)
            .await
    }

    /// Raw real-time quote.
    pub async fn get_quote_raw(&self, symbol: &str, bypass_cache: bool) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Quote, "quote", symbol, bypass_cache)
            .await
    }

    /// Key financial ratios grouped by concern.
    pub async fn get_keyratios(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<KeyRatios> {
        let data = self.get_keyratios_raw(symbol, bypass_cache).await?;
        KeyRatios::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw key ratios response.
    pub async fn get_keyratios_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::KeyRatios, "keyratios", symbol, bypass_cache)
            .await
    }

    /// Financial statements for multiple historical periods.
    pub async fn get_financials(
        &self,
        symbol: &str,
        period_type: PeriodType,
        bypass_cache: bool,
    ) -> GuruFocusResult<FinancialStatements> {
        let data = self
            .get_financials_raw(symbol, period_type, bypass_cache)
            .await?;
        FinancialStatements::from_api_response(
            &data,
            &normalize_symbol(symbol),
            period_type.as_str(),
        )
    }

    /// Raw financial statements response.
    ///
    /// The fingerprint carries the period type so annual and quarterly data
    /// cache independently.
    pub async fn get_financials_raw(
        &self,
        symbol: &str,
        period_type: PeriodType,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        let symbol = normalize_symbol(symbol);
        let params = (period_type == PeriodType::Quarterly)
            .then(|| vec![("type".to_owned(), "quarterly".to_owned())]);
        cached_get(
            self.client,
            CacheCategory::Financials,
            &[&symbol, period_type.as_str()],
            &format!("stock/{symbol}/financials"),
            params.as_deref(),
            bypass_cache,
        )
        .await
    }

    /// Analyst EPS/revenue estimates and long-term growth rates.
    pub async fn get_analyst_estimates(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<AnalystEstimates> {
        let data = self.get_analyst_estimates_raw(symbol, bypass_cache).await?;
        AnalystEstimates::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw analyst estimates response.
    pub async fn get_analyst_estimates_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(
            CacheCategory::Estimates,
            "analyst_estimate",
            symbol,
            bypass_cache,
        )
        .await
    }

    /// Dividend payment history.
    pub async fn get_dividends(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<DividendHistory> {
        let data = self.get_dividends_raw(symbol, bypass_cache).await?;
        DividendHistory::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw dividend history response.
    pub async fn get_dividends_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Dividends, "dividend", symbol, bypass_cache)
            .await
    }

    /// Current dividend yield, TTM amount, and payment schedule.
    pub async fn get_current_dividend(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<CurrentDividend> {
        let data = self.get_current_dividend_raw(symbol, bypass_cache).await?;
        CurrentDividend::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw current dividend response.
    pub async fn get_current_dividend_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(
            CacheCategory::CurrentDividend,
            "current_dividend",
            symbol,
            bypass_cache,
        )
        .await
    }

    /// Daily closing-price history.
    pub async fn get_price_history(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<PriceHistory> {
        let data = self.get_price_history_raw(symbol, bypass_cache).await?;
        PriceHistory::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw price history response.
    pub async fn get_price_history_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::PriceHistory, "price", symbol, bypass_cache)
            .await
    }

    /// Raw OHLC price bars.
    pub async fn get_price_ohlc_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::PriceOhlc, "ohlc", symbol, bypass_cache)
            .await
    }

    /// Raw trading volume history.
    pub async fn get_volume_raw(&self, symbol: &str, bypass_cache: bool) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Volume, "volume", symbol, bypass_cache)
            .await
    }

    /// Raw split-unadjusted price history.
    pub async fn get_unadjusted_price_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(
            CacheCategory::UnadjustedPrice,
            "unadjusted_price",
            symbol,
            bypass_cache,
        )
        .await
    }

    /// Raw guru holdings for the symbol.
    pub async fn get_gurus_raw(&self, symbol: &str, bypass_cache: bool) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Gurus, "gurus", symbol, bypass_cache)
            .await
    }

    /// Raw executive roster.
    pub async fn get_executives_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Executives, "executives", symbol, bypass_cache)
            .await
    }

    /// Insider transactions for the symbol.
    pub async fn get_insider_trades(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<InsiderTrades> {
        let data = self.get_insider_trades_raw(symbol, bypass_cache).await?;
        InsiderTrades::from_api_response(&data, &normalize_symbol(symbol))
    }

    /// Raw insider transactions response.
    pub async fn get_insider_trades_raw(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        self.symbol_raw(CacheCategory::Insiders, "insider", symbol, bypass_cache)
            .await
    }
}

// ABOUTME: Cache category catalogue with three-tier TTL policy and key construction
// ABOUTME: Financial data freshness: price-dependent, earnings-dependent, and static tiers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::fmt;
use std::time::Duration;

const MINUTE: u64 = 60;
const DAY: u64 = 86_400;

/// Coarse freshness class for cached data.
///
/// Price-dependent data moves with the stock price, earnings-dependent data
/// changes quarterly after filings, static data rarely changes at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    PriceDependent,
    EarningsDependent,
    Static,
}

/// Categories of cached responses, mapped to API endpoint families.
///
/// The slug returned by [`CacheCategory::as_str`] is the key prefix for every
/// entry in that category and therefore a compatibility surface: entries
/// written by one release must stay readable by the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    // Price-dependent (intraday to daily refresh)
    Quote,
    ValuationRatios,
    MarketData,
    PriceHistory,
    PriceOhlc,
    Volume,
    UnadjustedPrice,
    CurrentDividend,

    // Earnings-dependent (quarterly, invalidated after earnings)
    Summary,
    Financials,
    KeyRatios,
    FundamentalRatios,
    GrowthMetrics,
    Estimates,
    GfScore,
    Dividends,
    Insiders,

    // Insider activity feeds (daily refresh as new SEC filings arrive)
    InsiderUpdates,
    InsiderCeoBuys,
    InsiderCfoBuys,
    InsiderClusterBuy,
    InsiderDouble,
    InsiderTriple,
    InsiderList,

    // Static (monthly+)
    Profile,
    Gurus,
    GuruList,
    Executives,
    TradesHistory,

    // Personal data and the reserved usage-tracker snapshot
    ApiUsage,
    UserScreeners,
    UserScreenerResults,
}

impl CacheCategory {
    /// Every recognized category, in catalogue order.
    pub const ALL: &'static [Self] = &[
        Self::Quote,
        Self::ValuationRatios,
        Self::MarketData,
        Self::PriceHistory,
        Self::PriceOhlc,
        Self::Volume,
        Self::UnadjustedPrice,
        Self::CurrentDividend,
        Self::Summary,
        Self::Financials,
        Self::KeyRatios,
        Self::FundamentalRatios,
        Self::GrowthMetrics,
        Self::Estimates,
        Self::GfScore,
        Self::Dividends,
        Self::Insiders,
        Self::InsiderUpdates,
        Self::InsiderCeoBuys,
        Self::InsiderCfoBuys,
        Self::InsiderClusterBuy,
        Self::InsiderDouble,
        Self::InsiderTriple,
        Self::InsiderList,
        Self::Profile,
        Self::Gurus,
        Self::GuruList,
        Self::Executives,
        Self::TradesHistory,
        Self::ApiUsage,
        Self::UserScreeners,
        Self::UserScreenerResults,
    ];

    /// Stable key-prefix slug for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::ValuationRatios => "valuation_ratios",
            Self::MarketData => "market_data",
            Self::PriceHistory => "price_history",
            Self::PriceOhlc => "price_ohlc",
            Self::Volume => "volume",
            Self::UnadjustedPrice => "unadjusted_price",
            Self::CurrentDividend => "current_dividend",
            Self::Summary => "summary",
            Self::Financials => "financials",
            Self::KeyRatios => "key_ratios",
            Self::FundamentalRatios => "fundamental_ratios",
            Self::GrowthMetrics => "growth_metrics",
            Self::Estimates => "estimates",
            Self::GfScore => "gf_score",
            Self::Dividends => "dividends",
            Self::Insiders => "insiders",
            Self::InsiderUpdates => "insider_updates",
            Self::InsiderCeoBuys => "insider_ceo_buys",
            Self::InsiderCfoBuys => "insider_cfo_buys",
            Self::InsiderClusterBuy => "insider_cluster_buy",
            Self::InsiderDouble => "insider_double",
            Self::InsiderTriple => "insider_triple",
            Self::InsiderList => "insider_list",
            Self::Profile => "profile",
            Self::Gurus => "gurus",
            Self::GuruList => "guru_list",
            Self::Executives => "executives",
            Self::TradesHistory => "trades_history",
            Self::ApiUsage => "api_usage",
            Self::UserScreeners => "user_screeners",
            Self::UserScreenerResults => "user_screener_results",
        }
    }

    /// Freshness tier this category belongs to.
    #[must_use]
    pub const fn tier(self) -> CacheTier {
        match self {
            Self::Quote
            | Self::ValuationRatios
            | Self::MarketData
            | Self::PriceHistory
            | Self::PriceOhlc
            | Self::Volume
            | Self::UnadjustedPrice
            | Self::CurrentDividend => CacheTier::PriceDependent,
            Self::Summary
            | Self::Financials
            | Self::KeyRatios
            | Self::FundamentalRatios
            | Self::GrowthMetrics
            | Self::Estimates
            | Self::GfScore
            | Self::Dividends
            | Self::Insiders
            | Self::InsiderUpdates
            | Self::InsiderCeoBuys
            | Self::InsiderCfoBuys
            | Self::InsiderClusterBuy
            | Self::InsiderDouble
            | Self::InsiderTriple => CacheTier::EarningsDependent,
            Self::InsiderList
            | Self::Profile
            | Self::Gurus
            | Self::GuruList
            | Self::Executives
            | Self::TradesHistory
            | Self::ApiUsage
            | Self::UserScreeners
            | Self::UserScreenerResults => CacheTier::Static,
        }
    }

    /// Default time-to-live for entries in this category.
    #[must_use]
    pub const fn ttl(self) -> Duration {
        let seconds = match self {
            Self::Quote => 15 * MINUTE,
            Self::ValuationRatios
            | Self::MarketData
            | Self::PriceHistory
            | Self::PriceOhlc
            | Self::Volume
            | Self::UnadjustedPrice
            | Self::CurrentDividend
            | Self::Summary
            | Self::GfScore
            | Self::InsiderUpdates
            | Self::InsiderCeoBuys
            | Self::InsiderCfoBuys
            | Self::InsiderClusterBuy
            | Self::InsiderDouble
            | Self::InsiderTriple
            | Self::ApiUsage
            | Self::UserScreeners
            | Self::UserScreenerResults => DAY,
            Self::Financials
            | Self::KeyRatios
            | Self::FundamentalRatios
            | Self::GrowthMetrics => 95 * DAY,
            Self::Estimates | Self::Insiders | Self::InsiderList | Self::GuruList
            | Self::TradesHistory => 7 * DAY,
            Self::Dividends | Self::Profile | Self::Executives => 30 * DAY,
            Self::Gurus => 14 * DAY,
        };
        Duration::from_secs(seconds)
    }

    /// Whether entries should be bulk-invalidated after an earnings event.
    #[must_use]
    pub const fn invalidate_on_earnings(self) -> bool {
        matches!(
            self,
            Self::Summary
                | Self::Financials
                | Self::KeyRatios
                | Self::FundamentalRatios
                | Self::GrowthMetrics
                | Self::Estimates
                | Self::GfScore
                | Self::Dividends
        )
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a cache key from a category and ordered key parts.
///
/// Pure and stable across releases: `build_cache_key(Summary, ["AAPL"])` is
/// `"summary:AAPL"` in every version.
#[must_use]
pub fn build_cache_key(category: CacheCategory, parts: &[&str]) -> String {
    let mut key = String::from(category.as_str());
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

// ABOUTME: Endpoint layer: thin cache-aware wrappers over the client request pipeline
// ABOUTME: Each family normalizes inputs, builds fingerprints, and offers raw and typed variants
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

pub mod insiders;
pub mod personal;
pub mod stocks;

pub use insiders::InsidersEndpoint;
pub use personal::PersonalEndpoint;
pub use stocks::{PeriodType, StocksEndpoint};

use crate::cache::CacheCategory;
use crate::client::GuruFocusClient;
use crate::errors::GuruFocusResult;
use serde_json::Value;

/// Normalize a ticker symbol: trimmed and upper-cased.
///
/// Idempotent: `normalize_symbol(normalize_symbol(s)) == normalize_symbol(s)`.
#[must_use]
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Shared read path for every endpoint wrapper: consult the cache under the
/// category fingerprint, on a miss call the pipeline and store the result.
pub(crate) async fn cached_get(
    client: &GuruFocusClient,
    category: CacheCategory,
    key_parts: &[&str],
    endpoint: &str,
    params: Option<&[(String, String)]>,
    bypass_cache: bool,
) -> GuruFocusResult<Value> {
    let cache = client.cache().await;

    if let Some(cached) = cache.get(category, key_parts, bypass_cache).await {
        return Ok(cached);
    }

    let data = client.get(endpoint, params).await?;
    cache.set(category, key_parts, &data, None).await;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalization_is_idempotent() {
        assert_eq!(normalize_symbol(" aapl "), "AAPL");
        assert_eq!(normalize_symbol(&normalize_symbol(" aapl ")), "AAPL");
        assert_eq!(normalize_symbol("XTER:DAI"), "XTER:DAI");
    }
}

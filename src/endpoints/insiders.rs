// ABOUTME: Market-wide insider activity endpoints: update feed and executive buy signals
// ABOUTME: Fingerprints carry page and filter discriminators so each page caches independently
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::cached_get;
use crate::cache::CacheCategory;
use crate::client::GuruFocusClient;
use crate::errors::GuruFocusResult;
use crate::models::InsiderSignalPage;
use crate::pagination::paginate;
use futures_util::Stream;
use serde_json::Value;

/// Filters for the insider updates feed.
#[derive(Debug, Clone, Default)]
pub struct UpdatesFilter {
    /// Transaction date (YYYYMMDD).
    pub date: Option<String>,
    pub region: Option<String>,
    /// SEC filing date (YYYYMMDD).
    pub file_date: Option<String>,
    pub sort: Option<String>,
    /// "asc" or "desc".
    pub order: Option<String>,
}

/// Executive buy-signal feeds exposed by the insider_buys endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsiderSignal {
    CeoBuys,
    CfoBuys,
    ClusterBuys,
    DoubleBuys,
    TripleBuys,
}

impl InsiderSignal {
    const fn category(self) -> CacheCategory {
        match self {
            Self::CeoBuys => CacheCategory::InsiderCeoBuys,
            Self::CfoBuys => CacheCategory::InsiderCfoBuys,
            Self::ClusterBuys => CacheCategory::InsiderClusterBuy,
            Self::DoubleBuys => CacheCategory::InsiderDouble,
            Self::TripleBuys => CacheCategory::InsiderTriple,
        }
    }

    const fn path(self) -> &'static str {
        match self {
            Self::CeoBuys => "insider_buys/insider_ceo",
            Self::CfoBuys => "insider_buys/insider_cfo",
            Self::ClusterBuys => "insider_buys/insider_cluster_buy",
            Self::DoubleBuys => "insider_buys/insider_double",
            Self::TripleBuys => "insider_buys/insider_triple",
        }
    }
}

/// Endpoints for market-wide insider activity.
pub struct InsidersEndpoint<'a> {
    client: &'a GuruFocusClient,
}

impl<'a> InsidersEndpoint<'a> {
    pub(crate) const fn new(client: &'a GuruFocusClient) -> Self {
        Self { client }
    }

    /// One page of the insider updates feed, typed.
    pub async fn get_updates(
        &self,
        page: u32,
        filter: &UpdatesFilter,
        bypass_cache: bool,
    ) -> GuruFocusResult<InsiderSignalPage> {
        let data = self.get_updates_raw(page, filter, bypass_cache).await?;
        InsiderSignalPage::from_api_response(&data)
    }

    /// One raw page of the insider updates feed.
    pub async fn get_updates_raw(
        &self,
        page: u32,
        filter: &UpdatesFilter,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        let page_str = page.to_string();
        let key = format!(
            "{page_str}:{}:{}:{}:{}:{}",
            filter.date.as_deref().unwrap_or(""),
            filter.region.as_deref().unwrap_or(""),
            filter.file_date.as_deref().unwrap_or(""),
            filter.sort.as_deref().unwrap_or(""),
            filter.order.as_deref().unwrap_or(""),
        );

        let mut params = vec![("page".to_owned(), page_str)];
        for (name, value) in [
            ("date", &filter.date),
            ("region", &filter.region),
            ("file_date", &filter.file_date),
            ("sort", &filter.sort),
            ("order", &filter.order),
        ] {
            if let Some(value) = value {
                params.push((name.to_owned(), value.clone()));
            }
        }

        cached_get(
            self.client,
            CacheCategory::InsiderUpdates,
            &[&key],
            "insider_updates",
            Some(&params),
            bypass_cache,
        )
        .await
    }

    /// One page of an executive buy-signal feed, typed.
    pub async fn get_signal(
        &self,
        signal: InsiderSignal,
        page: u32,
        within_days: Option<u32>,
        bypass_cache: bool,
    ) -> GuruFocusResult<InsiderSignalPage> {
        let data = self
            .get_signal_raw(signal, page, within_days, bypass_cache)
            .await?;
        InsiderSignalPage::from_api_response(&data)
    }

    /// One raw page of an executive buy-signal feed.
    pub async fn get_signal_raw(
        &self,
        signal: InsiderSignal,
        page: u32,
        within_days: Option<u32>,
        bypass_cache: bool,
    ) -> GuruFocusResult<Value> {
        let key = format!(
            "{page}:{}",
            within_days.map(|d| d.to_string()).unwrap_or_default()
        );

        let mut params = vec![("page".to_owned(), page.to_string())];
        if let Some(days) = within_days {
            params.push(("within_days".to_owned(), days.to_string()));
        }

        cached_get(
            self.client,
            signal.category(),
            &[&key],
            signal.path(),
            Some(&params),
            bypass_cache,
        )
        .await
    }

    /// Lazily stream every record of a buy-signal feed across pages.
    ///
    /// Pages are fetched on demand starting from page 1; the stream ends on
    /// the declared last page, an empty page, or after `max_pages`.
    pub fn stream_signal(
        &self,
        signal: InsiderSignal,
        within_days: Option<u32>,
        bypass_cache: bool,
        max_pages: Option<u32>,
    ) -> impl Stream<Item = GuruFocusResult<Value>> + 'a {
        let client = self.client;
        paginate(
            move |page| async move {
                Self::new(client)
                    .get_signal_raw(signal, page, within_days, bypass_cache)
                    .await
            },
            max_pages,
        )
    }

    /// Raw list of insiders covered by the feed.
    pub async fn get_list_raw(&self, page: u32, bypass_cache: bool) -> GuruFocusResult<Value> {
        let key = page.to_string();
        let params = vec![("page".to_owned(), key.clone())];
        cached_get(
            self.client,
            CacheCategory::InsiderList,
            &[&key],
            "insider_list",
            Some(&params),
            bypass_cache,
        )
        .await
    }
}

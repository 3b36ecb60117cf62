// ABOUTME: Lazy pagination over numbered API pages with declared-last-page detection
// ABOUTME: Yields items in order, terminating on last page, empty page, or a caller page cap
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::GuruFocusResult;
use async_stream::try_stream;
use futures_util::Stream;
use serde_json::Value;
use std::future::Future;

/// One decoded page of a paginated response.
///
/// Paginated GuruFocus endpoints wrap their records in a `data` array next
/// to integer `current_page` / `last_page` fields; a few return a bare
/// array with no envelope at all. Both shapes decode into this struct.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub current_page: Option<u64>,
    pub last_page: Option<u64>,
}

impl Page {
    /// Decode a page from a raw response value.
    #[must_use]
    pub fn from_response(value: &Value) -> Self {
        if let Some(items) = value.as_array() {
            return Self {
                items: items.clone(),
                current_page: None,
                last_page: None,
            };
        }

        let items = value
            .get("data")
            .or_else(|| value.get("results"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            items,
            current_page: page_number(value.get("current_page")),
            last_page: page_number(value.get("last_page")),
        }
    }

    /// Whether the response declares itself the final page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        match (self.current_page, self.last_page) {
            (Some(current), Some(last)) => current >= last,
            _ => false,
        }
    }
}

/// Page numbers arrive as integers or string-encoded integers.
fn page_number(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Lazily iterate the items of a paginated endpoint.
///
/// `fetch` is invoked with page numbers 1..N on demand; there is no
/// prefetch. The stream yields each item exactly once, in page order, and
/// terminates when the response declares `current_page >= last_page`, when
/// a page comes back empty, or when `max_pages` is reached. A fetch error
/// ends the stream with that error.
pub fn paginate<F, Fut>(
    mut fetch: F,
    max_pages: Option<u32>,
) -> impl Stream<Item = GuruFocusResult<Value>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = GuruFocusResult<Value>>,
{
    try_stream! {
        let mut page_number = 1_u32;
        loop {
            if let Some(max) = max_pages {
                if page_number > max {
                    break;
                }
            }

            let response = fetch(page_number).await?;
            let page = Page::from_response(&response);

            if page.items.is_empty() {
                break;
            }
            let is_last = page.is_last();
            for item in page.items {
                yield item;
            }
            if is_last {
                break;
            }

            page_number += 1;
        }
    }
}

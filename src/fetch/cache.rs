//! Per-audit page cache
//!
//! Every analyzer reads pages through one `PageCache`. Concurrent requests
//! for the same URL share a single in-flight fetch, and successful fetches
//! are kept for the rest of the audit. Failures are not memoized.

use super::client::{fetch_page, probe_url, Probe, RequestOptions};
use super::PageFetch;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<PageFetch>>>;

/// Single-flight URL -> page cache scoped to one audit
pub struct PageCache {
    client: Client,
    max_redirects: u32,
    slots: Mutex<HashMap<String, Slot>>,
}

impl PageCache {
    pub fn new(client: Client, max_redirects: u32) -> Self {
        Self {
            client,
            max_redirects,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches `url` once per audit
    ///
    /// Returns `None` when the page could not be fetched; the failure is
    /// logged and the next caller will try again.
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Option<Arc<PageFetch>> {
        let slot = self.slot(url);
        let options = RequestOptions::new(timeout, self.max_redirects);

        let result = slot
            .get_or_try_init(|| async {
                fetch_page(&self.client, url, &options).await.map(Arc::new)
            })
            .await;

        match result {
            Ok(page) => Some(Arc::clone(page)),
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }

    /// Returns a page only if it has already been fetched successfully
    pub fn cached(&self, url: &str) -> Option<Arc<PageFetch>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(url).and_then(|slot| slot.get().cloned())
    }

    /// Number of successfully fetched pages
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores a page that was obtained without going through the network
    ///
    /// The page is keyed by its requested URL. An existing entry wins.
    pub fn seed(&self, page: PageFetch) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(page.url.clone())
            .or_insert_with(|| Arc::new(OnceCell::new_with(Some(Arc::new(page)))));
    }

    /// HEAD probe; not cached
    pub async fn probe(&self, url: &str, timeout: Duration) -> Probe {
        let options = RequestOptions::new(timeout, self.max_redirects);
        probe_url(&self.client, url, &options).await
    }

    fn slot(&self, url: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            slots
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }
}

//! State holder for the most recently loaded feed.
//!
//! Mirrors what a UI needs to render: the feed itself, the last error message,
//! and whether a load is in flight. A document in an unrecognized dialect
//! leaves the previous feed in place.

use crate::feed::UnifiedFeed;
use crate::fetch::{self, FetchError, FetchOptions};
use crate::xml::Document;

#[derive(Debug, Clone, Default)]
pub struct FeedStore {
    /// Last successfully normalized feed.
    pub feed: Option<UnifiedFeed>,
    /// Message from the last failed load, until cleared.
    pub error: Option<String>,
    /// True between [`FeedStore::begin_fetch`] and [`FeedStore::finish_fetch`].
    pub loading: bool,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches and normalizes `url`, updating the store in place.
    ///
    /// Holds `&mut self` for the whole request, so nothing else can see
    /// `loading` meanwhile. Callers that render progress should pair
    /// [`FeedStore::begin_fetch`] and [`FeedStore::finish_fetch`] around
    /// [`fetch::fetch_feed`] themselves.
    pub async fn fetch_feed(&mut self, client: &reqwest::Client, url: &str, options: &FetchOptions) {
        self.begin_fetch();
        let result = fetch::fetch_feed(client, url, options).await;
        self.finish_fetch(url, result);
    }

    /// Marks a load as in flight.
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    /// Applies the outcome of a load and clears `loading`.
    ///
    /// Failures are logged and recorded in `error`. An unrecognized dialect
    /// keeps the previous feed.
    pub fn finish_fetch(&mut self, url: &str, result: Result<Option<UnifiedFeed>, FetchError>) {
        match result {
            Ok(Some(feed)) => self.feed = Some(feed),
            Ok(None) => {
                tracing::warn!(url = %url, "Unrecognized feed dialect, keeping previous feed");
            }
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Error fetching feed");
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Normalizes an already parsed document into the store.
    ///
    /// Returns `false` (and leaves `feed` untouched) for unrecognized dialects.
    pub fn load_document(&mut self, doc: &Document) -> bool {
        match fetch::normalize(doc) {
            Some(feed) => {
                self.feed = Some(feed);
                true
            }
            None => false,
        }
    }

    /// Clears the stored feed and any error.
    pub fn clear_feed(&mut self) {
        self.feed = None;
        self.error = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

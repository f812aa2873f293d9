//! Debounced query primitive.
//!
//! [`DebouncedQuery::submit`] schedules a fetch after a quiet period. Each new
//! submission cancels the pending timer (and any fetch it already started),
//! and a generation counter drops results whose query is no longer current.
//! Input shorter than the minimum length clears the results at once without
//! fetching. Failed fetches also clear the results.
//!
//! Results are published on a `watch` channel.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ClientResult;

pub struct DebouncedQuery<T> {
    delay: Duration,
    min_chars: usize,
    generation: Arc<AtomicU64>,
    results: Arc<watch::Sender<Vec<T>>>,
    pending: Option<JoinHandle<()>>,
}

impl<T> DebouncedQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(delay: Duration, min_chars: usize) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            delay,
            min_chars,
            generation: Arc::new(AtomicU64::new(0)),
            results: Arc::new(tx),
            pending: None,
        }
    }

    /// Schedule `fetch` for `query` once input has been quiet for the delay.
    pub fn submit<F, Fut>(&mut self, query: &str, fetch: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<Vec<T>>> + Send + 'static,
    {
        let generation = self.supersede();
        let query = query.trim().to_string();

        if query.chars().count() < self.min_chars {
            self.results.send_replace(Vec::new());
            return;
        }

        let delay = self.delay;
        let current = self.generation.clone();
        let results = self.results.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::Acquire) != generation {
                return;
            }

            let found = fetch(query.clone()).await.unwrap_or_else(|err| {
                tracing::warn!(%query, error = %err, "lookup failed; clearing candidates");
                Vec::new()
            });

            // Checked under the channel lock so a concurrent clear() wins.
            let published = results.send_if_modified(|current_results| {
                if current.load(Ordering::Acquire) != generation {
                    return false;
                }
                *current_results = found;
                true
            });
            if !published {
                tracing::debug!(%query, "discarding stale lookup response");
            }
        }));
    }

    /// Cancel anything pending and clear the results (e.g. after a candidate
    /// was picked).
    pub fn clear(&mut self) {
        self.supersede();
        self.results.send_replace(Vec::new());
    }

    /// Cancel anything pending, keeping the current results.
    pub fn cancel(&mut self) {
        self.supersede();
    }

    pub fn results(&self) -> Vec<T> {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.results.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the pending task and start a new generation. Returns it.
    fn supersede(&mut self) -> u64 {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl<T> Drop for DebouncedQuery<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

//! Background owner of the [`FuzzyIndex`].
//!
//! The index lives inside a tokio task; callers talk to it through [`SearchWorker`], which
//! only holds the sending half of a channel. Index construction and queries run on the
//! blocking pool, so a large rebuild never stalls the caller's task.
//!
//! ```text
//!  SearchWorker ──SearchMessage──▶ worker_loop ──spawn_blocking──▶ FuzzyIndex
//!        ▲                              │
//!        └─────────── oneshot reply ────┘
//! ```
//!
//! The task exits once every [`SearchWorker`] handle has been dropped.
use std::sync::Arc;

use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    oneshot,
};
use tracing::{debug, error, info};

use crate::astris_errors::AstrisError;

use super::{fuzzy_index::FuzzyIndex, SearchEntry};

#[derive(Debug)]
enum SearchMessage {
    Rebuild {
        entries: Vec<SearchEntry>,
        reply: oneshot::Sender<usize>,
    },
    Query {
        text: String,
        limit: usize,
        reply: oneshot::Sender<Vec<SearchEntry>>,
    },
}

/// Handle to the search task.
#[derive(Debug, Clone)]
pub struct SearchWorker {
    tx: UnboundedSender<SearchMessage>,
    limit: usize,
}

impl SearchWorker {
    /// Start the search task with an empty index. Must be called within a tokio runtime.
    ///
    /// Arguments
    /// ---------
    /// * `limit`: maximum number of matches returned by [`SearchWorker::query`]
    pub fn spawn(limit: usize) -> Self {
        let (tx, rx) = unbounded_channel::<SearchMessage>();
        tokio::spawn(worker_loop(rx));
        SearchWorker { tx, limit }
    }

    /// Start the search task and build the index from `entries` before returning.
    pub async fn spawn_with(entries: Vec<SearchEntry>, limit: usize) -> Result<Self, AstrisError> {
        let worker = Self::spawn(limit);
        worker.rebuild(entries).await?;
        Ok(worker)
    }

    /// Replace the whole index with a new entry set.
    ///
    /// Return
    /// ------
    /// * The number of indexed entries once the new index is in place
    pub async fn rebuild(&self, entries: Vec<SearchEntry>) -> Result<usize, AstrisError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(SearchMessage::Rebuild { entries, reply })
            .map_err(|_| AstrisError::SearchWorkerGone)?;
        response.await.map_err(|_| AstrisError::SearchWorkerGone)
    }

    /// Query the index.
    ///
    /// Blank input resolves immediately to an empty list without reaching the task.
    ///
    /// Return
    /// ------
    /// * At most `limit` ranked entries
    pub async fn query(&self, text: &str) -> Result<Vec<SearchEntry>, AstrisError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let (reply, response) = oneshot::channel();
        self.tx
            .send(SearchMessage::Query {
                text: text.to_string(),
                limit: self.limit,
                reply,
            })
            .map_err(|_| AstrisError::SearchWorkerGone)?;
        response.await.map_err(|_| AstrisError::SearchWorkerGone)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

async fn worker_loop(mut rx: UnboundedReceiver<SearchMessage>) {
    let mut index = Arc::new(FuzzyIndex::default());

    while let Some(message) = rx.recv().await {
        match message {
            SearchMessage::Rebuild { entries, reply } => {
                match tokio::task::spawn_blocking(move || FuzzyIndex::build(entries)).await {
                    Ok(built) => {
                        index = Arc::new(built);
                        info!(entries = index.len(), "search index rebuilt");
                        let _ = reply.send(index.len());
                    }
                    // Dropping `reply` reports the failure to the caller
                    Err(e) => error!("search index build failed: {e}"),
                }
            }
            SearchMessage::Query { text, limit, reply } => {
                let current = Arc::clone(&index);
                match tokio::task::spawn_blocking(move || current.query(&text, limit)).await {
                    Ok(matches) => {
                        debug!(matches = matches.len(), "search query answered");
                        let _ = reply.send(matches);
                    }
                    Err(e) => error!("search query failed: {e}"),
                }
            }
        }
    }

    debug!("search worker stopped");
}

#[cfg(test)]
mod search_worker_tests {
    use super::*;
    use crate::search::EntryKind;

    fn entries() -> Vec<SearchEntry> {
        ["Earth", "Proxima Cen b", "Proxima Cen d", "Proxima Cen", "Barnard b"]
            .iter()
            .map(|name| SearchEntry {
                name: name.to_string(),
                slug: crate::waypoints::slug::slugify(name),
                kind: EntryKind::Planet,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_query_after_rebuild() {
        let worker = SearchWorker::spawn_with(entries(), 3).await.unwrap();
        let results = worker.query("proxima").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].slug, "proxima-cen");

        let results = worker.query("barnard b").await.unwrap();
        assert_eq!(results[0].slug, "barnard-b");
    }

    #[tokio::test]
    async fn test_blank_query_skips_worker() {
        let worker = SearchWorker::spawn(3);
        assert!(worker.query("  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_before_build_is_empty() {
        let worker = SearchWorker::spawn(3);
        assert!(worker.query("earth").await.unwrap().is_empty());
        assert_eq!(worker.rebuild(entries()).await.unwrap(), 5);
        assert_eq!(worker.query("earth").await.unwrap()[0].slug, "earth");
    }
}

//! Remote search off the control thread.
//!
//! The provider call runs on a worker thread; results come back over a
//! channel and are applied by the coordinator on its next tick. Only the most
//! recent query is tracked, so answers to superseded queries are dropped.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::library::PreviewTrack;
use crate::search::{self, SearchProvider};

struct Inflight {
    query: String,
    rx: Receiver<Vec<PreviewTrack>>,
}

pub(super) struct RemoteSearch {
    provider: Arc<dyn SearchProvider>,
    limit: usize,
    inflight: Option<Inflight>,
}

impl RemoteSearch {
    pub(super) fn new(provider: Arc<dyn SearchProvider>, limit: usize) -> Self {
        Self {
            provider,
            limit,
            inflight: None,
        }
    }

    /// Start looking up `query`, abandoning any earlier lookup.
    pub(super) fn start(&mut self, query: &str) {
        let (tx, rx) = mpsc::channel();
        let provider = Arc::clone(&self.provider);
        let limit = self.limit;
        let owned = query.to_string();
        thread::spawn(move || {
            let found = search::lookup(provider.as_ref(), &owned, limit);
            // Nobody listens once the query was superseded.
            let _ = tx.send(found);
        });
        self.inflight = Some(Inflight {
            query: query.to_string(),
            rx,
        });
    }

    pub(super) fn cancel(&mut self) {
        self.inflight = None;
    }

    pub(super) fn is_pending(&self) -> bool {
        self.inflight.is_some()
    }

    /// Finished lookup, if any. A worker that died counts as an empty answer.
    pub(super) fn try_finish(&mut self) -> Option<(String, Vec<PreviewTrack>)> {
        let inflight = self.inflight.as_ref()?;
        let found = match inflight.rx.try_recv() {
            Ok(found) => found,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                log::error!("remote search {:?} worker exited early", inflight.query);
                Vec::new()
            }
        };
        self.inflight.take().map(|i| (i.query, found))
    }

    /// Block up to `timeout` for the in-flight lookup.
    pub(super) fn wait(&mut self, timeout: Duration) -> Option<(String, Vec<PreviewTrack>)> {
        let inflight = self.inflight.as_ref()?;
        let found = match inflight.rx.recv_timeout(timeout) {
            Ok(found) => found,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => {
                log::error!("remote search {:?} worker exited early", inflight.query);
                Vec::new()
            }
        };
        self.inflight.take().map(|i| (i.query, found))
    }
}

//! Per-run URL frontier.

use std::collections::{HashSet, VecDeque};

/// Why a URL is in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// First URL of the run; never skipped.
    Seed,
    /// Found on a crawled page; skipped if already catalogued.
    Discovered,
    /// Re-request after an empty response; never skipped.
    Retry,
}

/// A URL about to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub url: String,
    pub kind: DispatchKind,
    /// Number of empty responses seen so far for this URL.
    pub attempt: u32,
}

impl Dispatch {
    /// Whether the catalog must be consulted before fetching.
    pub fn is_skippable(&self) -> bool {
        self.kind == DispatchKind::Discovered
    }
}

/// FIFO queue plus the set of every URL dispatched during this run.
///
/// The set covers URLs still in flight whose records are not committed
/// yet, which the catalog cannot know about.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Dispatch>,
    dispatched: HashSet<String>,
}

impl Frontier {
    pub fn with_seed(seed: impl Into<String>) -> Self {
        let url = seed.into();
        let mut frontier = Self::default();
        frontier.dispatched.insert(url.clone());
        frontier.queue.push_back(Dispatch {
            url,
            kind: DispatchKind::Seed,
            attempt: 0,
        });
        frontier
    }

    /// Queue a discovered URL. Returns false if it was already dispatched this run.
    pub fn discover(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if !self.dispatched.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(Dispatch {
            url,
            kind: DispatchKind::Discovered,
            attempt: 0,
        });
        true
    }

    /// Put `dispatch` back at the head of the queue for another attempt.
    pub fn retry(&mut self, dispatch: Dispatch) {
        self.queue.push_front(Dispatch {
            url: dispatch.url,
            kind: DispatchKind::Retry,
            attempt: dispatch.attempt + 1,
        });
    }

    pub fn next(&mut self) -> Option<Dispatch> {
        self.queue.pop_front()
    }

    /// Whether `url` was queued at any point this run.
    pub fn is_dispatched(&self, url: &str) -> bool {
        self.dispatched.contains(url)
    }

    /// URLs waiting to be fetched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Distinct URLs dispatched this run.
    pub fn dispatched(&self) -> usize {
        self.dispatched.len()
    }
}

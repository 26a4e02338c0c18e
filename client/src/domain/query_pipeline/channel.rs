//! Debounce and latest-wins bookkeeping for one query channel.
//!
//! The channel is a plain state machine; the driver task owns it and feeds it
//! input events, debounce expiries, and fetch completions.

/// One query the driver must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Issue<Q> {
    pub(super) generation: u64,
    pub(super) query: Q,
    pub(super) page_index: u32,
}

/// Whether a completion belongs to the newest issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Freshness {
    Current,
    Stale,
}

#[derive(Debug)]
pub(super) struct QueryChannel<Q> {
    settled: Q,
    pending: Option<Q>,
    displayed_page: u32,
    issued: u64,
    completed: u64,
}

impl<Q: Clone + PartialEq> QueryChannel<Q> {
    /// Channel whose first query uses `initial`.
    pub(super) fn new(initial: Q) -> Self {
        Self {
            settled: initial,
            pending: None,
            displayed_page: 0,
            issued: 0,
            completed: 0,
        }
    }

    /// Issue the opening query at page 0.
    pub(super) fn start(&mut self) -> Issue<Q> {
        self.issue(0)
    }

    /// Record a raw input; the driver restarts its debounce timer.
    pub(super) fn on_input(&mut self, query: Q) {
        self.pending = Some(query);
    }

    pub(super) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The debounce window elapsed without further input.
    ///
    /// Returns `None` when nothing was pending or the settled input equals
    /// the previously settled one.
    pub(super) fn settle(&mut self) -> Option<Issue<Q>> {
        let query = self.pending.take()?;
        if query == self.settled {
            return None;
        }
        self.settled = query;
        Some(self.issue(0))
    }

    /// Explicit page navigation with the current settled query.
    pub(super) fn request_page(&mut self, page_index: u32) -> Issue<Q> {
        self.issue(page_index)
    }

    /// Re-run the settled query at the page currently displayed.
    pub(super) fn refresh(&mut self) -> Issue<Q> {
        self.issue(self.displayed_page)
    }

    /// Classify a finished fetch.
    pub(super) fn complete(&mut self, generation: u64) -> Freshness {
        if generation != self.issued {
            return Freshness::Stale;
        }
        self.completed = generation;
        Freshness::Current
    }

    /// Note the page index of a result that was applied.
    pub(super) fn displayed(&mut self, page_index: u32) {
        self.displayed_page = page_index;
    }

    /// Whether the newest issued query is still outstanding.
    pub(super) fn is_loading(&self) -> bool {
        self.issued > self.completed
    }

    pub(super) fn generation(&self) -> u64 {
        self.issued
    }

    fn issue(&mut self, page_index: u32) -> Issue<Q> {
        self.issued += 1;
        Issue {
            generation: self.issued,
            query: self.settled.clone(),
            page_index,
        }
    }
}

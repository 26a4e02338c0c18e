//! Transient notice queue.
//!
//! Notices report the outcome of user actions. Each one is removed
//! automatically once its time to live elapses, or earlier through
//! [`NoticeQueue::dismiss`]. The queue is cheap to clone; clones share state.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Default time a notice stays visible.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(5000);

/// Identifier of a posted notice. Strictly increasing per queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoticeId(pub u64);

impl fmt::Display for NoticeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    /// An action completed.
    Success,
    /// An action failed.
    Error,
    /// An action was refused before reaching a remote service.
    Warning,
    /// Neutral information.
    Info,
}

/// One transient status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Queue-assigned identifier.
    pub id: NoticeId,
    /// Severity.
    pub kind: NoticeKind,
    /// Message text.
    pub text: String,
}

#[derive(Default)]
struct QueueState {
    last_id: u64,
    notices: Vec<Notice>,
    timers: HashMap<NoticeId, AbortHandle>,
}

struct QueueInner {
    ttl: Duration,
    state: Mutex<QueueState>,
    updates: watch::Sender<Vec<Notice>>,
}

impl QueueInner {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        // Poisoning leaves the notice list structurally valid.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish(&self, state: &QueueState) {
        self.updates.send_replace(state.notices.clone());
    }

    fn expire(&self, id: NoticeId) {
        let mut state = self.state();
        state.timers.remove(&id);
        let before = state.notices.len();
        state.notices.retain(|notice| notice.id != id);
        if state.notices.len() != before {
            self.publish(&state);
        }
    }
}

/// Process-wide queue of short-lived notices.
#[derive(Clone)]
pub struct NoticeQueue {
    inner: Arc<QueueInner>,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl fmt::Debug for NoticeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoticeQueue")
            .field("ttl", &self.inner.ttl)
            .field("notices", &self.snapshot())
            .finish()
    }
}

impl NoticeQueue {
    /// Create an empty queue whose notices expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(QueueInner {
                ttl,
                state: Mutex::new(QueueState::default()),
                updates,
            }),
        }
    }

    /// Append a notice and schedule its expiry.
    ///
    /// Expiry needs a Tokio runtime; outside one the notice stays until it is
    /// dismissed.
    pub fn post(&self, kind: NoticeKind, text: impl Into<String>) -> NoticeId {
        let text = text.into();
        // Ids are allocated under the lock so list order and id order agree.
        let mut state = self.inner.state();
        state.last_id += 1;
        let id = NoticeId(state.last_id);
        match kind {
            NoticeKind::Error => error!(notice_id = id.0, %text, "notice posted"),
            NoticeKind::Warning => warn!(notice_id = id.0, %text, "notice posted"),
            NoticeKind::Success | NoticeKind::Info => info!(notice_id = id.0, %text, "notice posted"),
        }
        state.notices.push(Notice { id, kind, text });
        if let Ok(runtime) = Handle::try_current() {
            let deadline = Instant::now() + self.inner.ttl;
            let timer = runtime.spawn(expire_at(Arc::downgrade(&self.inner), id, deadline));
            state.timers.insert(id, timer.abort_handle());
        }
        self.inner.publish(&state);
        id
    }

    /// Post a [`NoticeKind::Success`] notice.
    pub fn success(&self, text: impl Into<String>) -> NoticeId {
        self.post(NoticeKind::Success, text)
    }

    /// Post a [`NoticeKind::Error`] notice.
    pub fn error(&self, text: impl Into<String>) -> NoticeId {
        self.post(NoticeKind::Error, text)
    }

    /// Post a [`NoticeKind::Warning`] notice.
    pub fn warning(&self, text: impl Into<String>) -> NoticeId {
        self.post(NoticeKind::Warning, text)
    }

    /// Post a [`NoticeKind::Info`] notice.
    pub fn info(&self, text: impl Into<String>) -> NoticeId {
        self.post(NoticeKind::Info, text)
    }

    /// Remove a notice before it expires.
    ///
    /// Returns `false` when the notice is already gone.
    pub fn dismiss(&self, id: NoticeId) -> bool {
        let mut state = self.inner.state();
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        let before = state.notices.len();
        state.notices.retain(|notice| notice.id != id);
        let removed = state.notices.len() != before;
        if removed {
            self.inner.publish(&state);
        }
        removed
    }

    /// Notices currently visible, in arrival order.
    pub fn snapshot(&self) -> Vec<Notice> {
        self.inner.state().notices.clone()
    }

    /// Subscribe to changes of the visible notice list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notice>> {
        self.inner.updates.subscribe()
    }

    /// Cancel every pending expiry and drop all notices.
    pub fn shutdown(&self) {
        let mut state = self.inner.state();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.notices.clear();
        self.inner.publish(&state);
    }
}

async fn expire_at(queue: Weak<QueueInner>, id: NoticeId, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;
    if let Some(inner) = queue.upgrade() {
        inner.expire(id);
    }
}

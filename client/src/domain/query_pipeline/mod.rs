//! Cancellable, debounced list query pipeline.
//!
//! A pipeline turns a stream of raw query inputs and page requests into the
//! page currently displayed. One task owns the [`channel::QueryChannel`]
//! state; callers talk to it through a cloneable [`QueryPipelineHandle`] and
//! observe results through a `watch` snapshot.
//!
//! - Inputs are debounced; only the last input of a quiet window settles.
//! - A settled input equal to the previous one is ignored.
//! - Page requests and refreshes bypass the debounce.
//! - Only the newest issued query may replace the displayed page. Older
//!   completions are dropped when they arrive.
//! - A failed query posts an error notice and keeps the previous page.

mod channel;
mod sources;


use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use self::channel::{Freshness, Issue, QueryChannel};
pub use self::sources::{CounterpartyListing, OrganizationListing};
use super::{Error, NoticeQueue};

/// Default quiet period before an input settles.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Paged data source queried by a pipeline.
#[async_trait]
pub trait QuerySource: Send + Sync + 'static {
    /// Query value the user edits (a search term, a filter).
    type Query: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    /// Row type of the listed pages.
    type Item: Send + Sync + 'static;

    /// Fetch one page for `query`.
    async fn fetch(
        &self,
        query: &Self::Query,
        page: PageRequest,
    ) -> Result<Page<Self::Item>, Error>;
}

/// Tuning for one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Quiet period before an input settles.
    pub debounce: Duration,
    /// Page size, carried by every request.
    pub page: PageRequest,
    /// Error notice text posted when a query fails.
    pub failure_notice: String,
}

impl PipelineConfig {
    /// Defaults with the given failure notice text.
    pub fn with_failure_notice(failure_notice: impl Into<String>) -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page: PageRequest::default(),
            failure_notice: failure_notice.into(),
        }
    }
}

/// Snapshot of a pipeline's result slot.
#[derive(Debug)]
pub struct QueryView<T> {
    /// Page currently displayed; unset until the first query succeeds.
    pub page: Option<Arc<Page<T>>>,
    /// Whether the newest issued query is still outstanding.
    pub loading: bool,
    /// Whether an input is waiting for its debounce window.
    pub pending: bool,
    /// Failure of the newest completed query, cleared by the next success.
    pub last_failure: Option<Error>,
    acknowledged: u64,
}

impl<T> Clone for QueryView<T> {
    fn clone(&self) -> Self {
        Self {
            page: self.page.clone(),
            loading: self.loading,
            pending: self.pending,
            last_failure: self.last_failure.clone(),
            acknowledged: self.acknowledged,
        }
    }
}

impl<T> QueryView<T> {
    fn initial() -> Self {
        Self {
            page: None,
            loading: true,
            pending: false,
            last_failure: None,
            acknowledged: 0,
        }
    }

    /// Whether no query is outstanding and no input is waiting to settle.
    pub fn is_idle(&self) -> bool {
        !self.loading && !self.pending
    }
}

#[derive(Debug)]
enum Command<Q> {
    Input(Q),
    Page(u32),
    Refresh,
}

/// Cloneable handle to a running pipeline task.
///
/// The task stops once every handle is dropped.
pub struct QueryPipelineHandle<Q, T> {
    commands: mpsc::UnboundedSender<Command<Q>>,
    sent: Arc<AtomicU64>,
    view: watch::Receiver<QueryView<T>>,
}

impl<Q, T> Clone for QueryPipelineHandle<Q, T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            sent: Arc::clone(&self.sent),
            view: self.view.clone(),
        }
    }
}

impl<Q, T> fmt::Debug for QueryPipelineHandle<Q, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPipelineHandle")
            .field("sent", &self.sent.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<Q, T> QueryPipelineHandle<Q, T>
where
    Q: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Start a pipeline task and issue the opening query for `initial`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<S>(
        source: Arc<S>,
        config: PipelineConfig,
        notices: NoticeQueue,
        initial: Q,
    ) -> Self
    where
        S: QuerySource<Query = Q, Item = T>,
    {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (publisher, view) = watch::channel(QueryView::initial());
        let driver = Driver {
            source,
            config,
            notices,
            publisher,
            channel: QueryChannel::new(initial),
            fetches: JoinSet::new(),
            debounce: None,
        };
        tokio::spawn(driver.run(inbox));
        Self {
            commands,
            sent: Arc::new(AtomicU64::new(0)),
            view,
        }
    }

    /// Feed a raw input; it settles after the debounce window.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the pipeline task has stopped.
    pub fn set_query(&self, query: Q) -> Result<(), Error> {
        self.send(Command::Input(query))
    }

    /// Show another page of the current settled query, bypassing debounce.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the pipeline task has stopped.
    pub fn go_to_page(&self, page_index: u32) -> Result<(), Error> {
        self.send(Command::Page(page_index))
    }

    /// Re-run the settled query at the displayed page, bypassing debounce.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the pipeline task has stopped.
    pub fn refresh(&self) -> Result<(), Error> {
        self.send(Command::Refresh)
    }

    /// Current snapshot.
    pub fn view(&self) -> QueryView<T> {
        self.view.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryView<T>> {
        self.view.clone()
    }

    /// Wait until every command sent so far is processed and the pipeline is
    /// idle.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the pipeline task stops while waiting.
    pub async fn settled(&self) -> Result<QueryView<T>, Error> {
        let target = self.sent.load(Ordering::Acquire);
        let mut view = self.view.clone();
        let settled = view
            .wait_for(|snapshot| snapshot.acknowledged >= target && snapshot.is_idle())
            .await
            .map_err(|_| stopped())?;
        Ok(settled.clone())
    }

    fn send(&self, command: Command<Q>) -> Result<(), Error> {
        self.sent.fetch_add(1, Ordering::AcqRel);
        self.commands.send(command).map_err(|_| stopped())
    }
}

fn stopped() -> Error {
    Error::internal("query pipeline stopped")
}

type Fetched<T> = (u64, u32, Result<Page<T>, Error>);

struct Driver<S: QuerySource> {
    source: Arc<S>,
    config: PipelineConfig,
    notices: NoticeQueue,
    publisher: watch::Sender<QueryView<S::Item>>,
    channel: QueryChannel<S::Query>,
    fetches: JoinSet<Fetched<S::Item>>,
    debounce: Option<Instant>,
}

impl<S: QuerySource> Driver<S> {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command<S::Query>>) {
        let opening = self.channel.start();
        self.launch(opening);
        self.publish(|_| {});

        loop {
            let deadline = self.debounce.unwrap_or_else(Instant::now);
            tokio::select! {
                command = inbox.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command);
                    self.publish(|view| view.acknowledged += 1);
                }
                () = sleep_until(deadline), if self.debounce.is_some() => {
                    self.debounce = None;
                    if let Some(issue) = self.channel.settle() {
                        self.launch(issue);
                    } else {
                        debug!("settled input unchanged; query suppressed");
                    }
                    self.publish(|_| {});
                }
                Some(joined) = self.fetches.join_next(), if !self.fetches.is_empty() => {
                    match joined {
                        Ok(fetched) => self.complete(fetched),
                        Err(error) => warn!(%error, "query task aborted"),
                    }
                }
            }
        }
        debug!("query pipeline stopped");
    }

    fn handle(&mut self, command: Command<S::Query>) {
        match command {
            Command::Input(query) => {
                self.channel.on_input(query);
                self.debounce = Some(Instant::now() + self.config.debounce);
            }
            Command::Page(page_index) => {
                let issue = self.channel.request_page(page_index);
                self.launch(issue);
            }
            Command::Refresh => {
                let issue = self.channel.refresh();
                self.launch(issue);
            }
        }
    }

    fn launch(&mut self, issue: Issue<S::Query>) {
        let Issue {
            generation,
            query,
            page_index,
        } = issue;
        debug!(generation, ?query, page_index, "query issued");
        let source = Arc::clone(&self.source);
        let request = self.config.page.with_index(page_index);
        self.fetches.spawn(async move {
            let result = source.fetch(&query, request).await;
            (generation, page_index, result)
        });
    }

    fn complete(&mut self, (generation, page_index, result): Fetched<S::Item>) {
        if self.channel.complete(generation) == Freshness::Stale {
            debug!(
                generation,
                current = self.channel.generation(),
                "stale query result discarded"
            );
            return;
        }
        match result {
            Ok(page) => {
                self.channel.displayed(page_index);
                self.publish(|view| {
                    view.page = Some(Arc::new(page));
                    view.last_failure = None;
                });
            }
            Err(error) => {
                warn!(generation, %error, "query failed; keeping previous page");
                self.notices.error(self.config.failure_notice.as_str());
                self.publish(|view| view.last_failure = Some(error));
            }
        }
    }

    fn publish(&self, update: impl FnOnce(&mut QueryView<S::Item>)) {
        let loading = self.channel.is_loading();
        let pending = self.channel.has_pending();
        self.publisher.send_modify(|view| {
            update(view);
            view.loading = loading;
            view.pending = pending;
        });
    }
}

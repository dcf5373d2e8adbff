use anyhow::Result;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::constants::constants;
use crate::filters::{FilterWatch, Filters};
use crate::guard::SequenceGuard;
use crate::pagination::{LoadMode, Pagination};
use crate::query::{QueryDescriptor, ResultPage, Sort};
use crate::source::PageSource;

/// A finished fetch, tagged with the token it was issued under.
///
/// The outer `Err` carries the payload of a source that panicked.
struct Completion<T> {
  token: u64,
  mode: LoadMode,
  result: std::thread::Result<Result<ResultPage<T>>>,
}

/// What happened when a completion was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Fresh response merged into state.
  Applied,
  /// Fresh request failed; the error message is set.
  Failed,
  /// Superseded by a later request; state untouched.
  Stale,
}

/// Observable state of one search controller.
///
/// Only the owning [`SearchController`] mutates it.
#[derive(Debug)]
pub struct ControllerState<T> {
  keyword: String,
  filters: FilterWatch,
  pages: Pagination<T>,
  loading: bool,
  loading_more: bool,
  error: Option<String>,
}

impl<T> ControllerState<T> {
  pub fn keyword(&self) -> &str {
    &self.keyword
  }

  pub fn category(&self) -> &str {
    &self.filters.current().category
  }

  pub fn sort(&self) -> Sort {
    self.filters.current().sort
  }

  pub fn page(&self) -> usize {
    self.pages.page()
  }

  pub fn page_size(&self) -> usize {
    self.pages.page_size()
  }

  pub fn total(&self) -> u64 {
    self.pages.total()
  }

  pub fn items(&self) -> &[T] {
    self.pages.items()
  }

  pub fn has_more(&self) -> bool {
    self.pages.has_more()
  }

  pub fn total_pages(&self) -> usize {
    self.pages.total_pages()
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn is_loading_more(&self) -> bool {
    self.loading_more
  }

  pub fn in_flight(&self) -> bool {
    self.loading || self.loading_more
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }
}

/// Drives keyword/filter queries against a paginated [`PageSource`].
///
/// Trigger methods (`search`, `load_more`, `go_page`, ...) mutate state and
/// spawn the fetch; they never wait. Results come back over a channel and are
/// merged by `poll_pending`, `next_completion` or `settle`. Every fetch carries
/// a token from the [`SequenceGuard`], and only the most recently issued one is
/// ever applied, whatever order responses arrive in.
pub struct SearchController<S: PageSource> {
  source: Arc<S>,
  state: ControllerState<S::Item>,
  guard: SequenceGuard,
  /// Page the current list corresponds to; restored when the fresh request fails.
  applied_page: usize,
  outstanding: usize,
  tx: mpsc::UnboundedSender<Completion<S::Item>>,
  rx: mpsc::UnboundedReceiver<Completion<S::Item>>,
}

impl<S: PageSource> SearchController<S> {
  pub fn new(source: Arc<S>, page_size: usize) -> Self {
    Self::with_filters(source, page_size, Filters::default())
  }

  pub fn with_filters(source: Arc<S>, page_size: usize, filters: Filters) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source,
      state: ControllerState {
        keyword: String::new(),
        filters: FilterWatch::new(filters),
        pages: Pagination::new(page_size),
        loading: false,
        loading_more: false,
        error: None,
      },
      guard: SequenceGuard::new(),
      applied_page: 1,
      outstanding: 0,
      tx,
      rx,
    }
  }

  pub fn state(&self) -> &ControllerState<S::Item> {
    &self.state
  }

  pub fn request_seq(&self) -> u64 {
    self.guard.current()
  }

  /// Number of spawned fetches whose completion has not been applied yet.
  pub fn outstanding(&self) -> usize {
    self.outstanding
  }

  /// Edit the keyword without reloading. It takes effect on the next `search`.
  pub fn set_keyword(&mut self, keyword: &str) {
    self.state.keyword = keyword.to_string();
  }

  /// Explicit search: optionally replace the keyword, then reload page 1.
  ///
  /// Always issues a request, even while another is in flight; the newer one wins.
  pub fn search(&mut self, keyword: Option<&str>) {
    if let Some(k) = keyword {
      self.state.keyword = k.to_string();
    }
    info!(keyword = %self.state.keyword.trim(), "search: reset");
    self.reset();
  }

  /// Fetch the next page and append it.
  ///
  /// Returns `false` without touching the network when a load is in flight or
  /// everything has been fetched.
  pub fn load_more(&mut self) -> bool {
    if self.state.in_flight() {
      debug!("load_more: skipped, request in flight");
      return false;
    }
    if self.state.pages.is_exhausted() {
      debug!(total = self.state.pages.total(), "load_more: skipped, nothing left");
      return false;
    }
    self.state.pages.page += 1;
    self.state.loading_more = true;
    self.state.loading = false;
    self.dispatch(LoadMode::Append);
    true
  }

  /// Jump to `page` (clamped into `1..=total_pages`) and replace the list.
  ///
  /// A jump to the current page or while a load is in flight is rejected.
  pub fn go_page(&mut self, page: usize) -> bool {
    let target = self.state.pages.clamp_page(page);
    if target == self.state.pages.page {
      debug!(page = target, "go_page: already there");
      return false;
    }
    if self.state.in_flight() {
      debug!(page = target, "go_page: rejected, request in flight");
      return false;
    }
    info!(from = self.state.pages.page, to = target, "go_page");
    self.state.pages.page = target;
    self.state.loading = true;
    self.state.loading_more = false;
    self.dispatch(LoadMode::Replace);
    true
  }

  /// Change the page size and reload from page 1. Equal sizes are a no-op.
  pub fn set_page_size(&mut self, size: usize) -> bool {
    let next = size.max(1);
    if next == self.state.pages.page_size {
      return false;
    }
    info!(from = self.state.pages.page_size, to = next, "page size changed");
    self.state.pages.page_size = next;
    self.reset();
    true
  }

  pub fn set_category(&mut self, category: &str) -> bool {
    self.update_filters(|f| f.category = category.to_string())
  }

  pub fn set_sort(&mut self, sort: Sort) -> bool {
    self.update_filters(|f| f.sort = sort)
  }

  pub fn set_filters(&mut self, filters: Filters) -> bool {
    self.update_filters(move |f| *f = filters)
  }

  /// Single entry point for filter writes. A real change reloads page 1 exactly once.
  fn update_filters(&mut self, edit: impl FnOnce(&mut Filters)) -> bool {
    if !self.state.filters.update(edit) {
      return false;
    }
    let f = self.state.filters.current();
    info!(category = %f.category, sort = %f.sort, "filters changed");
    self.reset();
    true
  }

  fn reset(&mut self) {
    self.state.pages.page = 1;
    self.state.loading = true;
    self.state.loading_more = false;
    self.dispatch(LoadMode::Replace);
  }

  fn dispatch(&mut self, mode: LoadMode) {
    let token = self.guard.issue();
    let f = self.state.filters.current();
    let query =
      QueryDescriptor::new(&self.state.keyword, &f.category, f.sort, self.state.pages.page, self.state.pages.page_size);
    self.state.error = None;
    self.outstanding += 1;
    debug!(token, page = query.page, page_size = query.page_size, ?mode, "dispatch");

    let source = Arc::clone(&self.source);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = AssertUnwindSafe(source.fetch_page(&query)).catch_unwind().await;
      let _ = tx.send(Completion { token, mode, result });
    });
  }

  /// Apply every completion that has already arrived. Never waits.
  ///
  /// Returns `true` if any fresh completion changed state.
  pub fn poll_pending(&mut self) -> bool {
    let mut changed = false;
    while let Ok(done) = self.rx.try_recv() {
      changed |= self.apply(done) != Outcome::Stale;
    }
    changed
  }

  /// Wait for the next completion and apply it. `None` when nothing is outstanding.
  pub async fn next_completion(&mut self) -> Option<Outcome> {
    if self.outstanding == 0 {
      return None;
    }
    let done = self.rx.recv().await?;
    Some(self.apply(done))
  }

  /// Wait until every issued request has completed.
  pub async fn settle(&mut self) {
    while self.next_completion().await.is_some() {}
  }

  /// Merge one completion. A panic inside the source is re-raised here, on the
  /// owner's task, once the bookkeeping no longer counts it as in flight.
  fn apply(&mut self, done: Completion<S::Item>) -> Outcome {
    self.outstanding = self.outstanding.saturating_sub(1);
    let fresh = self.guard.is_fresh(done.token);
    let result = match done.result {
      Ok(result) => result,
      Err(payload) => {
        error!(token = done.token, fresh, "page source panicked");
        if fresh {
          self.state.loading = false;
          self.state.loading_more = false;
          self.state.pages.page = self.applied_page;
        }
        panic::resume_unwind(payload);
      }
    };
    if !fresh {
      match result {
        Ok(_) => debug!(token = done.token, latest = self.guard.current(), "stale response dropped"),
        Err(e) => debug!(token = done.token, err = %e, "stale failure dropped"),
      }
      return Outcome::Stale;
    }

    self.state.loading = false;
    self.state.loading_more = false;
    match result {
      Ok(page) => {
        debug!(token = done.token, page = page.page, items = page.list.len(), total = page.total, "response applied");
        self.state.pages.apply(page, done.mode);
        self.applied_page = self.state.pages.page;
        self.state.error = None;
        Outcome::Applied
      }
      Err(e) => {
        warn!(token = done.token, err = %format!("{e:#}"), "search request failed");
        self.state.pages.page = self.applied_page;
        self.state.error = Some(constants().load_failed_message.clone());
        Outcome::Failed
      }
    }
  }
}

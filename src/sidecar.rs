use anyhow::Result;
use std::future::Future;
use tracing::{info, warn};

/// A side list fetched once per mount, independent of the paginated results.
#[derive(Debug, Clone)]
pub struct Sidecar<T> {
  name: &'static str,
  list: Vec<T>,
  error: Option<String>,
  loaded: bool,
}

impl<T> Sidecar<T> {
  pub fn new(name: &'static str) -> Self {
    Self { name, list: Vec::new(), error: None, loaded: false }
  }

  pub fn list(&self) -> &[T] {
    &self.list
  }

  /// Why the fetch failed, if it did. The list stays empty in that case.
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  /// Await `fetch` and store its outcome.
  ///
  /// A failure is recorded on this sidecar only, so one broken list never
  /// blocks the search results or the other sidecars. Repeated calls after a
  /// completed load are ignored.
  pub async fn load<F>(&mut self, fetch: F)
  where
    F: Future<Output = Result<Vec<T>>>,
  {
    if self.loaded {
      return;
    }
    match fetch.await {
      Ok(list) => {
        info!(sidecar = self.name, items = list.len(), "sidecar loaded");
        self.list = list;
        self.error = None;
      }
      Err(e) => {
        warn!(sidecar = self.name, err = %format!("{e:#}"), "sidecar failed");
        self.error = Some(format!("{e:#}"));
      }
    }
    self.loaded = true;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use anyhow::anyhow;

  #[tokio::test]
  async fn stores_list_on_success() {
    let mut hot: Sidecar<u32> = Sidecar::new("hot");
    assert!(!hot.is_loaded());
    hot.load(async { Ok(vec![1, 2, 3]) }).await;
    assert!(hot.is_loaded());
    assert_eq!(hot.list(), &[1, 2, 3]);
    assert_eq!(hot.error(), None);
  }

  #[tokio::test]
  async fn failure_is_kept_local() {
    let mut hot: Sidecar<u32> = Sidecar::new("hot");
    hot.load(async { Err(anyhow!("hot list offline")) }).await;
    assert!(hot.is_loaded());
    assert!(hot.list().is_empty());
    assert_eq!(hot.error(), Some("hot list offline"));
  }

  #[tokio::test]
  async fn loads_only_once() {
    let mut hot: Sidecar<u32> = Sidecar::new("hot");
    hot.load(async { Ok(vec![1]) }).await;
    hot.load(async { Ok(vec![9, 9]) }).await;
    assert_eq!(hot.list(), &[1]);
  }

  #[tokio::test]
  async fn sibling_sidecars_are_independent() {
    let mut daily: Sidecar<u32> = Sidecar::new("daily");
    let mut recommend: Sidecar<u32> = Sidecar::new("recommend");
    tokio::join!(daily.load(async { Err(anyhow!("boom")) }), recommend.load(async { Ok(vec![7, 8]) }));
    assert!(daily.error().is_some());
    assert_eq!(recommend.list(), &[7, 8]);
  }
}

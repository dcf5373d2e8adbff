//! Test doubles shared by the controller and facade tests.

use anyhow::{Result, anyhow};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::query::{QueryDescriptor, ResultPage};
use crate::source::PageSource;

/// What a held request should resolve to once released.
pub enum Reply {
  Page { len: usize, total: u64 },
  Fail,
}

struct Held {
  query: QueryDescriptor,
  release: oneshot::Sender<Reply>,
}

/// A page source that parks every request until the test releases it.
///
/// Lets tests resolve overlapping requests in any order. Items are `page * 1000 + index`
/// so assertions can tell which page an item came from.
#[derive(Default)]
pub struct GatedSource {
  held: Mutex<Vec<Held>>,
  calls: Mutex<Vec<QueryDescriptor>>,
}

impl GatedSource {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every descriptor the controller has dispatched, in issue order.
  pub fn calls(&self) -> Vec<QueryDescriptor> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }

  /// Let the spawned fetch tasks reach their gates.
  pub async fn wait_for_calls(&self, n: usize) {
    for _ in 0..1000 {
      if self.held.lock().unwrap().len() >= n {
        return;
      }
      tokio::task::yield_now().await;
    }
    panic!("expected {n} held requests, got {}", self.held.lock().unwrap().len());
  }

  /// Release the oldest held request matching `pred`.
  pub fn release_where(&self, pred: impl Fn(&QueryDescriptor) -> bool, reply: Reply) -> QueryDescriptor {
    let mut held = self.held.lock().unwrap();
    let idx = held.iter().position(|h| pred(&h.query)).expect("no held request matches");
    let h = held.remove(idx);
    let _ = h.release.send(reply);
    h.query
  }

  pub fn release_page(&self, page: usize, reply: Reply) -> QueryDescriptor {
    self.release_where(|q| q.page == page, reply)
  }

  pub fn release_keyword(&self, keyword: &str, reply: Reply) -> QueryDescriptor {
    self.release_where(|q| q.keyword.as_deref() == Some(keyword), reply)
  }
}

impl PageSource for GatedSource {
  type Item = u64;

  async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<u64>> {
    let (tx, rx) = oneshot::channel();
    self.calls.lock().unwrap().push(query.clone());
    self.held.lock().unwrap().push(Held { query: query.clone(), release: tx });
    match rx.await.map_err(|_| anyhow!("gate dropped"))? {
      Reply::Page { len, total } => Ok(ResultPage {
        list: (0..len as u64).map(|i| query.page as u64 * 1000 + i).collect(),
        total,
        page: query.page,
        page_size: query.page_size,
      }),
      Reply::Fail => Err(anyhow!("backend unavailable")),
    }
  }
}

use anyhow::Result;
use std::future::Future;

use crate::query::{QueryDescriptor, ResultPage};

/// A paginated backend the search controller queries.
///
/// Calls may be slow and may complete in any order. Implementations must echo
/// the effective page, page size and total so the controller can correct
/// itself against server-side clamping.
pub trait PageSource: Send + Sync + 'static {
  type Item: Clone + Send + 'static;

  fn fetch_page(&self, query: &QueryDescriptor) -> impl Future<Output = Result<ResultPage<Self::Item>>> + Send;
}

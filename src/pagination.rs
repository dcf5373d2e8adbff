use crate::query::ResultPage;

/// How a fetched page is merged into the accumulated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
  /// "Load more": concatenate onto the existing list.
  Append,
  /// Search reset, filter reload, page jump or page-size change: discard and substitute.
  Replace,
}

/// Page bookkeeping plus the items accumulated so far.
///
/// `has_more` and `total_pages` are derived on every read so they can never
/// drift from `items`/`total`.
#[derive(Debug, Clone)]
pub struct Pagination<T> {
  pub(crate) page: usize,
  pub(crate) page_size: usize,
  pub(crate) total: u64,
  pub(crate) items: Vec<T>,
  /// Set by the first applied response; before that `total` means nothing.
  loaded: bool,
}

impl<T> Pagination<T> {
  pub fn new(page_size: usize) -> Self {
    Self { page: 1, page_size: page_size.max(1), total: 0, items: Vec::new(), loaded: false }
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn has_more(&self) -> bool {
    (self.items.len() as u64) < self.total
  }

  /// Load-more is pointless once a response has been applied and the list
  /// holds everything the backend reported, including an empty result set.
  pub fn is_exhausted(&self) -> bool {
    self.loaded && !self.has_more()
  }

  /// Never less than 1, even for an empty result set.
  pub fn total_pages(&self) -> usize {
    let size = self.page_size.max(1) as u64;
    self.total.div_ceil(size).max(1) as usize
  }

  pub fn clamp_page(&self, page: usize) -> usize {
    page.clamp(1, self.total_pages())
  }

  /// Merge a fresh response. The response's page numbers and total overwrite ours.
  pub fn apply(&mut self, page: ResultPage<T>, mode: LoadMode) {
    self.total = page.total;
    self.page = page.page.max(1);
    self.page_size = page.page_size.max(1);
    self.loaded = true;
    match mode {
      LoadMode::Append => self.items.extend(page.list),
      LoadMode::Replace => self.items = page.list,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page_of(range: std::ops::Range<u32>, total: u64, page: usize, page_size: usize) -> ResultPage<u32> {
    ResultPage { list: range.collect(), total, page, page_size }
  }

  #[test]
  fn total_pages_is_at_least_one() {
    for size in [1, 10, 15, 100] {
      let p: Pagination<u32> = Pagination::new(size);
      assert_eq!(p.total_pages(), 1);
    }
  }

  #[test]
  fn total_pages_rounds_up() {
    let mut p: Pagination<u32> = Pagination::new(15);
    p.total = 188;
    assert_eq!(p.total_pages(), 13);
    p.total = 180;
    assert_eq!(p.total_pages(), 12);
  }

  #[test]
  fn clamp_page_bounds() {
    let mut p: Pagination<u32> = Pagination::new(10);
    p.total = 217;
    assert_eq!(p.clamp_page(0), 1);
    assert_eq!(p.clamp_page(99), 22);
    assert_eq!(p.clamp_page(7), 7);
  }

  #[test]
  fn append_keeps_order_and_duplicates() {
    let mut p = Pagination::new(3);
    p.apply(page_of(0..3, 7, 1, 3), LoadMode::Replace);
    p.apply(page_of(2..5, 7, 2, 3), LoadMode::Append);
    assert_eq!(p.items(), &[0, 1, 2, 2, 3, 4]);
    assert_eq!(p.page(), 2);
    assert!(p.has_more());
  }

  #[test]
  fn replace_discards_previous_items() {
    let mut p = Pagination::new(3);
    p.apply(page_of(0..3, 7, 1, 3), LoadMode::Replace);
    p.apply(page_of(6..7, 7, 3, 3), LoadMode::Replace);
    assert_eq!(p.items(), &[6]);
    assert_eq!(p.page(), 3);
  }

  #[test]
  fn server_page_numbers_win() {
    let mut p: Pagination<u32> = Pagination::new(10);
    p.page = 5;
    p.apply(page_of(0..4, 4, 1, 50), LoadMode::Replace);
    assert_eq!(p.page(), 1);
    assert_eq!(p.page_size(), 50);
    assert!(!p.has_more());
    assert!(p.is_exhausted());
  }

  #[test]
  fn nothing_applied_is_not_exhausted() {
    let p: Pagination<u32> = Pagination::new(10);
    assert!(!p.has_more());
    assert!(!p.is_exhausted());
  }

  #[test]
  fn empty_result_set_is_exhausted() {
    let mut p: Pagination<u32> = Pagination::new(10);
    p.apply(page_of(0..0, 0, 1, 10), LoadMode::Replace);
    assert!(p.items().is_empty());
    assert!(p.is_exhausted());
    assert_eq!(p.total_pages(), 1);
  }
}

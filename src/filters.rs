use crate::query::{ALL_CATEGORIES, Sort};

/// The composite key whose changes trigger an automatic reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filters {
  pub category: String,
  pub sort: Sort,
}

impl Default for Filters {
  fn default() -> Self {
    Self { category: ALL_CATEGORIES.to_string(), sort: Sort::default() }
  }
}

/// Observes filter writes and reports each real change exactly once.
///
/// Every filter mutation must go through [`FilterWatch::update`]; the caller
/// turns a `true` return into a page-1 replace reload. Writing a value equal to
/// the current one is not a change. The keyword is deliberately not part of the
/// key: it only takes effect on an explicit search.
#[derive(Debug, Clone, Default)]
pub struct FilterWatch {
  current: Filters,
}

impl FilterWatch {
  pub fn new(initial: Filters) -> Self {
    Self { current: initial }
  }

  pub fn current(&self) -> &Filters {
    &self.current
  }

  /// Apply `edit` to a copy of the key; commit and return `true` if it changed.
  pub fn update(&mut self, edit: impl FnOnce(&mut Filters)) -> bool {
    let mut next = self.current.clone();
    edit(&mut next);
    if next == self.current {
      return false;
    }
    self.current = next;
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_all_latest() {
    let watch = FilterWatch::default();
    assert_eq!(watch.current().category, "all");
    assert_eq!(watch.current().sort, Sort::Latest);
  }

  #[test]
  fn same_value_is_not_a_change() {
    let mut watch = FilterWatch::default();
    assert!(!watch.update(|f| f.category = "all".into()));
    assert!(!watch.update(|f| f.sort = Sort::Latest));
  }

  #[test]
  fn each_change_reported_once() {
    let mut watch = FilterWatch::default();
    assert!(watch.update(|f| f.category = "movie".into()));
    assert!(!watch.update(|f| f.category = "movie".into()));
    assert!(watch.update(|f| f.sort = Sort::Hot));
    assert_eq!(watch.current(), &Filters { category: "movie".into(), sort: Sort::Hot });
  }

  #[test]
  fn combined_edit_is_one_change() {
    let mut watch = FilterWatch::default();
    let changed = watch.update(|f| {
      f.category = "game".into();
      f.sort = Sort::All;
    });
    assert!(changed);
  }

  #[test]
  fn edit_that_reverts_itself_is_not_a_change() {
    let mut watch = FilterWatch::default();
    assert!(!watch.update(|f| {
      f.sort = Sort::Hot;
      f.sort = Sort::Latest;
    }));
  }
}

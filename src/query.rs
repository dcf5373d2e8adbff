use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Result ordering requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
  #[default]
  Latest,
  Hot,
  All,
}

impl Sort {
  pub fn as_str(self) -> &'static str {
    match self {
      Sort::Latest => "latest",
      Sort::Hot => "hot",
      Sort::All => "all",
    }
  }
}

impl fmt::Display for Sort {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Everything a page source needs to answer one request.
///
/// Built fresh from controller state at dispatch time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
  /// Trimmed keyword; `None` when the input was blank.
  pub keyword: Option<String>,
  pub category: String,
  pub sort: Sort,
  pub page: usize,
  pub page_size: usize,
}

impl QueryDescriptor {
  pub fn new(keyword: &str, category: &str, sort: Sort, page: usize, page_size: usize) -> Self {
    let keyword = Some(keyword.trim()).filter(|k| !k.is_empty()).map(str::to_string);
    Self { keyword, category: category.to_string(), sort, page: page.max(1), page_size: page_size.max(1) }
  }

  /// Render as HTTP query pairs. The keyword is omitted when absent.
  pub fn params(&self) -> Vec<(&'static str, String)> {
    let mut out = Vec::with_capacity(5);
    if let Some(ref keyword) = self.keyword {
      out.push(("keyword", keyword.clone()));
    }
    out.push(("category", self.category.clone()));
    out.push(("sort", self.sort.to_string()));
    out.push(("page", self.page.to_string()));
    out.push(("pageSize", self.page_size.to_string()));
    out
  }
}

/// One page of results as reported by the backend.
///
/// `page` and `page_size` are authoritative: the server may have clamped them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
  pub list: Vec<T>,
  pub total: u64,
  pub page: usize,
  pub page_size: usize,
}

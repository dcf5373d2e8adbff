use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::controller::SearchController;
use crate::filters::Filters;
use crate::sidecar::Sidecar;
use crate::source::PageSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCategory {
  pub key: String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceItem {
  pub id: String,
  pub title: String,
  pub category: String,
  pub extracted_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cover_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quality_tag: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rating: Option<f32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub views: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub size: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hot: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub download_url: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
}

/// Entry of the daily/recommended hot lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotItem {
  pub id: String,
  pub rank: u32,
  pub title: String,
  pub url: String,
}

/// Resource search backend: the paginated search plus three side lists.
pub trait ResourceBackend: PageSource<Item = ResourceItem> {
  fn categories(&self) -> impl Future<Output = Result<Vec<ResourceCategory>>> + Send;
  fn hot_daily(&self) -> impl Future<Output = Result<Vec<HotItem>>> + Send;
  fn hot_recommend(&self) -> impl Future<Output = Result<Vec<HotItem>>> + Send;
}

/// Resource search page: filterable results plus category and hot lists.
pub struct ResourceSearch<B: ResourceBackend> {
  pub results: SearchController<B>,
  pub categories: Sidecar<ResourceCategory>,
  pub hot_daily: Sidecar<HotItem>,
  pub hot_recommend: Sidecar<HotItem>,
}

impl<B: ResourceBackend> ResourceSearch<B> {
  pub async fn mount(backend: Arc<B>, page_size: usize) -> Self {
    Self::mount_with(backend, page_size, Filters::default()).await
  }

  /// Start the first search with `filters` and fetch the side lists concurrently.
  ///
  /// Each side list fails on its own; the search results never wait on them.
  pub async fn mount_with(backend: Arc<B>, page_size: usize, filters: Filters) -> Self {
    let mut results = SearchController::with_filters(Arc::clone(&backend), page_size, filters);
    results.search(None);

    let mut categories = Sidecar::new("resource.categories");
    let mut hot_daily = Sidecar::new("resource.hot.daily");
    let mut hot_recommend = Sidecar::new("resource.hot.recommend");
    futures::join!(
      categories.load(backend.categories()),
      hot_daily.load(backend.hot_daily()),
      hot_recommend.load(backend.hot_recommend())
    );
    info!(
      categories = categories.list().len(),
      daily = hot_daily.list().len(),
      recommend = hot_recommend.list().len(),
      "resource search mounted"
    );
    Self { results, categories, hot_daily, hot_recommend }
  }

  /// Display name for a category key, falling back to the key itself.
  pub fn category_name<'a>(&'a self, key: &'a str) -> &'a str {
    self.categories.list().iter().find(|c| c.key == key).map_or(key, |c| c.name.as_str())
  }
}

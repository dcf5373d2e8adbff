use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

use crate::music::{MusicBackend, MusicHotItem, MusicItem};
use crate::query::{QueryDescriptor, ResultPage};
use crate::resource::{HotItem, ResourceBackend, ResourceCategory, ResourceItem};
use crate::source::PageSource;

/// `{code, message, data}` wrapper every endpoint responds with. `code == 0` means success.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
  pub code: i64,
  #[serde(default)]
  pub message: String,
  pub data: Option<T>,
}

impl<T> Envelope<T> {
  pub fn into_data(self) -> Result<T> {
    if self.code != 0 {
      return Err(anyhow!("API error {}: {}", self.code, self.message));
    }
    self.data.ok_or_else(|| anyhow!("API response missing data"))
  }
}

/// Payload of list-only endpoints (hot lists, categories).
#[derive(Debug, Deserialize)]
struct ListData<T> {
  list: Vec<T>,
}

/// Thin HTTP client over the JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base: String,
}

impl ApiClient {
  pub fn new(base: &str, timeout: Duration) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build().context("Failed to build HTTP client")?;
    Ok(Self { http, base: base.trim_end_matches('/').to_string() })
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base, path)
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
    let url = self.url(path);
    let response = self
      .http
      .get(&url)
      .query(params)
      .send()
      .await
      .with_context(|| format!("Request to {} failed", url))?
      .error_for_status()
      .with_context(|| format!("{} returned an error status", url))?;
    let envelope: Envelope<T> = response.json().await.with_context(|| format!("Failed to decode {}", url))?;
    envelope.into_data().with_context(|| format!("GET {}", path))
  }

  pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
    Ok(self.get::<ListData<T>>(path, &[]).await?.list)
  }
}

/// A paginated endpoint such as `/music/search`.
pub struct RemoteSource<T> {
  client: ApiClient,
  path: &'static str,
  /// Whether the endpoint takes `category`/`sort`.
  filtered: bool,
  _item: PhantomData<fn() -> T>,
}

impl<T> RemoteSource<T> {
  pub fn new(client: ApiClient, path: &'static str) -> Self {
    Self { client, path, filtered: true, _item: PhantomData }
  }

  /// For endpoints that only understand keyword and paging.
  pub fn unfiltered(mut self) -> Self {
    self.filtered = false;
    self
  }

  fn query_params(&self, query: &QueryDescriptor) -> Vec<(&'static str, String)> {
    let mut params = query.params();
    if !self.filtered {
      params.retain(|(k, _)| !matches!(*k, "category" | "sort"));
    }
    params
  }
}

impl<T: DeserializeOwned + Clone + Send + 'static> PageSource for RemoteSource<T> {
  type Item = T;

  async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<T>> {
    self.client.get(self.path, &self.query_params(query)).await
  }
}

impl MusicBackend for RemoteSource<MusicItem> {
  async fn hot(&self) -> Result<Vec<MusicHotItem>> {
    self.client.get_list("/music/hot").await
  }
}

impl ResourceBackend for RemoteSource<ResourceItem> {
  async fn categories(&self) -> Result<Vec<ResourceCategory>> {
    self.client.get_list("/resources/categories").await
  }

  async fn hot_daily(&self) -> Result<Vec<HotItem>> {
    self.client.get_list("/resources/hot/daily").await
  }

  async fn hot_recommend(&self) -> Result<Vec<HotItem>> {
    self.client.get_list("/resources/hot/recommend").await
  }
}

pub fn music_source(client: ApiClient) -> RemoteSource<MusicItem> {
  RemoteSource::new(client, "/music/search").unfiltered()
}

pub fn resource_source(client: ApiClient) -> RemoteSource<ResourceItem> {
  RemoteSource::new(client, "/resources/search")
}

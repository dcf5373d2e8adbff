//! Deterministic in-process backend with the same shapes as the HTTP API.
//!
//! Used by `--mock` and by tests. Items are derived from their index, so the
//! same query always yields the same page.

use anyhow::{Result, bail};
use std::time::Duration;
use tracing::debug;

use crate::constants::constants;
use crate::music::{MusicBackend, MusicHotItem, MusicItem, Quality};
use crate::query::{QueryDescriptor, ResultPage, Sort};
use crate::resource::{HotItem, ResourceBackend, ResourceCategory, ResourceItem};
use crate::source::PageSource;

const DEMO_TRACKS: [&str; 3] = [
  "https://moeplayer.b0.upaiyun.com/aplayer/secretbase.mp3",
  "https://moeplayer.b0.upaiyun.com/aplayer/angel.mp3",
  "https://moeplayer.b0.upaiyun.com/aplayer/snow.mp3",
];
const ARTISTS: [&str; 8] = ["Jay", "Eason", "G.E.M.", "YOASOBI", "RADWIMPS", "Aimer", "Linkin Park", "Coldplay"];
const TITLE_HEADS: [&str; 5] = ["Summer", "Starry Sky", "Seaside", "Night", "Journey"];
const TITLE_TAILS: [&str; 5] = ["Heartbeat", "Confession", "Memories", "Freedom", "Embrace"];
const VERSIONS: [&str; 4] = ["Live", "Remix", "Acoustic", "Version"];
const ALBUMS: [&str; 4] = ["Single", "Best", "Album", "EP"];

const CATEGORIES: [(&str, &str); 9] = [
  ("all", "All"),
  ("movie", "Movies"),
  ("tv", "TV Series"),
  ("anime", "Anime"),
  ("music", "Music"),
  ("game", "Games"),
  ("software", "Software"),
  ("doc", "Documents"),
  ("other", "Other"),
];
const SOURCES: [&str; 5] = ["Quark", "Baidu Netdisk", "Aliyun Drive", "Thunder", "Tianyi"];
const SUFFIXES: [&str; 8] = ["1080P", "4K", "Collection", "Subbed", "Lossless", "Complete", "Collector's", "High Bitrate"];
const QUALITY_TAGS: [&str; 6] = ["1080p", "4K", "FLAC", "Windows", "PDF", "MP3"];
const HOT_HEADS: [&str; 4] = ["Daily", "Trending", "Viral", "Picks"];
const HOT_TAILS: [&str; 5] = ["Resources", "Bundle", "Tutorial", "Movies", "Docs"];

fn pick<T: Copy>(items: &[T], n: usize) -> T {
  items[n % items.len()]
}

/// Shared knobs for the mock music and resource backends.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
  latency: Option<Duration>,
  fail_search: bool,
  fail_auxiliary: bool,
}

impl MockBackend {
  /// Delay every response by `latency`.
  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  pub fn fail_search(mut self) -> Self {
    self.fail_search = true;
    self
  }

  /// Make every side list (hot, categories) fail.
  pub fn fail_auxiliary(mut self) -> Self {
    self.fail_auxiliary = true;
    self
  }

  async fn delay(&self) {
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
  }

  async fn page<T>(&self, query: &QueryDescriptor, total: u64, make: impl Fn(usize) -> T) -> Result<ResultPage<T>> {
    self.delay().await;
    if self.fail_search {
      bail!("mock search unavailable");
    }
    let start = (query.page - 1).saturating_mul(query.page_size);
    let end = (start + query.page_size).min(total as usize);
    let list = (start..end.max(start)).map(|i| make(i + 1)).collect();
    debug!(page = query.page, page_size = query.page_size, start, end, "mock page");
    Ok(ResultPage { list, total, page: query.page, page_size: query.page_size })
  }

  async fn side_list<T>(&self, name: &str, len: usize, make: impl Fn(usize) -> T) -> Result<Vec<T>> {
    self.delay().await;
    if self.fail_auxiliary {
      bail!("mock {} unavailable", name);
    }
    Ok((1..=len).map(make).collect())
  }
}

fn song(keyword: Option<&str>, idx: usize) -> MusicItem {
  let name = match keyword {
    Some(k) => format!("{} - {}", k, pick(&VERSIONS, idx)),
    None => format!("{} {}", pick(&TITLE_HEADS, idx), pick(&TITLE_TAILS, idx / TITLE_HEADS.len())),
  };
  let qualities = match idx % 3 {
    0 => vec![Quality::Sq, Quality::Hq],
    1 => vec![Quality::Hq],
    _ => vec![Quality::Sq],
  };
  MusicItem {
    id: format!("music-{}-{}", keyword.unwrap_or("any"), idx),
    name,
    artist: pick(&ARTISTS, idx).to_string(),
    cover: format!("https://picsum.photos/seed/music-{}-{}/120/120", keyword.unwrap_or(""), idx),
    url: pick(&DEMO_TRACKS, idx).to_string(),
    sq: Some(qualities.contains(&Quality::Sq)),
    hq: Some(qualities.contains(&Quality::Hq)),
    qualities,
    album: Some(pick(&ALBUMS, idx).to_string()),
    duration: Some(120 + (idx as u32 * 37) % 200),
  }
}

fn resource(keyword: Option<&str>, category: &str, sort: Sort, idx: usize) -> ResourceItem {
  let id = format!("{}-{}-{}", category, sort, idx);
  let base = keyword.unwrap_or_else(|| pick(&["Resource", "Bundle", "HD", "Cloud", "Tutorial"], idx));
  let source = pick(&SOURCES, idx);
  let category_name = CATEGORIES.iter().find(|(k, _)| *k == category).map_or("Other", |(_, n)| n);
  let size = if idx % 2 == 0 { format!("{:.1}GB", 0.7 + (idx % 73) as f32 / 10.0) } else { format!("{}MB", 200 + (idx * 13) % 780) };
  ResourceItem {
    title: format!("{} {} #{}", base, pick(&SUFFIXES, idx), idx),
    category: category.to_string(),
    extracted_url: format!("https://example.com/share/{}", id),
    cover_url: Some(format!("https://picsum.photos/seed/{}/640/360", id)),
    quality_tag: Some(pick(&QUALITY_TAGS, idx).to_string()),
    rating: Some(3.8 + (idx % 13) as f32 / 10.0),
    views: Some(format!("{:.1}k", 1.2 + (idx % 548) as f32 / 10.0)),
    source: Some(source.to_string()),
    size: Some(size),
    updated_at: Some(format!("2024-{:02}-{:02} 12:00:00", 1 + idx % 12, 1 + idx % 28)),
    hot: Some(120 + (idx as u32 * 97) % 9680),
    download_url: Some(format!("https://example.com/download/{}", id)),
    tags: vec![category_name.to_string(), source.to_string(), if sort == Sort::Hot { "hot" } else { "latest" }.to_string()],
    id,
  }
}

fn hot_item(prefix: &str, i: usize) -> HotItem {
  let id = format!("{}-{}", prefix, i);
  HotItem {
    rank: i as u32,
    title: format!("{} {} {}", pick(&HOT_HEADS, i), pick(&HOT_TAILS, i * 3), 1 + (i * 211) % 999),
    url: format!("https://example.com/{}/{}", prefix, id),
    id,
  }
}

/// Mock music endpoints: `/music/search` and `/music/hot`.
#[derive(Debug, Clone, Default)]
pub struct MockMusic {
  backend: MockBackend,
}

impl MockMusic {
  pub fn new(backend: MockBackend) -> Self {
    Self { backend }
  }
}

impl PageSource for MockMusic {
  type Item = MusicItem;

  async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<MusicItem>> {
    let keyword = query.keyword.as_deref();
    self.backend.page(query, constants().mock_music_total, |i| song(keyword, i)).await
  }
}

impl MusicBackend for MockMusic {
  async fn hot(&self) -> Result<Vec<MusicHotItem>> {
    // hot tracks come from a separate index range so they never collide with search results
    self
      .backend
      .side_list("music hot list", constants().mock_music_hot_size, |i| MusicHotItem { item: song(None, 1000 + i), rank: i as u32 })
      .await
  }
}

/// Mock resource endpoints under `/resources`.
#[derive(Debug, Clone, Default)]
pub struct MockResources {
  backend: MockBackend,
}

impl MockResources {
  pub fn new(backend: MockBackend) -> Self {
    Self { backend }
  }
}

impl PageSource for MockResources {
  type Item = ResourceItem;

  async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<ResourceItem>> {
    let keyword = query.keyword.as_deref();
    let total = constants().mock_resource_total;
    self.backend.page(query, total, |i| resource(keyword, &query.category, query.sort, i)).await
  }
}

impl ResourceBackend for MockResources {
  async fn categories(&self) -> Result<Vec<ResourceCategory>> {
    self
      .backend
      .side_list("categories", CATEGORIES.len(), |i| {
        let (key, name) = CATEGORIES[i - 1];
        ResourceCategory { key: key.to_string(), name: name.to_string() }
      })
      .await
  }

  async fn hot_daily(&self) -> Result<Vec<HotItem>> {
    self.backend.side_list("daily hot list", constants().mock_daily_hot_size, |i| hot_item("hot", i)).await
  }

  async fn hot_recommend(&self) -> Result<Vec<HotItem>> {
    self.backend.side_list("recommend hot list", constants().mock_recommend_hot_size, |i| hot_item("recommend", i)).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::query::ALL_CATEGORIES;

  fn query(keyword: &str, page: usize, page_size: usize) -> QueryDescriptor {
    QueryDescriptor::new(keyword, ALL_CATEGORIES, Sort::Latest, page, page_size)
  }

  #[tokio::test]
  async fn music_pages_echo_request_and_total() {
    let music = MockMusic::default();
    let page = music.fetch_page(&query("", 2, 15)).await.unwrap();
    assert_eq!(page.total, 188);
    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 15);
    assert_eq!(page.list.len(), 15);
    assert_eq!(page.list[0].id, "music-any-16");
  }

  #[tokio::test]
  async fn music_last_page_is_short_and_past_end_is_empty() {
    let music = MockMusic::default();
    assert_eq!(music.fetch_page(&query("", 13, 15)).await.unwrap().list.len(), 8);
    assert!(music.fetch_page(&query("", 14, 15)).await.unwrap().list.is_empty());
  }

  #[tokio::test]
  async fn keyword_shows_up_in_titles() {
    let music = MockMusic::default();
    let page = music.fetch_page(&query("  Snow ", 1, 5)).await.unwrap();
    assert!(page.list.iter().all(|s| s.name.starts_with("Snow - ")));
    let resources = MockResources::default();
    let page = resources.fetch_page(&query("ubuntu", 1, 5)).await.unwrap();
    assert!(page.list.iter().all(|r| r.title.starts_with("ubuntu ")));
  }

  #[tokio::test]
  async fn same_query_same_page() {
    let resources = MockResources::default();
    let a = resources.fetch_page(&query("x", 3, 10)).await.unwrap();
    let b = resources.fetch_page(&query("x", 3, 10)).await.unwrap();
    assert_eq!(a, b);
  }

  #[tokio::test]
  async fn injected_failures() {
    let music = MockMusic::new(MockBackend::default().fail_search());
    assert!(music.fetch_page(&query("", 1, 15)).await.is_err());
    assert!(music.hot().await.is_ok());

    let resources = MockResources::new(MockBackend::default().fail_auxiliary());
    assert!(resources.categories().await.is_err());
    assert!(resources.fetch_page(&query("", 1, 10)).await.is_ok());
  }

  #[tokio::test]
  async fn latency_delays_results_until_settled() {
    use crate::controller::SearchController;
    use std::sync::Arc;

    let music = Arc::new(MockMusic::new(MockBackend::default().with_latency(Duration::from_millis(40))));
    let mut ctl = SearchController::new(music, 15);
    let started = std::time::Instant::now();
    ctl.search(Some("rain"));
    tokio::task::yield_now().await;
    assert!(!ctl.poll_pending());
    assert!(ctl.state().is_loading());

    ctl.settle().await;
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!(ctl.state().items().len(), 15);
    assert!(!ctl.state().in_flight());
  }

  #[tokio::test]
  async fn hot_tracks_differ_from_search_results() {
    let music = MockMusic::default();
    let hot = music.hot().await.unwrap();
    let page = music.fetch_page(&query("", 1, 15)).await.unwrap();
    assert_eq!(hot.len(), 12);
    assert!(hot.iter().all(|h| page.list.iter().all(|s| s.id != h.item.id)));
  }
}

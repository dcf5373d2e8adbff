use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::controller::SearchController;
use crate::sidecar::Sidecar;
use crate::source::PageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
  #[serde(rename = "SQ")]
  Sq,
  #[serde(rename = "HQ")]
  Hq,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicItem {
  pub id: String,
  pub name: String,
  pub artist: String,
  pub cover: String,
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sq: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hq: Option<bool>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub qualities: Vec<Quality>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub album: Option<String>,
  /// Seconds.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration: Option<u32>,
}

/// A hot-list entry: a track plus its chart position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicHotItem {
  #[serde(flatten)]
  pub item: MusicItem,
  pub rank: u32,
}

/// Music search backend: the paginated search plus the hot list.
pub trait MusicBackend: PageSource<Item = MusicItem> {
  fn hot(&self) -> impl Future<Output = Result<Vec<MusicHotItem>>> + Send;
}

/// A playable entry in the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
  pub title: String,
  pub artist: String,
  pub src: String,
  pub pic: Option<String>,
}

impl Track {
  /// Same song for playlist purposes; the cover does not count.
  fn same_song(&self, other: &Track) -> bool {
    self.src == other.src && self.title == other.title && self.artist == other.artist
  }
}

impl From<&MusicItem> for Track {
  fn from(it: &MusicItem) -> Self {
    Self { title: it.name.clone(), artist: it.artist.clone(), src: it.url.clone(), pic: Some(it.cover.clone()) }
  }
}

/// Play queue state. Playback itself happens elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
  tracks: Vec<Track>,
  current: Option<Track>,
}

impl Playlist {
  pub fn tracks(&self) -> &[Track] {
    &self.tracks
  }

  pub fn current(&self) -> Option<&Track> {
    self.current.as_ref()
  }

  fn ensure(&mut self, track: &Track) {
    if !self.tracks.iter().any(|t| t.same_song(track)) {
      self.tracks.push(track.clone());
    }
  }

  pub fn add(&mut self, track: Track) {
    self.ensure(&track);
  }

  pub fn play(&mut self, track: Track) {
    self.ensure(&track);
    self.current = Some(track);
  }

  pub fn clear(&mut self) {
    self.tracks.clear();
    self.current = None;
  }
}

/// Music search page: results controller, hot list and playlist.
pub struct MusicSearch<B: MusicBackend> {
  pub results: SearchController<B>,
  pub hot: Sidecar<MusicHotItem>,
  pub playlist: Playlist,
}

impl<B: MusicBackend> MusicSearch<B> {
  /// Start the first search and load the hot list alongside it.
  ///
  /// Returns once the hot list has settled; the first page may still be in
  /// flight and is picked up by `results.poll_pending()`/`settle()`.
  pub async fn mount(backend: Arc<B>, page_size: usize) -> Self {
    let mut results = SearchController::new(Arc::clone(&backend), page_size);
    results.search(None);
    let mut hot = Sidecar::new("music.hot");
    hot.load(backend.hot()).await;
    info!(hot = hot.list().len(), "music search mounted");
    Self { results, hot, playlist: Playlist::default() }
  }

  pub fn play_item(&mut self, item: &MusicItem) {
    debug!(id = %item.id, "play");
    self.playlist.play(Track::from(item));
  }

  pub fn add_to_playlist(&mut self, item: &MusicItem) {
    self.playlist.add(Track::from(item));
  }

  pub fn play_hot(&mut self, item: &MusicHotItem) {
    self.playlist.play(Track::from(&item.item));
  }

  pub fn clear_playlist(&mut self) {
    self.playlist.clear();
  }
}

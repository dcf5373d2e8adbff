//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available;
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Paging
  pub music_page_size: usize,
  pub resource_page_size: usize,

  // History
  pub history_limit: usize,
  pub music_history_key: String,
  pub resource_history_key: String,

  // Transport
  pub api_base: String,
  pub request_timeout_secs: u64,

  /// Generic notice surfaced when the latest request fails.
  pub load_failed_message: String,

  // Mock backend
  pub mock_music_total: u64,
  pub mock_music_hot_size: usize,
  pub mock_resource_total: u64,
  pub mock_daily_hot_size: usize,
  pub mock_recommend_hot_size: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.music_page_size, 15);
    assert_eq!(c.resource_page_size, 10);
    assert_eq!(c.history_limit, 20);
    assert!(!c.load_failed_message.is_empty());
  }
}

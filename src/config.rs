use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::constants;

/// User preferences from `prefs.toml` in the platform config directory.
///
/// Every field is optional; missing values fall back to `constants.ron`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub api_base: Option<String>,
  pub timeout_secs: Option<u64>,
  pub use_mock: Option<bool>,
  pub music_page_size: Option<usize>,
  pub resource_page_size: Option<usize>,
  pub history_limit: Option<usize>,
  /// `EnvFilter` directive used when `RUST_LOG` is unset.
  pub log_filter: Option<String>,
}

impl Config {
  pub fn path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hubsearch").map(|p| p.config_dir().join("prefs.toml"))
  }

  pub fn load() -> Self {
    if let Some(config_file) = Self::path()
      && let Ok(content) = std::fs::read_to_string(config_file)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(config_file) = Self::path()
      && let Some(config_dir) = config_file.parent()
      && std::fs::create_dir_all(config_dir).is_ok()
      && let Ok(content) = toml::to_string(self)
    {
      let _ = std::fs::write(config_file, content);
    }
  }

  pub fn api_base(&self) -> &str {
    self.api_base.as_deref().unwrap_or(&constants().api_base)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.unwrap_or(constants().request_timeout_secs).max(1))
  }

  pub fn use_mock(&self) -> bool {
    self.use_mock.unwrap_or(false)
  }

  pub fn music_page_size(&self) -> usize {
    self.music_page_size.unwrap_or(constants().music_page_size).max(1)
  }

  pub fn resource_page_size(&self) -> usize {
    self.resource_page_size.unwrap_or(constants().resource_page_size).max(1)
  }

  pub fn history_limit(&self) -> usize {
    self.history_limit.unwrap_or(constants().history_limit)
  }

  pub fn log_filter(&self) -> &str {
    self.log_filter.as_deref().unwrap_or("info")
  }
}

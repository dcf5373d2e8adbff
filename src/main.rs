use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing::info;

use hubsearch::api::{self, ApiClient};
use hubsearch::config::Config;
use hubsearch::constants::constants;
use hubsearch::filters::Filters;
use hubsearch::history::{FileStore, HistoryCache, HistoryStore, MemoryStore};
use hubsearch::logging;
use hubsearch::mock::{MockBackend, MockMusic, MockResources};
use hubsearch::music::{MusicBackend, MusicSearch};
use hubsearch::query::{ALL_CATEGORIES, Sort};
use hubsearch::resource::{ResourceBackend, ResourceSearch};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Use the built-in mock backend instead of the HTTP API
  #[arg(long, global = true)]
  mock: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Search music and show the hot list
  Music {
    keyword: Option<String>,
    /// Load this many extra pages after the first
    #[arg(long, default_value_t = 0)]
    more: usize,
  },
  /// Search shared resources with category/sort filters
  Resources {
    keyword: Option<String>,
    #[arg(short, long, default_value = ALL_CATEGORIES)]
    category: String,
    #[arg(short, long, value_enum, default_value_t = Sort::Latest)]
    sort: Sort,
    /// Jump to this page after the first load
    #[arg(short, long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    page_size: Option<usize>,
    #[arg(long, default_value_t = 0)]
    more: usize,
  },
  /// Show or clear recent search keywords
  History {
    #[arg(value_enum, default_value_t = Feature::Music)]
    feature: Feature,
    #[arg(long)]
    clear: bool,
  },
  /// Print the config file location, writing defaults with --init
  Config {
    #[arg(long)]
    init: bool,
  },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Feature {
  Music,
  Resources,
}

impl Feature {
  fn history_key(self) -> &'static str {
    match self {
      Feature::Music => &constants().music_history_key,
      Feature::Resources => &constants().resource_history_key,
    }
  }
}

// --- Helpers ---

fn history_store() -> Arc<dyn HistoryStore> {
  match FileStore::in_data_dir() {
    Some(store) => Arc::new(store),
    None => Arc::new(MemoryStore::new()),
  }
}

fn open_history(config: &Config, feature: Feature) -> HistoryCache<String> {
  HistoryCache::builder(history_store(), feature.history_key())
    .limit(config.history_limit())
    .validator(|v| v.as_array().is_some_and(|a| a.iter().all(|e| e.is_string())))
    .build()
}

fn remember(config: &Config, feature: Feature, keyword: Option<&str>) {
  if let Some(k) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
    open_history(config, feature).push(k.to_string());
  }
}

fn print_status(error: Option<&str>, page: usize, total_pages: usize, shown: usize, total: u64) {
  if let Some(e) = error {
    println!("! {}", e);
  }
  println!("-- page {}/{} · {} of {} shown", page, total_pages, shown, total);
}

// --- Commands ---

async fn run_music<B: MusicBackend>(backend: Arc<B>, config: &Config, keyword: Option<String>, more: usize) {
  remember(config, Feature::Music, keyword.as_deref());
  let mut music = MusicSearch::mount(backend, config.music_page_size()).await;
  if keyword.is_some() {
    // supersedes the blank mount search still in flight
    music.results.search(keyword.as_deref());
  }
  music.results.settle().await;
  for _ in 0..more {
    if !music.results.load_more() {
      break;
    }
    music.results.settle().await;
  }

  if let Some(e) = music.hot.error() {
    println!("hot list unavailable: {}", e);
  } else {
    println!("Hot:");
    for hot in music.hot.list() {
      println!("  {:>2}. {} - {}", hot.rank, hot.item.name, hot.item.artist);
    }
  }

  let s = music.results.state();
  println!("Results for '{}':", s.keyword());
  for (i, it) in s.items().iter().enumerate() {
    println!("  {:>3}. {} - {} [{}]", i + 1, it.name, it.artist, it.album.as_deref().unwrap_or("-"));
  }
  print_status(s.error(), s.page(), s.total_pages(), s.items().len(), s.total());
}

struct ResourceArgs {
  keyword: Option<String>,
  filters: Filters,
  page: usize,
  page_size: Option<usize>,
  more: usize,
}

async fn run_resources<B: ResourceBackend>(backend: Arc<B>, config: &Config, args: ResourceArgs) {
  remember(config, Feature::Resources, args.keyword.as_deref());
  let page_size = args.page_size.unwrap_or_else(|| config.resource_page_size());
  let mut res = ResourceSearch::mount_with(backend, page_size, args.filters).await;
  if args.keyword.is_some() {
    res.results.search(args.keyword.as_deref());
  }
  res.results.settle().await;
  if res.results.go_page(args.page) {
    res.results.settle().await;
  }
  for _ in 0..args.more {
    if !res.results.load_more() {
      break;
    }
    res.results.settle().await;
  }

  for (label, side) in [("Daily hot", &res.hot_daily), ("Recommended", &res.hot_recommend)] {
    match side.error() {
      Some(e) => println!("{} unavailable: {}", label, e),
      None => {
        let titles: Vec<&str> = side.list().iter().take(5).map(|h| h.title.as_str()).collect();
        println!("{}: {}", label, titles.join(" | "));
      }
    }
  }

  let s = res.results.state();
  println!("Results for '{}' in {} ({}):", s.keyword(), res.category_name(s.category()), s.sort());
  for it in s.items() {
    println!(
      "  {} [{}] {} {}",
      it.title,
      it.quality_tag.as_deref().unwrap_or("-"),
      it.size.as_deref().unwrap_or("-"),
      it.extracted_url
    );
  }
  print_status(s.error(), s.page(), s.total_pages(), s.items().len(), s.total());
}

fn run_history(config: &Config, feature: Feature, clear: bool) {
  let mut history = open_history(config, feature);
  if clear {
    history.clear();
    println!("history cleared");
    return;
  }
  if history.entries().is_empty() {
    println!("(no recent searches)");
  }
  for (i, k) in history.entries().iter().enumerate() {
    println!("{:>2}. {}", i + 1, k);
  }
}

fn run_config(config: &Config, init: bool) -> Result<()> {
  let path = Config::path().context("No config directory on this platform")?;
  if init && !path.exists() {
    config.save();
    println!("wrote {}", path.display());
  } else {
    println!("{}", path.display());
  }
  Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::load();
  let _log_guard = logging::init(config.log_filter())?;
  let use_mock = args.mock || config.use_mock();
  info!(use_mock, command = ?args.command, "start");

  match args.command {
    Command::Music { keyword, more } => {
      if use_mock {
        run_music(Arc::new(MockMusic::new(MockBackend::default())), &config, keyword, more).await;
      } else {
        let client = ApiClient::new(config.api_base(), config.timeout())?;
        run_music(Arc::new(api::music_source(client)), &config, keyword, more).await;
      }
    }
    Command::Resources { keyword, category, sort, page, page_size, more } => {
      let args = ResourceArgs { keyword, filters: Filters { category, sort }, page, page_size, more };
      if use_mock {
        run_resources(Arc::new(MockResources::new(MockBackend::default())), &config, args).await;
      } else {
        let client = ApiClient::new(config.api_base(), config.timeout())?;
        run_resources(Arc::new(api::resource_source(client)), &config, args).await;
      }
    }
    Command::History { feature, clear } => run_history(&config, feature, clear),
    Command::Config { init } => run_config(&config, init)?,
  }
  Ok(())
}

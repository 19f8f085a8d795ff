use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Listing page scraped when neither the config file nor `--url` says otherwise.
pub const DEFAULT_LISTING_URL: &str =
    "https://www.franceinter.fr/emissions/tous-les-chats-sont-gris";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// What to do when two episodes resolve to the same date and title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameCollision {
    /// Keep the plain name; the second episode is skipped as already downloaded.
    #[default]
    Skip,
    /// Append a short hash of the source URL to every name.
    UrlHash,
}

/// Global configuration loaded from `~/.config/podscrape/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodscrapeConfig {
    /// Listing page holding the episode articles (page 1).
    pub listing_url: String,
    /// Directory receiving the audio files.
    pub destination: PathBuf,
    /// Connect timeout for every HTTP transfer.
    pub connect_timeout_secs: u64,
    /// Total timeout for one transfer (page or audio file).
    pub timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/s for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Optional User-Agent header sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Cap on concurrently running episode actions (None = all at once).
    #[serde(default)]
    pub max_concurrent_downloads: Option<usize>,
    #[serde(default)]
    pub name_collision: NameCollision,
    /// Copyright tag written into downloaded files. Defaults to Radio France
    /// when the key is absent; an empty string omits the tag.
    #[serde(default = "default_copyright")]
    pub copyright: Option<String>,
    /// Optional retry policy; if missing, every transfer is attempted once.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_copyright() -> Option<String> {
    Some("Radio France".to_string())
}

impl PodscrapeConfig {
    /// The copyright tag to write, if any.
    pub fn copyright_tag(&self) -> Option<&str> {
        self.copyright.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl Default for PodscrapeConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            destination: PathBuf::from("./dest"),
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            user_agent: None,
            max_concurrent_downloads: None,
            name_collision: NameCollision::Skip,
            copyright: default_copyright(),
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("podscrape")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PodscrapeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PodscrapeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PodscrapeConfig = toml::from_str(&data)?;
    Ok(cfg)
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::format::Emphasis;

pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const PROXY_ENV: &str = "YTSUM_PROXY";

const DEFAULT_LANG: &str = "en";
const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_API_BASE: &str = "https://api.deepseek.com";
const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_YTDLP: &str = "yt-dlp";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Contents of the optional config file
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub lang: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub bind: Option<String>,
    pub proxy: Option<String>,
    pub ytdlp_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_delay_secs: Option<u64>,
    pub emphasis: Option<Emphasis>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

/// Fully resolved runtime settings, built once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub lang: String,
    pub model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub bind: SocketAddr,
    pub proxy: Option<String>,
    pub ytdlp_path: String,
    pub timeout: Duration,
    pub retry_delay: Duration,
    pub emphasis: Emphasis,
}

impl Settings {
    /// Merge the config file with the process environment
    pub fn from_env(config: Config) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Merge the config file with values from `env`, which wins for the proxy
    pub fn resolve<F>(config: Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = config.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind: SocketAddr = bind.parse().wrap_err_with(|| format!("invalid bind address: {bind}"))?;

        Ok(Settings {
            lang: config.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: config
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: non_empty(API_KEY_ENV),
            bind,
            proxy: non_empty(PROXY_ENV).or(config.proxy),
            ytdlp_path: config.ytdlp_path.unwrap_or_else(|| DEFAULT_YTDLP.to_string()),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            retry_delay: Duration::from_secs(config.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS)),
            emphasis: config.emphasis.unwrap_or_default(),
        })
    }

    /// HTTP client for caption sources, routed through the proxy if set
    pub fn caption_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(ref proxy) = self.proxy {
            debug!("Routing caption requests through proxy {proxy}");
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .wrap_err_with(|| format!("invalid proxy URL: {proxy}"))?;
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }

    /// HTTP client for the completion endpoint
    pub fn api_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

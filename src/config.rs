use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{Result, ScraperError};

pub const DEFAULT_BASE_URL: &str = "https://my.dnevnik76.ru";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36";

/// Page sizes the portal accepts in the `items_perpage` cookie.
pub const PAGE_SIZES: [u16; 5] = [10, 20, 30, 50, 1000];

/// Large enough that listings honoring the cookie never paginate.
pub const DEFAULT_PAGE_SIZE: u16 = 1000;

/// Configuration for simulating human browsing behavior via randomized delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Minimum sleep duration in milliseconds between requests.
    pub min_delay_ms: u64,
    /// Maximum sleep duration in milliseconds between requests.
    pub max_delay_ms: u64,
    /// Whether the randomized delay logic is active.
    pub enabled: bool,
}

impl Default for DelayConfig {
    /// Default configuration: 1000ms - 3000ms, enabled.
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            enabled: true,
        }
    }
}

impl DelayConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// A random pause within the configured bounds, `None` when disabled.
    pub fn next_delay(&self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let (lo, hi) = if self.min_delay_ms <= self.max_delay_ms {
            (self.min_delay_ms, self.max_delay_ms)
        } else {
            (self.max_delay_ms, self.min_delay_ms)
        };
        let ms = rand::rng().random_range(lo..=hi);
        Some(Duration::from_millis(ms))
    }
}

/// Everything a session needs besides credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Value of the `items_perpage` cookie installed at session construction.
    pub page_size: u16,
    /// Verbose page dumps (pager nodes, page titles) in the debug log.
    pub debug: bool,
    pub delay: DelayConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
            debug: false,
            delay: DelayConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads `DNEVNIK_*` overrides, loading `.env` first when present.
    ///
    /// Recognized: `DNEVNIK_BASE_URL`, `DNEVNIK_USER_AGENT`,
    /// `DNEVNIK_TIMEOUT_SECS`, `DNEVNIK_PAGE_SIZE`, `DNEVNIK_DEBUG`,
    /// `DNEVNIK_DELAY_MIN_MS`, `DNEVNIK_DELAY_MAX_MS`, `DNEVNIK_DELAY`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(url) = env::var("DNEVNIK_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(ua) = env::var("DNEVNIK_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Some(secs) = parse_var("DNEVNIK_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(size) = parse_var("DNEVNIK_PAGE_SIZE")? {
            config.page_size = size;
        }
        if let Some(debug) = parse_var("DNEVNIK_DEBUG")? {
            config.debug = debug;
        }
        if let Some(ms) = parse_var("DNEVNIK_DELAY_MIN_MS")? {
            config.delay.min_delay_ms = ms;
        }
        if let Some(ms) = parse_var("DNEVNIK_DELAY_MAX_MS")? {
            config.delay.max_delay_ms = ms;
        }
        if let Some(enabled) = parse_var("DNEVNIK_DELAY")? {
            config.delay.enabled = enabled;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_page_size(self.page_size)?;
        url::Url::parse(&self.base_url)
            .map_err(|e| ScraperError::Config(format!("Bad base URL {}: {}", self.base_url, e)))?;
        Ok(())
    }
}

pub fn validate_page_size(size: u16) -> Result<()> {
    if PAGE_SIZES.contains(&size) {
        Ok(())
    } else {
        Err(ScraperError::Config(format!(
            "Page size {} is not one of {:?}",
            size, PAGE_SIZES
        )))
    }
}

/// Login identity of one pupil account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
    pub school_id: i64,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>, school_id: i64) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            school_id,
        }
    }

    /// Reads `DNEVNIK_LOGIN`, `DNEVNIK_PASSWORD` and `DNEVNIK_SCHOOL_ID`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let var = |name: &str| {
            env::var(name).map_err(|_| ScraperError::Config(format!("{} is not set", name)))
        };
        let school_id = var("DNEVNIK_SCHOOL_ID")?
            .parse()
            .map_err(|_| ScraperError::Config("DNEVNIK_SCHOOL_ID is not a number".to_string()))?;

        Ok(Self::new(
            var("DNEVNIK_LOGIN")?,
            var("DNEVNIK_PASSWORD")?,
            school_id,
        ))
    }

    /// Portal login form value: `<login>@<schoolId>`.
    pub fn portal_username(&self) -> String {
        format!("{}@{}", self.login, self.school_id)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScraperError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

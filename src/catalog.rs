//! Session-independent reference data: regions and their schools.

use reqwest::cookie::Jar;
use std::sync::Arc;

use crate::config::{ClientConfig, DelayConfig};
use crate::error::{Result, ScraperError};
use crate::models::{Region, School};
use crate::parsers;
use crate::transport::{FetchRequest, Fetcher, HttpFetcher};

const REGIONS_PATH: &str = "/ajax/kladr/?login=true";

/// Anonymous access to the portal catalogs, no login involved.
pub struct Catalog {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
    delay: DelayConfig,
}

impl Catalog {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = Arc::new(HttpFetcher::new(config, Arc::new(Jar::default()))?);
        Ok(Self::with_fetcher(fetcher, config))
    }

    /// Base URL and request pacing come from `config`.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: &ClientConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            delay: config.delay.clone(),
        }
    }

    async fn get_html(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        if let Some(pause) = self.delay.next_delay() {
            tokio::time::sleep(pause).await;
        }
        log::debug!("GET {}", url);
        let response = self.fetcher.fetch(FetchRequest::get(url.clone())).await?;
        if !response.is_success() {
            return Err(ScraperError::HttpStatus {
                url,
                status: response.status,
            });
        }
        Ok(response.body)
    }

    pub async fn get_regions(&self) -> Result<Vec<Region>> {
        let html = self.get_html(REGIONS_PATH).await?;
        parsers::catalog::parse_regions(&html)
    }

    pub async fn get_schools(&self, region_id: i64) -> Result<Vec<School>> {
        let html = self
            .get_html(&format!("/ajax/school/{}/?login=true", region_id))
            .await?;
        parsers::catalog::parse_schools(&html, region_id)
    }
}

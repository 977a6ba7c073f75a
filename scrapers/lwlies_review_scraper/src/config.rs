use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    pub index_url: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_url: "https://lwlies.com/reviews".to_string(),
            base_url: "https://lwlies.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub delay_ms: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; LwliesReviewScraper/1.0)".to_string(),
            request_timeout_secs: 10,
            delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/raw/reviews.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub site: SiteConfig,
    pub scraping: ScrapingConfig,
    pub output: OutputConfig,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(index_url) = env::var("LWLIES_INDEX_URL") {
            config.site.index_url = index_url;
        }
        if let Ok(base_url) = env::var("LWLIES_BASE_URL") {
            config.site.base_url = base_url;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Ok(timeout) = env::var("SCRAPER_TIMEOUT_SECS").map_or(Ok(None), |t| t.parse::<u64>().map(Some)) {
            if let Some(timeout) = timeout {
                config.scraping.request_timeout_secs = timeout;
            }
        }
        if let Ok(delay) = env::var("SCRAPER_DELAY_MS").map_or(Ok(None), |d| d.parse::<u64>().map(Some)) {
            if let Some(delay) = delay {
                config.scraping.delay_ms = delay;
            }
        }
        if let Ok(csv_path) = env::var("LWLIES_OUTPUT_FILE") {
            config.output.csv_path = csv_path;
        }

        config
    }
}

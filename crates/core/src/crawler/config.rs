//! Configuration for the crawler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Crawler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Site home page, fetched on a cold start to discover the locale-correct base URL.
    #[serde(default = "default_home_url")]
    pub home_url: String,

    /// Path of the first episode, appended to the base URL on a cold start.
    #[serde(default = "default_first_episode_path")]
    pub first_episode_path: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// How often a page answering with an empty body is re-requested.
    #[serde(default = "default_max_empty_retries")]
    pub max_empty_retries: u32,

    /// Base delay before re-requesting an empty page; doubles per attempt.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

fn default_home_url() -> String {
    "https://www.southparkstudios.com/".to_string()
}

fn default_first_episode_path() -> String {
    "/episodes/940f8z/south-park-cartman-gets-an-anal-probe-season-1-ep-1".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_empty_retries() -> u32 {
    5
}

fn default_retry_base_delay() -> u64 {
    500
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            first_episode_path: default_first_episode_path(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            max_empty_retries: default_max_empty_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

impl CrawlerConfig {
    /// Backoff before retry number `attempt` (0-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(10);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        let config = CrawlerConfig {
            retry_base_delay_ms: 100,
            ..Default::default()
        };
        assert_eq!(config.retry_delay(0), Duration::from_millis(100));
        assert_eq!(config.retry_delay(1), Duration::from_millis(200));
        assert_eq!(config.retry_delay(3), Duration::from_millis(800));
        // Capped exponent
        assert_eq!(config.retry_delay(40), config.retry_delay(10));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CrawlerConfig = toml::from_str("max_empty_retries = 2").unwrap();
        assert_eq!(config.max_empty_retries, 2);
        assert_eq!(config.home_url, "https://www.southparkstudios.com/");
        assert_eq!(config.timeout_secs, 30);
    }
}

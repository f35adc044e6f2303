use once_cell::sync::Lazy;
use regex_lite::Regex;
use url::Url;

use super::{types::Config, ConfigError};

static RATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[KMG]$").unwrap());

/// Whether `rate` looks like `512K`, `1M` or `2G`.
pub fn is_valid_rate(rate: &str) -> bool {
    RATE.is_match(rate)
}

/// Validate configuration
/// Currently validates:
/// - Download rate matches `^\d+[KMG]$`
/// - Home URL is an absolute http(s) URL
/// - First episode path is absolute
/// - Timeout and fragment concurrency are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !is_valid_rate(&config.downloader.min_rate) {
        return Err(ConfigError::ValidationError(format!(
            "invalid min rate {:?}, must match {}",
            config.downloader.min_rate,
            RATE.as_str()
        )));
    }

    match Url::parse(&config.crawler.home_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return Err(ConfigError::ValidationError(format!(
                "crawler.home_url must be an absolute http(s) URL, got {:?}",
                config.crawler.home_url
            )))
        }
    }

    if !config.crawler.first_episode_path.starts_with('/') {
        return Err(ConfigError::ValidationError(
            "crawler.first_episode_path must start with '/'".to_string(),
        ));
    }

    if config.crawler.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "crawler.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.downloader.concurrent_fragments == Some(0) {
        return Err(ConfigError::ValidationError(
            "downloader.concurrent_fragments cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rate_pattern() {
        for rate in ["1M", "512K", "2G", "100M"] {
            assert!(is_valid_rate(rate), "{}", rate);
        }
        for rate in ["", "M", "1", "1m", "1.5M", "1MB", " 1M"] {
            assert!(!is_valid_rate(rate), "{}", rate);
        }
    }

    #[test]
    fn test_validate_bad_rate() {
        let mut config = Config::default();
        config.downloader.min_rate = "fast".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_home_url() {
        let mut config = Config::default();
        config.crawler.home_url = "ftp://southparkstudios.com/".to_string();
        assert!(validate_config(&config).is_err());

        config.crawler.home_url = "southparkstudios.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_relative_first_episode_path() {
        let mut config = Config::default();
        config.crawler.first_episode_path = "episodes/x".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = Config::default();
        config.crawler.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.downloader.concurrent_fragments = Some(0);
        assert!(validate_config(&config).is_err());
    }
}

//! Prometheus metrics for crawl and download runs.
//!
//! The binary is short-lived, so instead of serving these they are
//! rendered once at the end of a run (see [`render`]).

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// =============================================================================
// Crawler
// =============================================================================

/// Pages handled by the crawler, by result.
pub static CRAWL_PAGES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("southpark_crawl_pages_total", "Pages handled by the crawler"),
        &["result"], // "stored", "malformed", "empty", "error", "skipped"
    )
    .unwrap()
});

/// Episode records written to the catalog.
pub static EPISODES_STORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "southpark_episodes_stored_total",
        "Episode records written to the catalog",
    )
    .unwrap()
});

// =============================================================================
// Downloads
// =============================================================================

/// Download attempts, by result.
pub static DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("southpark_downloads_total", "Episode download attempts"),
        &["result"], // "ok", "failed", "dry_run"
    )
    .unwrap()
});

pub(crate) fn record_page(result: &str) {
    CRAWL_PAGES.with_label_values(&[result]).inc();
}

pub(crate) fn record_download(result: &str) {
    DOWNLOADS.with_label_values(&[result]).inc();
}

/// Get all metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CRAWL_PAGES.clone()),
        Box::new(EPISODES_STORED.clone()),
        Box::new(DOWNLOADS.clone()),
    ]
}

/// Render every metric in the Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let registry = Registry::new();
    for metric in all_metrics() {
        registry.register(metric)?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        record_page("stored");
        EPISODES_STORED.inc();
        record_download("dry_run");

        let text = render().unwrap();
        assert!(text.contains("southpark_crawl_pages_total{result=\"stored\"}"));
        assert!(text.contains("southpark_episodes_stored_total"));
        assert!(text.contains("southpark_downloads_total{result=\"dry_run\"}"));
    }

    #[test]
    fn test_render_twice() {
        assert!(render().is_ok());
        assert!(render().is_ok());
    }
}

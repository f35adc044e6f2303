//! Testing utilities and mock implementations.
//!
//! Mocks for the two external seams, the page fetcher and the download
//! tool, so crawl and download runs can be exercised without network
//! access or a yt-dlp checkout.
//!
//! # Example
//!
//! ```rust,ignore
//! use southpark_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! // S01E01 <-> S01E02 <-> S01E03
//! fetcher.add_chain(1, 1..=3).await;
//!
//! let report = CrawlController::new(config, catalog, fetcher.clone())
//!     .run(&fixtures::episode_url(1, 1), &cancel)
//!     .await?;
//! ```

mod mock_downloader;
mod mock_fetcher;

pub use mock_downloader::MockDownloader;
pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::catalog::Episode;
    use crate::extractor::{
        EPISODE_NUMBER, EPISODE_TITLE, OG_DESCRIPTION, OG_IMAGE, RELEASE_DATE, SEASON_NUMBER,
    };

    /// Host every fixture URL lives on.
    pub const BASE_URL: &str = "https://www.southparkstudios.com";

    /// Release date shared by all fixture episodes.
    pub fn release_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1997, 8, 13, 4, 0, 0).unwrap()
    }

    /// Path of a fixture episode page, matching the site's link shape.
    pub fn episode_path(season: u32, episode: u32) -> String {
        format!(
            "/episodes/s{s}e{e}/south-park-episode-{s}-{e}-season-{s}-ep-{e}",
            s = season,
            e = episode
        )
    }

    /// Absolute URL of a fixture episode page.
    pub fn episode_url(season: u32, episode: u32) -> String {
        format!("{}{}", BASE_URL, episode_path(season, episode))
    }

    /// Create a catalog record. Equal to what [`EpisodePage::new`] extracts to
    /// when served from [`episode_url`].
    pub fn episode(season: u32, episode: u32) -> Episode {
        Episode {
            season,
            episode,
            title: format!("Episode {}", episode),
            url: episode_url(season, episode),
            description: format!("Season {} episode {}.", season, episode),
            image_url: format!("https://images.example.com/s{}e{}.jpg", season, episode),
            date: release_date(),
        }
    }

    /// Builder for an episode page document.
    #[derive(Debug, Clone)]
    pub struct EpisodePage {
        meta: Vec<(&'static str, String)>,
        links: Vec<String>,
    }

    impl EpisodePage {
        /// A well-formed page for the given episode, without links.
        pub fn new(season: u32, episode: u32) -> Self {
            let record = self::episode(season, episode);
            Self {
                meta: vec![
                    (EPISODE_TITLE, record.title),
                    (SEASON_NUMBER, season.to_string()),
                    (EPISODE_NUMBER, episode.to_string()),
                    (OG_DESCRIPTION, record.description),
                    (OG_IMAGE, record.image_url),
                    (RELEASE_DATE, "1997-08-13T04:00:00.000Z".to_string()),
                ],
                links: Vec::new(),
            }
        }

        fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
            let value = value.into();
            match self.meta.iter_mut().find(|(p, _)| *p == property) {
                Some(entry) => entry.1 = value,
                None => self.meta.push((property, value)),
            }
            self
        }

        pub fn title(self, title: &str) -> Self {
            self.set(EPISODE_TITLE, title)
        }

        pub fn description(self, description: &str) -> Self {
            self.set(OG_DESCRIPTION, description)
        }

        pub fn image(self, url: &str) -> Self {
            self.set(OG_IMAGE, url)
        }

        pub fn release_date(self, date: &str) -> Self {
            self.set(RELEASE_DATE, date)
        }

        pub fn season_raw(self, value: &str) -> Self {
            self.set(SEASON_NUMBER, value)
        }

        pub fn episode_raw(self, value: &str) -> Self {
            self.set(EPISODE_NUMBER, value)
        }

        /// Drop a meta property from the page.
        pub fn without(mut self, property: &str) -> Self {
            self.meta.retain(|(p, _)| *p != property);
            self
        }

        /// Append another meta tag, even if the property is already present.
        pub fn extra_meta(mut self, property: &'static str, value: &str) -> Self {
            self.meta.push((property, value.to_string()));
            self
        }

        /// Add an anchor with a literal href.
        pub fn link(mut self, href: &str) -> Self {
            self.links.push(href.to_string());
            self
        }

        /// Add a site-relative anchor to another fixture episode.
        pub fn link_to(self, season: u32, episode: u32) -> Self {
            self.link(&episode_path(season, episode))
        }

        pub fn render(&self) -> String {
            let meta: String = self
                .meta
                .iter()
                .map(|(property, value)| {
                    format!(
                        "    <meta property=\"{}\" content=\"{}\">\n",
                        property,
                        escape(value)
                    )
                })
                .collect();
            let links: String = self
                .links
                .iter()
                .map(|href| format!("    <a href=\"{}\">link</a>\n", escape(href)))
                .collect();

            format!(
                "<!DOCTYPE html>\n<html>\n<head>\n{}</head>\n<body>\n{}</body>\n</html>\n",
                meta, links
            )
        }
    }

    fn escape(value: &str) -> String {
        value
            .replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
    }
}

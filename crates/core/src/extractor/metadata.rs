//! Episode metadata from `<meta property=".." content="..">` tags.

use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::{Html, Selector};

use super::ExtractError;
use crate::catalog::Episode;

pub const EPISODE_TITLE: &str = "search:episodeTitle";
pub const SEASON_NUMBER: &str = "search:seasonNumber";
pub const EPISODE_NUMBER: &str = "search:episodeNumber";
pub const OG_DESCRIPTION: &str = "og:description";
pub const OG_IMAGE: &str = "og:image";
pub const RELEASE_DATE: &str = "og:video:release_date";

/// Every property a page must carry to yield a record.
pub const REQUIRED_PROPERTIES: [&str; 6] = [
    EPISODE_TITLE,
    SEASON_NUMBER,
    EPISODE_NUMBER,
    OG_DESCRIPTION,
    OG_IMAGE,
    RELEASE_DATE,
];

/// Layout of `og:video:release_date`, e.g. `1997-08-13T04:00:00.000Z`.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Default)]
struct MetaTags<'a> {
    values: [Option<&'a str>; 6],
}

impl<'a> MetaTags<'a> {
    fn collect(document: &'a Html) -> Self {
        let mut tags = Self::default();
        let Ok(selector) = Selector::parse("meta[property]") else {
            return tags;
        };

        for element in document.select(&selector) {
            let element = element.value();
            let (Some(property), Some(content)) = (element.attr("property"), element.attr("content"))
            else {
                continue;
            };
            if let Some(idx) = REQUIRED_PROPERTIES.iter().position(|p| *p == property) {
                // First occurrence wins
                tags.values[idx].get_or_insert(content);
            }
        }
        tags
    }

    fn get(&self, property: &'static str) -> Option<&'a str> {
        REQUIRED_PROPERTIES
            .iter()
            .position(|p| *p == property)
            .and_then(|idx| self.values[idx])
    }

    fn missing(&self) -> Vec<&'static str> {
        REQUIRED_PROPERTIES
            .iter()
            .zip(self.values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(property, _)| *property)
            .collect()
    }
}

/// Extract a fully-populated episode record from a parsed document.
///
/// All six [`REQUIRED_PROPERTIES`] must be present. Season and episode
/// numbers must parse (season must be at least 1); an unparsable release
/// date degrades to the Unix epoch instead of failing the page.
pub fn extract_episode(document: &Html, page_url: &str) -> Result<Episode, ExtractError> {
    let tags = MetaTags::collect(document);

    let missing = tags.missing();
    if !missing.is_empty() {
        return Err(ExtractError::MalformedPage {
            url: page_url.to_string(),
            missing,
        });
    }

    let text = |property| tags.get(property).unwrap_or_default().to_string();
    let number = |property: &'static str| {
        let value = tags.get(property).unwrap_or_default();
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| ExtractError::InvalidValue {
                url: page_url.to_string(),
                property,
                value: value.to_string(),
            })
    };

    let season = number(SEASON_NUMBER)?;
    if season == 0 {
        return Err(ExtractError::InvalidValue {
            url: page_url.to_string(),
            property: SEASON_NUMBER,
            value: "0".to_string(),
        });
    }
    let episode = number(EPISODE_NUMBER)?;

    Ok(Episode {
        season,
        episode,
        title: text(EPISODE_TITLE),
        url: page_url.to_string(),
        description: text(OG_DESCRIPTION),
        image_url: text(OG_IMAGE),
        date: parse_release_date(&text(RELEASE_DATE)),
    })
}

/// Parse a release date, falling back to the Unix epoch.
pub fn parse_release_date(value: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(value, RELEASE_DATE_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

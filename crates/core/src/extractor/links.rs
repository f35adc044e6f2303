//! Episode link discovery.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{Html, Selector};
use url::Url;

/// `/<locale>/<id>/south-park-<slug>-<season-word>-<N>-<episode-word>-<M>`
///
/// Matches e.g. `/folgen/940f8z/south-park-cartman-und-die-analsonde-staffel-1-ep-1`
/// and `/episodes/940f8z/south-park-cartman-gets-an-anal-probe-season-1-ep-1`.
static EPISODE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-z]+/[0-9a-z]+/south-park-[0-9a-z-]+-[a-z]+-[0-9]+-[a-z]+-[0-9]+$").unwrap()
});

/// Whether `href` points at an episode page.
///
/// This is a discovery filter only; season and episode numbers embedded in
/// the slug are never read back.
pub fn is_episode_link(href: &str) -> bool {
    EPISODE_LINK.is_match(href)
}

/// Collect the absolute URLs of all episode links on a page.
///
/// Links identical to the page's own path or full URL are dropped before
/// matching, as are hrefs that cannot be resolved against the page URL.
pub fn extract_episode_links(document: &Html, page_url: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(page_url).ok();
    let page_path = base.as_ref().map(|u| u.path().to_string());

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if href == page_url || page_path.as_deref() == Some(href) {
            continue;
        }

        let resolved = match &base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        let Ok(resolved) = resolved else {
            continue;
        };

        if !is_episode_link(href) {
            continue;
        }

        let resolved = resolved.to_string();
        if resolved != page_url && seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }
    links
}

//! Strategies for finding watch links in a search result page
//!
//! Result markup changes without notice, so the pipeline only depends on the
//! `VideoMatcher` trait and the strategy is picked from configuration.

use scraper::{Html, Selector};
use std::collections::HashSet;

use simlr_common::config::MatchStrategy;

/// Finds candidate watch links in a search result page
pub trait VideoMatcher: Send + Sync {
    /// Matcher name for logs
    fn name(&self) -> &'static str;

    /// Links starting with `watch_prefix`, in page order, without repeats
    fn candidates(&self, page: &str, watch_prefix: &str) -> Vec<String>;
}

/// Build the matcher for a configured strategy
pub fn matcher_for(strategy: MatchStrategy) -> Box<dyn VideoMatcher> {
    match strategy {
        MatchStrategy::Anchor => Box::new(AnchorMatcher),
        MatchStrategy::Embedded => Box::new(EmbeddedDataMatcher),
        MatchStrategy::Any => Box::new(AnyMatcher),
    }
}

/// Anchor elements whose `href` starts with the watch prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorMatcher;

impl VideoMatcher for AnchorMatcher {
    fn name(&self) -> &'static str {
        "anchor"
    }

    fn candidates(&self, page: &str, watch_prefix: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let document = Html::parse_document(page);
        let links = document
            .select(&selector)
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter(|href| href.starts_with(watch_prefix))
            .map(str::to_string);

        unique(links)
    }
}

/// Watch links embedded in inline script data (`"url":"/watch?v=..."`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataMatcher;

impl VideoMatcher for EmbeddedDataMatcher {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn candidates(&self, page: &str, watch_prefix: &str) -> Vec<String> {
        let links = page.match_indices(watch_prefix).filter_map(|(start, _)| {
            let rest = &page[start + watch_prefix.len()..];
            let id_len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(rest.len());
            (id_len > 0).then(|| format!("{}{}", watch_prefix, &rest[..id_len]))
        });

        unique(links)
    }
}

/// Anchors first, embedded data when the page has no matching anchor
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl VideoMatcher for AnyMatcher {
    fn name(&self) -> &'static str {
        "any"
    }

    fn candidates(&self, page: &str, watch_prefix: &str) -> Vec<String> {
        let anchors = AnchorMatcher.candidates(page, watch_prefix);
        if !anchors.is_empty() {
            return anchors;
        }
        EmbeddedDataMatcher.candidates(page, watch_prefix)
    }
}

fn unique(links: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links.filter(|link| seen.insert(link.clone())).collect()
}

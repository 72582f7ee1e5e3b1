//! Pure HTML/body extraction helpers. Everything here is synchronous and
//! side-effect free; the classifier decides what to do with the results.

use crate::host::{host_or_sub_matches, simple_host, strip_host};
use crate::rules::{
    AVATAR_PATH_PREFIXES, FRIEND_BOX_SELECTORS, FRIEND_DENY_HOSTS, IMAGE_EXTENSIONS,
    MIX_SPACE_API_PATTERNS, SCRIPT_URL_PATTERN,
};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static SCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCRIPT_URL_PATTERN).expect("script URL pattern is valid"));

static MIX_SPACE_API_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    MIX_SPACE_API_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("API base pattern is valid"))
        .collect()
});

/// An anchor with its href resolved against the page URL and its visible
/// text concatenated.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub url: Url,
    pub label: String,
}

/// All `<a href>` elements whose href resolves to an absolute URL, in page
/// order. Fragments are dropped since they never change the fetched page.
pub fn collect_anchors(html: &str, page_url: &Url) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("anchor selector is valid");

    let mut anchors = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            continue;
        }
        let Ok(mut url) = page_url.join(href) else {
            continue;
        };
        url.set_fragment(None);
        let label = element.text().collect::<String>().trim().to_string();
        anchors.push(Anchor { url, label });
    }
    anchors
}

/// The shared candidate filter: only http(s), never a denylisted host, never
/// an avatar endpoint or a bare image.
pub fn url_to_handle(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    if let Some(host) = url.host_str()
        && host_or_sub_matches(host, FRIEND_DENY_HOSTS)
    {
        return false;
    }
    let path = url.path();
    if AVATAR_PATH_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }
    true
}

/// Friend links pulled out of a directory page: the winning selector plus
/// the accepted target URLs, in discovery order.
#[derive(Debug, Default)]
pub struct DirectoryLinks {
    pub selector: String,
    pub targets: Vec<String>,
}

/// Walk the container selector list most-specific-first and return the first
/// selector that yields at least one accepted link. Candidates inside a
/// container are anchor hrefs, the `div[hrefs]` theme attribute, and quoted
/// URLs in inline script text. One link per normalized host; the page's own
/// host is pre-seeded so self-links never count.
pub fn extract_directory_links(html: &str, page_url: &Url) -> Option<DirectoryLinks> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").expect("anchor selector is valid");
    let hrefs_selector = Selector::parse("div[hrefs]").expect("hrefs selector is valid");
    let script_selector = Selector::parse("script").expect("script selector is valid");

    let page_host = page_url.host_str().map(strip_host).unwrap_or_default();

    for container_selector in FRIEND_BOX_SELECTORS {
        let Ok(selector) = Selector::parse(container_selector) else {
            continue;
        };

        let mut visited_hosts: HashSet<String> = HashSet::new();
        visited_hosts.insert(page_host.clone());

        let mut targets = Vec::new();
        for container in document.select(&selector) {
            let mut candidates: Vec<String> = Vec::new();
            for anchor in container.select(&anchor_selector) {
                if let Some(href) = anchor.value().attr("href") {
                    candidates.push(href.to_string());
                }
            }
            for elem in container.select(&hrefs_selector) {
                if let Some(hrefs) = elem.value().attr("hrefs") {
                    candidates.push(hrefs.to_string());
                }
            }
            for script in container.select(&script_selector) {
                let text = script.text().collect::<String>();
                for m in SCRIPT_URL_RE.find_iter(&text) {
                    let quoted = m.as_str();
                    candidates.push(quoted[1..quoted.len() - 1].to_string());
                }
            }

            for candidate in candidates {
                let Ok(url) = Url::parse(&candidate) else {
                    continue;
                };
                if !url_to_handle(&url) {
                    continue;
                }
                let host = simple_host(url.as_str());
                if host.is_empty() || !visited_hosts.insert(host) {
                    continue;
                }
                targets.push(candidate);
            }
        }

        if !targets.is_empty() {
            return Some(DirectoryLinks {
                selector: container_selector.to_string(),
                targets,
            });
        }
    }

    None
}

/// The Mix Space API base embedded in the page body, if any pattern matches.
pub fn find_platform_api_base(body: &str) -> Option<String> {
    for pattern in MIX_SPACE_API_RES.iter() {
        if let Some(caps) = pattern.captures(body) {
            let base = caps.get(1).map(|m| m.as_str().to_string())?;
            if !base.is_empty() {
                return Some(base);
            }
        }
    }
    None
}

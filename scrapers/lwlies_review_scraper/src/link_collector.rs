use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::ScraperConfig;

const REVIEW_PATH_MARKER: &str = "/reviews/";

/// Fetch the review index page and return the candidate review URLs found on
/// it. Network and HTTP errors are non-fatal: they are logged and yield an
/// empty collection so the caller can proceed with zero links.
pub fn collect_review_links(client: &reqwest::blocking::Client, config: &ScraperConfig) -> Vec<String> {
    info!("Fetching review links from: {}", config.site.index_url);

    let response = match client.get(&config.site.index_url).send() {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to fetch index page {}: {}", config.site.index_url, e);
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        warn!(
            "Index page {} returned HTTP {}",
            config.site.index_url,
            response.status()
        );
        return Vec::new();
    }

    let html = match response.text() {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to read index page body: {}", e);
            return Vec::new();
        }
    };

    extract_review_links(&html, &config.site.base_url)
        .into_iter()
        .collect()
}

/// Scan every hyperlink on the page and keep the ones that point at a review
/// detail page: the href must contain `/reviews/` and must not be the index
/// path itself. Relative hrefs are resolved against the base URL. Duplicate
/// targets collapse via set semantics; iteration order is unspecified.
pub fn extract_review_links(html: &str, base_url: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut links = HashSet::new();
    for link in document.select(&link_selector) {
        let href = match link.value().attr("href") {
            Some(href) => href,
            None => continue,
        };

        if !href.contains(REVIEW_PATH_MARKER) || href.trim_matches('/') == "reviews" {
            continue;
        }

        let full_url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", base_url, href)
        };
        links.insert(full_url);
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE_URL: &str = "https://lwlies.com";

    #[test]
    fn test_extract_review_links_filters_and_resolves() {
        let html = r#"
            <html><body>
                <a href="/reviews/blue-moon/">Blue Moon</a>
                <a href="https://lwlies.com/reviews/the-mastermind/">The Mastermind</a>
                <a href="/reviews/bugonia/">Bugonia</a>
                <a href="/articles/in-praise-of-long-takes/">Article</a>
                <a href="/about/">About</a>
            </body></html>
        "#;

        let links = extract_review_links(html, BASE_URL);

        let mut sorted: Vec<_> = links.into_iter().collect();
        sorted.sort();
        assert_eq!(
            sorted,
            vec![
                "https://lwlies.com/reviews/blue-moon/".to_string(),
                "https://lwlies.com/reviews/bugonia/".to_string(),
                "https://lwlies.com/reviews/the-mastermind/".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_review_links_excludes_index_path() {
        let html = r#"
            <html><body>
                <a href="/reviews/">All reviews</a>
                <a href="/reviews/blue-moon/">Blue Moon</a>
            </body></html>
        "#;

        let links = extract_review_links(html, BASE_URL);
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://lwlies.com/reviews/blue-moon/"));
    }

    #[test]
    fn test_extract_review_links_deduplicates() {
        let html = r#"
            <html><body>
                <a href="/reviews/blue-moon/"><img src="poster.jpg"></a>
                <a href="/reviews/blue-moon/">Blue Moon</a>
            </body></html>
        "#;

        let links = extract_review_links(html, BASE_URL);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_extract_review_links_empty_page() {
        let links = extract_review_links("<html><body></body></html>", BASE_URL);
        assert!(links.is_empty());
    }
}

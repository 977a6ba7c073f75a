use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use tracing::warn;

use crate::types::ReviewRecord;

/// Joined paragraph text at or below this length is treated as "no real
/// body" rather than kept as a short string.
const MIN_BODY_CHARS: usize = 50;

const CONTRIBUTOR_PATH_MARKER: &str = "/contributor/";
const AUTHOR_CLASS_MARKERS: [&str; 2] = ["font-primary", "font-bold"];
const RATING_ATTR_PATTERN: &str = r"^data-flatplan-review-score";
const RATING_FALLBACK_MARKER: &str = "w-14 h-14 rounded-full bg-black";
const DATE_CLASS_MARKERS: [&str; 4] = ["uppercase", "font-primary", "font-bold", "not-italic"];
const BODY_CLASS_MARKERS: [&str; 2] = ["text-prose", "column"];
const PROMO_BOX_MARKER: &str = "bg-[var(--color-background-accent)]";
const AD_CLASS_MARKER: &str = "ad";

/// Fetch a single review page and run the field extractors over it.
///
/// Any transport error or non-success status yields `None` for the whole
/// page. Individual field extractors are best-effort and never fail the
/// page; a missing structural element just leaves that field absent.
pub fn scrape_review_page(client: &reqwest::blocking::Client, url: &str) -> Option<ReviewRecord> {
    let response = match client.get(url).send() {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to fetch {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        warn!("{} returned HTTP {}", url, response.status());
        return None;
    }

    let html = match response.text() {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to read body of {}: {}", url, e);
            return None;
        }
    };

    Some(ReviewPageParser::new().parse(&html, url))
}

/// Extracts the structured review fields from one page of markup. Each
/// field has its own strategy keyed on structural cues (tag names, class
/// markers, attribute-name prefixes); the strategies are independent, so a
/// page missing one cue still yields the other fields.
pub struct ReviewPageParser {
    rating_attr: Regex,
}

impl Default for ReviewPageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewPageParser {
    pub fn new() -> Self {
        Self {
            rating_attr: Regex::new(RATING_ATTR_PATTERN).unwrap(),
        }
    }

    pub fn parse(&self, html: &str, url: &str) -> ReviewRecord {
        let mut document = Html::parse_document(html);
        let mut record = ReviewRecord::new(url);

        record.film_title = self.extract_title(&document);
        record.author = self.extract_author(&document);
        record.numerical_rating = self.extract_rating(&document, url);
        record.review_date = self.extract_date(&document);

        let (body, cited_works) = self.extract_body(&mut document, record.film_title.as_deref());
        record.text_complete = body;
        record.cited_works_list = cited_works;

        record
    }

    /// Film title: the first `h1`, cut before the " review" marker that
    /// headlines carry ("Blue Moon review – one spry night..."). The
    /// lowercase marker is checked first and cut at its first occurrence in
    /// any case; the exact-case " Review" marker is the second chance. With
    /// neither marker the whole heading is the title.
    fn extract_title(&self, document: &Html) -> Option<String> {
        let h1_selector = Selector::parse("h1").unwrap();
        let heading = document.select(&h1_selector).next()?;
        let full_title = heading.text().collect::<String>().trim().to_string();

        if full_title.contains(" review") {
            let end = find_case_insensitive(&full_title, " review")?;
            Some(full_title[..end].trim().to_string())
        } else if let Some(end) = full_title.find(" Review") {
            Some(full_title[..end].trim().to_string())
        } else {
            Some(full_title)
        }
    }

    /// Author byline: a contributor link styled with both byline font
    /// classes, which separates it from plain in-body contributor links.
    fn extract_author(&self, document: &Html) -> Option<String> {
        let link_selector = Selector::parse("a[href]").unwrap();
        document
            .select(&link_selector)
            .find(|el| {
                let is_contributor = el
                    .value()
                    .attr("href")
                    .map(|href| href.contains(CONTRIBUTOR_PATH_MARKER))
                    .unwrap_or(false);
                is_contributor && class_contains_all(el, &AUTHOR_CLASS_MARKERS)
            })
            .map(|el| trimmed_text(&el))
    }

    /// Rating: average of the per-criterion integer scores, rounded to two
    /// decimals. Strategies in priority order:
    ///   1. elements carrying a `data-flatplan-review-score*` attribute;
    ///   2. score bubbles found via their container class, reading the
    ///      first span inside each.
    fn extract_rating(&self, document: &Html, url: &str) -> Option<f64> {
        let mut scores = self.attribute_scores(document);
        if scores.is_empty() {
            scores = self.bubble_scores(document);
        }
        if scores.is_empty() {
            warn!("No rating found on {}", url);
            return None;
        }

        let average = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
        Some((average * 100.0).round() / 100.0)
    }

    fn attribute_scores(&self, document: &Html) -> Vec<u32> {
        let any_selector = Selector::parse("*").unwrap();
        document
            .select(&any_selector)
            .filter(|el| {
                el.value()
                    .attrs()
                    .any(|(name, _)| self.rating_attr.is_match(name))
            })
            .filter_map(|el| parse_digit_string(&trimmed_text(&el)))
            .collect()
    }

    fn bubble_scores(&self, document: &Html) -> Vec<u32> {
        let div_selector = Selector::parse("div").unwrap();
        let span_selector = Selector::parse("span").unwrap();
        document
            .select(&div_selector)
            .filter(|el| element_classes(el).contains(RATING_FALLBACK_MARKER))
            .filter_map(|div| div.select(&span_selector).next())
            .filter_map(|span| parse_digit_string(&trimmed_text(&span)))
            .collect()
    }

    /// Publication date: a span styled with all four date classes. The
    /// author byline span carries similar styling, so the date is accepted
    /// only when the enclosing paragraph mentions "Published"; anything
    /// else is treated as not found.
    fn extract_date(&self, document: &Html) -> Option<String> {
        let span_selector = Selector::parse("span").unwrap();
        let date_span = document
            .select(&span_selector)
            .find(|el| class_contains_all(el, &DATE_CLASS_MARKERS))?;

        let parent_paragraph = date_span
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "p")?;

        let paragraph_text = parent_paragraph.text().collect::<String>();
        if paragraph_text.contains("Published") {
            Some(trimmed_text(&date_span))
        } else {
            None
        }
    }

    /// Body text and cited works, both scoped to the main prose container.
    /// Promo boxes and ad slots are detached from the tree first so their
    /// paragraphs and italics never contribute. Italicised titles are the
    /// cited works; the film's own title is excluded and duplicates
    /// collapse.
    fn extract_body(
        &self,
        document: &mut Html,
        film_title: Option<&str>,
    ) -> (Option<String>, String) {
        let div_selector = Selector::parse("div").unwrap();

        let container_id = match document.select(&div_selector).find(|el| {
            let classes = element_classes(el);
            BODY_CLASS_MARKERS.iter().any(|marker| classes.contains(marker))
        }) {
            Some(container) => container.id(),
            None => return (None, String::new()),
        };

        let removable: Vec<_> = match document.tree.get(container_id).and_then(ElementRef::wrap) {
            Some(container) => container
                .select(&div_selector)
                .filter(|el| {
                    let classes = element_classes(el);
                    classes.contains(PROMO_BOX_MARKER) || classes.contains(AD_CLASS_MARKER)
                })
                .map(|el| el.id())
                .collect(),
            None => return (None, String::new()),
        };
        for node_id in removable {
            if let Some(mut node) = document.tree.get_mut(node_id) {
                node.detach();
            }
        }

        let container = match document.tree.get(container_id).and_then(ElementRef::wrap) {
            Some(container) => container,
            None => return (None, String::new()),
        };

        let p_selector = Selector::parse("p").unwrap();
        let clean_text = container
            .select(&p_selector)
            .map(|p| trimmed_text(&p))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let body = if clean_text.len() > MIN_BODY_CHARS {
            Some(clean_text)
        } else {
            warn!("Body text too short or not found");
            None
        };

        let i_selector = Selector::parse("i").unwrap();
        let cited_works: BTreeSet<String> = container
            .select(&i_selector)
            .map(|el| trimmed_text(&el))
            .filter(|text| !text.is_empty() && Some(text.as_str()) != film_title)
            .collect();
        let cited_works_list = cited_works.into_iter().collect::<Vec<_>>().join(", ");

        (body, cited_works_list)
    }
}

fn element_classes<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().attr("class").unwrap_or("")
}

fn class_contains_all(el: &ElementRef, markers: &[&str]) -> bool {
    let classes = element_classes(el);
    markers.iter().all(|marker| classes.contains(marker))
}

fn trimmed_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn parse_digit_string(text: &str) -> Option<u32> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

/// Byte offset of the first occurrence of an ASCII needle, ignoring case.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

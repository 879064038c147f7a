// src/crawl/extract.rs
// =============================================================================
// This module finds links in fetched page content.
//
// Two strategies sit behind the same interface (an iterator of URL strings):
//
// - Marker (default): a plain text scan for the literal `<a href="`. The text
//   between the marker and the next double quote is one link. This is NOT an
//   HTML parser: single-quoted or unquoted hrefs, extra attributes before
//   href, and entities like &amp; are not understood. If a marker has no
//   closing quote, scanning stops there.
//
// - Html: parses the content with `scraper` (built on html5ever) and yields
//   the raw value of every `a[href]`, in document order.
//
// Neither strategy resolves relative links, validates URLs, or removes
// duplicates. Links are handed to the queue exactly as written in the page.
//
// Rust concepts:
// - Iterator: MarkerLinks yields links lazily, one per next() call
// - Lifetimes: MarkerLinks borrows the content, so yielded &str need no copy
// - Box<dyn Iterator>: Lets both strategies return "some iterator"
// =============================================================================

use clap::ValueEnum;
use scraper::{Html, Selector};

// The literal pattern the marker scan looks for
pub const HREF_MARKER: &str = "<a href=\"";

// Which link extraction strategy to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LinkParser {
    /// Literal `<a href="` scan (fast, not HTML-aware)
    #[default]
    Marker,
    /// Real HTML parsing of every `a[href]`
    Html,
}

impl LinkParser {
    // Returns the links found in `content`, as owned strings
    pub fn links<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = String> + Send + 'a> {
        match self {
            LinkParser::Marker => Box::new(extract_links(content).map(str::to_string)),
            LinkParser::Html => Box::new(HtmlLinks::new(content)),
        }
    }
}

// Starts a marker scan over `content`
//
// Example:
//   content = `<a href="http://a">x</a><a href="http://b">y</a>`
//   yields  = "http://a", "http://b"
//
// Call it again (or clone the iterator) to scan from the beginning.
pub fn extract_links(content: &str) -> MarkerLinks<'_> {
    MarkerLinks { rest: content }
}

// Lazy iterator over marker-scan links
#[derive(Debug, Clone)]
pub struct MarkerLinks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for MarkerLinks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self.rest.find(HREF_MARKER)? + HREF_MARKER.len();
        let after_marker = &self.rest[start..];

        match after_marker.find('"') {
            Some(end) => {
                let link = &after_marker[..end];
                self.rest = &after_marker[end..];
                Some(link)
            }
            None => {
                // Unterminated href: nothing more can be found
                self.rest = "";
                None
            }
        }
    }
}

impl std::iter::FusedIterator for MarkerLinks<'_> {}

// Links found by a real HTML parse
//
// scraper's document type is not Send, so the parse happens up front and
// only the href strings are kept.
#[derive(Debug, Clone)]
pub struct HtmlLinks {
    links: std::vec::IntoIter<String>,
}

impl HtmlLinks {
    pub fn new(content: &str) -> Self {
        let document = Html::parse_document(content);

        // "a[href]" is a constant, known-valid selector
        let selector = Selector::parse("a[href]").unwrap();

        let links: Vec<String> = document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect();

        Self {
            links: links.into_iter(),
        }
    }
}

impl Iterator for HtmlLinks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.links.next()
    }
}

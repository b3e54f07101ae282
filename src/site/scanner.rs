//! Page Scanner
//!
//! Walks a parsed HTML document once, in document order, collecting the page
//! title and the best icon it declares.

use std::cmp::Ordering;

use scraper::node::Element;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::site::icon::{IconCandidate, SizeClass};

/// `rel` tokens that mark a link as an icon
const ICON_RELS: [&str; 3] = ["icon", "apple-touch-icon", "mask-icon"];

// == Page Metadata ==
/// What a scan found. Either field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Text of the first non-empty `<title>`, verbatim
    pub title: String,
    /// Absolute URL of the chosen icon
    pub icon_url: Option<String>,
}

// == Scan State ==
#[derive(Debug, Default)]
struct Scan {
    title: Option<String>,
    icon: Option<IconCandidate>,
}

impl Scan {
    /// Nothing left to look for once a title is known and the icon is scale-free.
    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self
                .icon
                .as_ref()
                .is_some_and(|icon| icon.size_class == SizeClass::AnySize)
    }

    fn offer(&mut self, candidate: IconCandidate) {
        let better = match &self.icon {
            Some(current) => candidate.rank(current) == Ordering::Greater,
            None => true,
        };
        if better {
            debug!("New best icon candidate: {:?}", candidate);
            self.icon = Some(candidate);
        }
    }
}

// == Page Scanner ==
/// Extracts title and icon from documents fetched from a given base URL.
#[derive(Debug, Clone)]
pub struct PageScanner {
    base: Url,
    min_icon_pixels: u32,
}

impl PageScanner {
    /// Creates a scanner resolving relative links against `base`.
    pub fn new(base: Url, min_icon_pixels: u32) -> Self {
        Self {
            base,
            min_icon_pixels,
        }
    }

    /// Parses `html` and scans it.
    pub fn scan_str(&self, html: &str) -> PageMetadata {
        self.scan(&Html::parse_document(html))
    }

    /// Scans an already parsed document.
    pub fn scan(&self, document: &Html) -> PageMetadata {
        let mut scan = Scan::default();
        let mut stack = vec![document.tree.root()];

        while let Some(node) = stack.pop() {
            if let Node::Element(element) = node.value() {
                match element.name() {
                    "title" if scan.title.is_none() => {
                        let text = node
                            .first_child()
                            .and_then(|child| child.value().as_text())
                            .map(|text| text.to_string())
                            .filter(|text| !text.is_empty());
                        scan.title = text;
                    }
                    "link" => {
                        if let Some(candidate) = self.icon_candidate(element) {
                            if candidate.is_acceptable(self.min_icon_pixels) {
                                scan.offer(candidate);
                            }
                        }
                    }
                    _ => {}
                }
            }

            if scan.is_complete() {
                break;
            }

            // Reversed so the first child is popped first
            stack.extend(node.children().rev());
        }

        PageMetadata {
            title: scan.title.unwrap_or_default(),
            icon_url: scan.icon.map(|icon| icon.link.to_string()),
        }
    }

    /// Turns a `<link>` element into a candidate if it declares an icon.
    fn icon_candidate(&self, element: &Element) -> Option<IconCandidate> {
        let rel = element.attr("rel")?;
        if !rel.split_whitespace().any(|token| ICON_RELS.contains(&token)) {
            return None;
        }

        let (Some(href), Some(sizes)) = (element.attr("href"), element.attr("sizes")) else {
            warn!("Found icon without href or sizes: {:?}", element);
            return None;
        };

        let link = match self.base.join(href) {
            Ok(link) => link,
            Err(err) => {
                warn!("Failed to resolve icon link {:?}: {}", href, err);
                return None;
            }
        };

        let candidate = IconCandidate::from_sizes(link, sizes);
        (candidate.size_class != SizeClass::Unknown).then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> PageScanner {
        PageScanner::new(Url::parse("https://example.com/app/").unwrap(), 144)
    }

    fn page(head: &str) -> String {
        format!("<!DOCTYPE html><html><head>{head}</head><body><p>hi</p></body></html>")
    }

    #[test]
    fn test_title_and_icon() {
        let html = page(
            r#"<title>Example</title>
               <link rel="icon" href="/icon.png" sizes="192x192">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.title, "Example");
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/icon.png"));
    }

    #[test]
    fn test_larger_icon_selected() {
        let html = page(
            r#"<link rel="icon" href="a.png" sizes="16x16">
               <link rel="icon" href="b.png" sizes="256x256">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/b.png"));
    }

    #[test]
    fn test_any_size_beats_earlier_fixed() {
        let html = page(
            r#"<title>T</title>
               <link rel="icon" href="big.png" sizes="1024x1024">
               <link rel="icon" href="any.png" sizes="any">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/any.png"));
    }

    #[test]
    fn test_any_size_beats_later_fixed() {
        let html = page(
            r#"<title>T</title>
               <link rel="mask-icon" href="any.svg" sizes="any">
               <link rel="icon" href="big.png" sizes="1024x1024">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/any.svg"));
    }

    #[test]
    fn test_small_icons_rejected() {
        let html = page(
            r#"<title>T</title>
               <link rel="icon" href="a.png" sizes="16x16 32x32">
               <link rel="apple-touch-icon" href="b.png" sizes="120x120">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.title, "T");
        assert!(meta.icon_url.is_none());
    }

    #[test]
    fn test_icon_without_sizes_skipped() {
        let html = page(
            r#"<link rel="icon" href="logo.svg">
               <link rel="icon" sizes="any">
               <link rel="apple-touch-icon" href="touch.png" sizes="180x180">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/touch.png"));
    }

    #[test]
    fn test_svg_with_unparseable_sizes_is_any_size() {
        let html = page(
            r#"<link rel="icon" href="logo.svg" sizes="scalable">
               <link rel="icon" href="big.png" sizes="512x512">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/logo.svg"));
    }

    #[test]
    fn test_non_icon_links_ignored() {
        let html = page(
            r#"<link rel="stylesheet" href="s.css" sizes="any">
               <link rel="shortcut icon" href="fav.png" sizes="196x196">"#,
        );

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://example.com/app/fav.png"));
    }

    #[test]
    fn test_first_title_wins() {
        let html = page("<title>First</title><title>Second</title>");

        assert_eq!(scanner().scan_str(&html).title, "First");
    }

    #[test]
    fn test_empty_title_skipped() {
        let html = page("<title></title><title>Real</title>");

        assert_eq!(scanner().scan_str(&html).title, "Real");
    }

    #[test]
    fn test_title_kept_verbatim() {
        let html = page("<title>  Spaced &amp; Escaped  </title>");

        assert_eq!(scanner().scan_str(&html).title, "  Spaced & Escaped  ");
    }

    #[test]
    fn test_empty_document() {
        let meta = scanner().scan_str("");

        assert_eq!(meta, PageMetadata::default());
    }

    #[test]
    fn test_absolute_href_kept() {
        let html = page(r#"<link rel="icon" href="https://cdn.example.net/i.png" sizes="512x512">"#);

        let meta = scanner().scan_str(&html);
        assert_eq!(meta.icon_url.as_deref(), Some("https://cdn.example.net/i.png"));
    }

    #[test]
    fn test_metadata_json_shape() {
        let meta = PageMetadata {
            title: "T".to_string(),
            icon_url: None,
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({"title": "T", "icon_url": null}));
    }
}

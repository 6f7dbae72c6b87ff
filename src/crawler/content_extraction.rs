//! Text extraction for fetched pages

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Extract the visible text of a page
///
/// Elements matching any of `exclude_selectors` are dropped together with
/// their subtree, comments are ignored, and the remaining text nodes are
/// trimmed and joined with single spaces.
pub fn extract_text(html: &str, exclude_selectors: &[String]) -> String {
    let document = Html::parse_document(html);

    let selectors: Vec<Selector> = exclude_selectors
        .iter()
        .filter_map(|selector_str| match Selector::parse(selector_str) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Failed to parse selector '{}': {:?}", selector_str, e);
                None
            }
        })
        .collect();

    let mut parts = Vec::new();
    let root = document.root_element();
    if !is_excluded(&root, &selectors) {
        collect_text(root, &selectors, &mut parts);
    }
    parts.join(" ")
}

/// First `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn is_excluded(element: &ElementRef<'_>, selectors: &[Selector]) -> bool {
    selectors.iter().any(|s| s.matches(element))
}

fn collect_text<'a>(element: ElementRef<'a>, selectors: &[Selector], parts: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !is_excluded(&child_element, selectors) {
                collect_text(child_element, selectors, parts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchConfig;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Compactors | Supplier</title>
    <meta name="description" content="ignored">
    <style>body { color: red; }</style>
  </head>
  <body>
    <nav><a href="/">Home</a> <a href="/shop">Shop</a></nav>
    <!-- tracking comment -->
    <main>
      <h1>Plate Compactor PC-90</h1>
      <p>
        Weight: 90 kg
      </p>
      <p>Price: <b>$1,200</b></p>
      <script>window.analytics = {};</script>
      <noscript>Enable JavaScript</noscript>
      <iframe src="https://ads.example"></iframe>
    </main>
    <footer>Copyright 2024</footer>
  </body>
</html>"#;

    #[test]
    fn test_extract_text_drops_boilerplate() {
        let config = FetchConfig::default();
        let text = extract_text(PAGE, &config.exclude_selectors);

        assert_eq!(text, "Plate Compactor PC-90 Weight: 90 kg Price: $1,200");
    }

    #[test]
    fn test_extract_text_custom_selectors() {
        let html = r#"<html><body><div class="ads">Buy now</div><p>Rammer</p></body></html>"#;
        let text = extract_text(html, &[".ads".to_string(), "[invalid".to_string()]);
        assert_eq!(text, "Rammer");
    }

    #[test]
    fn test_extract_text_without_exclusions_keeps_head() {
        let html = "<html><head><title>T</title></head><body><p>Body</p></body></html>";
        assert_eq!(extract_text(html, &[]), "T Body");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 5), "ab");
        assert_eq!(truncate_chars("äöü", 2), "äö");
    }
}

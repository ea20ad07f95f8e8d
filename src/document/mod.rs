//! Thin adapter over `scraper::Html`
//!
//! Parsing never fails: malformed markup yields a partial tree. Query helpers
//! return `None`/empty instead of erroring, including for invalid selectors.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::constants::selectors;

/// Compile a CSS selector, logging and returning `None` when it is invalid
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid CSS selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Whitespace-trimmed text of an element and all its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First descendant of `element` matching `css`
pub fn select_in<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    element.select(&selector).next()
}

/// Trimmed text of the first descendant of `element` matching `css`
pub fn text_in(element: ElementRef<'_>, css: &str) -> Option<String> {
    select_in(element, css)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first descendant of `element` matching `css`
pub fn attr_in(element: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_in(element, css)
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parsed HTML document supporting selector queries
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match selector(css) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    /// Trimmed text of the first element matching `css`, if non-empty
    pub fn first_text(&self, css: &str) -> Option<String> {
        let selector = selector(css)?;
        self.html
            .select(&selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    /// Attribute of the first element matching `css`, if present and non-empty
    pub fn first_attr(&self, css: &str, attr: &str) -> Option<String> {
        let selector = selector(css)?;
        self.html
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Text of the first `<script>` whose content contains `marker`
    pub fn script_containing(&self, marker: &str) -> Option<String> {
        self.select_all(selectors::SCRIPT)
            .into_iter()
            .map(|script| script.text().collect::<String>())
            .find(|text| text.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_html_does_not_fail() {
        let doc = Document::parse("<div class='a'><p>unclosed <span>text");
        assert_eq!(doc.first_text("div.a p").as_deref(), Some("unclosed text"));
        assert!(doc.select_all(".missing").is_empty());
    }

    #[test]
    fn test_empty_input() {
        let doc = Document::parse("");
        assert!(doc.first_text("p").is_none());
        assert!(doc.script_containing("var").is_none());
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Document::parse("<p>x</p>");
        assert!(doc.select_all("p[").is_empty());
        assert!(doc.first_text(":::").is_none());
    }

    #[test]
    fn test_first_attr_skips_blank_values() {
        let doc = Document::parse(r#"<img src="  "><img src="/b.jpg">"#);
        assert!(doc.first_attr("img", "src").is_none());
    }

    #[test]
    fn test_script_containing_picks_matching_script() {
        let html = r#"
            <script>var other = 1;</script>
            <script>var episodes = [[1]];</script>
        "#;
        let doc = Document::parse(html);
        let script = doc.script_containing("var episodes = [").unwrap();
        assert!(script.contains("[[1]]"));
    }

    #[test]
    fn test_scoped_queries() {
        let html = r#"<ul><li class="i"><b>One</b><a href="/x">l</a></li></ul>"#;
        let doc = Document::parse(html);
        let item = doc.select_all("li.i")[0];
        assert_eq!(text_in(item, "b").as_deref(), Some("One"));
        assert_eq!(attr_in(item, "a", "href").as_deref(), Some("/x"));
        assert!(text_in(item, "i").is_none());
    }
}

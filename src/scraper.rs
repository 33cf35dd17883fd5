//! Web scraping module for article extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. Parsing happens in
//! plain functions so no `Html` document is held across an await point.

use crate::config::ExtractorConfig;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Title used when a page has none
pub const UNTITLED_ARTICLE: &str = "Untitled Article";

/// Containers that usually hold the main content, most specific first
const MAIN_SELECTORS: [&str; 5] = ["article", "main", "[role='main']", ".content", "#content"];

/// Elements whose text counts as readable content
const CONTENT_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li";

/// Shorter blocks are navigation, bylines, buttons and the like
const MIN_BLOCK_CHARS: usize = 20;

/// Readable content of a web page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Page title
    pub title: Option<String>,
    /// Main text content, one block per paragraph
    pub text: String,
}

/// Create a configured HTTP client for scraping
pub fn create_client(config: &ExtractorConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

/// Extract title and readable text from an HTML document
pub fn parse_article(html: &str) -> Article {
    let document = Html::parse_document(html);
    Article {
        title: extract_title(&document),
        text: extract_text(&document),
    }
}

/// Extract the page title from og:title, <title> or the first <h1>
pub fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, "og:title")
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
}

/// Content of a `<meta property="...">` tag
pub fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[property=\"{property}\"]")).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Trimmed text of the first non-blank element matching `selector`
pub fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

/// Extract readable text content from the page
fn extract_text(document: &Html) -> String {
    let Ok(content_selector) = Selector::parse(CONTENT_SELECTOR) else {
        return String::new();
    };

    for selector_str in MAIN_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = collect_blocks(element, &content_selector);
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }
    }

    // Fall back to every paragraph and heading on the page
    collect_blocks(document.root_element(), &content_selector)
}

/// Join the text of paragraphs and headings under `root`
fn collect_blocks(root: ElementRef<'_>, content_selector: &Selector) -> String {
    root.select(content_selector)
        .map(|element| {
            element
                .text()
                .flat_map(|chunk| chunk.split_whitespace())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|block| block.len() > MIN_BLOCK_CHARS)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title> Why Cities Should Go Car-Free </title>
            <meta property="og:title" content="Car-Free Cities">
            <script>var tracking = "ignore me please, this is not content";</script>
          </head>
          <body>
            <nav><li>Home</li><li>About</li></nav>
            <article>
              <h1>Why Cities Should Go Car-Free</h1>
              <p>Cars dominate   urban space
                 in ways we rarely question.</p>
              <p>Short.</p>
              <ul><li>Streets become safer for children walking to school.</li></ul>
            </article>
            <footer><p>Copyright notice that is long enough to count.</p></footer>
          </body>
        </html>"#;

    #[test]
    fn article_text_comes_from_main_container() {
        let article = parse_article(PAGE);
        assert_eq!(article.title.as_deref(), Some("Car-Free Cities"));
        assert_eq!(
            article.text,
            "Why Cities Should Go Car-Free\n\n\
             Cars dominate urban space in ways we rarely question.\n\n\
             Streets become safer for children walking to school."
        );
        assert!(!article.text.contains("Copyright"));
        assert!(!article.text.contains("tracking"));
    }

    #[test]
    fn falls_back_to_whole_page_paragraphs() {
        let html = r#"<html><body>
            <div><p>First paragraph with plenty of words in it.</p></div>
            <div><p>Second paragraph with plenty of words too.</p></div>
        </body></html>"#;
        let article = parse_article(html);
        assert_eq!(article.title, None);
        assert_eq!(
            article.text,
            "First paragraph with plenty of words in it.\n\n\
             Second paragraph with plenty of words too."
        );
    }

    #[test]
    fn title_prefers_og_title_then_title_then_h1() {
        let og = Html::parse_document(
            r#"<html><head><title>From Title</title><meta property="og:title" content="From OG"></head></html>"#,
        );
        assert_eq!(extract_title(&og).as_deref(), Some("From OG"));

        let title = Html::parse_document(
            r#"<html><head><title> From Title </title><meta property="og:title" content="  "></head><body><h1>Heading</h1></body></html>"#,
        );
        assert_eq!(extract_title(&title).as_deref(), Some("From Title"));

        let h1 = Html::parse_document("<html><body><h1>Heading</h1></body></html>");
        assert_eq!(extract_title(&h1).as_deref(), Some("Heading"));
    }

    #[test]
    fn empty_page_has_no_text() {
        let article = parse_article("<html><body><p>tiny</p></body></html>");
        assert!(article.text.is_empty());
    }
}

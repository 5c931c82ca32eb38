//! Documentation page fetching and HTML-to-text extraction.
//!
//! Pages are fetched with a browser user agent (the docs site serves an
//! empty shell to unknown agents) and reduced to plain text one block
//! element at a time, so the chunker sees paragraph boundaries instead of
//! one long run of markup text.

use std::time::Duration;

use anyhow::{Context, Result};
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::config::FetchConfig;
use crate::models::Document;

/// Preferred content roots, most specific first. Falls back to the whole
/// document when none match.
const CONTENT_ROOTS: &[&str] = &["main", "article", "body"];

/// Elements that become text blocks, separated by blank lines in the
/// extracted output.
const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, pre";

const BLOCK_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "pre"];

/// Subtrees that never contribute text.
const IGNORE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];

pub struct PageFetcher {
    client: reqwest::Client,
    max_retries: u32,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// Fetch a page and reduce it to plain text. A page with no
    /// extractable content yields an empty body, which is not an error;
    /// it simply produces no chunks downstream.
    pub async fn fetch(&self, url: &str) -> Result<Document> {
        Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        let html = self.fetch_html(url).await?;
        Ok(Document {
            source: url.to_string(),
            body: html_to_text(&html),
        })
    }

    /// GET with retries on 429, 5xx, and transport errors. Other error
    /// statuses fail immediately.
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(backoff).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .text()
                            .await
                            .with_context(|| format!("Failed to read body of {url}"));
                    }
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(anyhow::anyhow!("GET {url} returned {status}"));
                        continue;
                    }
                    anyhow::bail!("GET {url} returned {status}");
                }
                Err(e) => {
                    last_err = Some(anyhow::Error::from(e).context(format!("GET {url} failed")));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("GET {url} failed")))
    }
}

/// Extract readable text from an HTML page.
///
/// Walks the block elements under the content root, normalizes whitespace
/// within each block (except `pre`, which keeps its line structure), and
/// joins the blocks with blank lines.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let block_selector = Selector::parse(BLOCK_SELECTOR).expect("valid selector");
    let root = content_root(&doc);

    let mut blocks: Vec<String> = Vec::new();
    for element in root.select(&block_selector) {
        // Nested blocks (a p inside an li) are covered by their outermost
        // ancestor; emitting both would duplicate the text.
        if nested_in_block(element) || in_ignored_subtree(element) {
            continue;
        }

        let mut raw = String::new();
        collect_text(&element, &mut raw);

        let text = if element.value().name() == "pre" {
            raw.trim().to_string()
        } else {
            normalize_whitespace(&raw)
        };
        if !text.is_empty() {
            blocks.push(text);
        }
    }
    blocks.join("\n\n")
}

fn content_root(doc: &Html) -> ElementRef<'_> {
    for name in CONTENT_ROOTS {
        let selector = Selector::parse(name).expect("valid selector");
        if let Some(element) = doc.select(&selector).next() {
            return element;
        }
    }
    doc.root_element()
}

fn nested_in_block(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map_or(false, |el| BLOCK_TAGS.contains(&el.name()))
    })
}

fn in_ignored_subtree(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map_or(false, |el| IGNORE_TAGS.contains(&el.name()))
    })
}

fn collect_text(node: &NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text),
            Node::Element(element) => {
                if !IGNORE_TAGS.contains(&element.name()) {
                    collect_text(&child, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_joined_with_blank_lines() {
        let html = "<html><body><h1>Title</h1><p>First.</p><p>Second.</p></body></html>";
        assert_eq!(html_to_text(html), "Title\n\nFirst.\n\nSecond.");
    }

    #[test]
    fn test_script_and_style_stripped() {
        let html = r#"<html><body>
            <p>Visible <script>var x = 1;</script>text.</p>
            <style>p { color: red; }</style>
        </body></html>"#;
        assert_eq!(html_to_text(html), "Visible text.");
    }

    #[test]
    fn test_prefers_main_over_page_chrome() {
        let html = r#"<html><body>
            <nav><p>Menu</p></nav>
            <main><p>Actual content.</p></main>
            <footer><p>Copyright</p></footer>
        </body></html>"#;
        assert_eq!(html_to_text(html), "Actual content.");
    }

    #[test]
    fn test_nav_skipped_without_main() {
        let html = "<html><body><nav><p>Menu</p></nav><p>Content.</p></body></html>";
        assert_eq!(html_to_text(html), "Content.");
    }

    #[test]
    fn test_nested_block_not_duplicated() {
        let html = "<html><body><ul><li><p>Item text</p></li></ul></body></html>";
        assert_eq!(html_to_text(html), "Item text");
    }

    #[test]
    fn test_whitespace_collapsed_within_block() {
        let html = "<html><body><p>spread\n    across\n    lines</p></body></html>";
        assert_eq!(html_to_text(html), "spread across lines");
    }

    #[test]
    fn test_pre_keeps_line_structure() {
        let html = "<html><body><pre>fn main() {\n    run();\n}</pre></body></html>";
        assert_eq!(html_to_text(html), "fn main() {\n    run();\n}");
    }

    #[test]
    fn test_empty_page_yields_empty_text() {
        assert_eq!(html_to_text("<html><body></body></html>"), "");
        assert_eq!(html_to_text(""), "");
    }
}

//! Feed retrieval and parsing.
//!
//! Normalizes whatever the blog publishes (Substack RSS in practice, but any
//! RSS/Atom feed-rs understands) into [`FeedEntry`] values. Only the fields
//! the generator consumes are kept.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;

/// Stand-in title for entries that ship without one.
pub const UNTITLED: &str = "Untitled";

/// One feed entry, reduced to the fields the generator consumes.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    /// Fetch the feed and parse it into entries. A transport failure or
    /// non-2xx status is an error; a body that does not parse as a feed is
    /// only a warning (see [`parse_entries`]).
    pub async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("feed request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("feed fetch failed ({}): {}", status, body);
        }

        let body = resp.bytes().await.context("failed to read feed body")?;
        Ok(parse_entries(&body))
    }
}

/// Parse raw feed XML into entries.
///
/// Substack's RSS is sometimes a bit messy. Python's feedparser recovers
/// partial entries from broken markup; feed-rs does not, so a parse failure
/// degrades to "no entries" with a warning — the run then completes as a
/// successful no-op and the entries become eligible again next invocation.
pub fn parse_entries(xml: &[u8]) -> Vec<FeedEntry> {
    let feed = match feed_rs::parser::parse(xml) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::warn!(error = %e, "feed did not parse cleanly; continuing with no entries");
            return Vec::new();
        }
    };

    feed.entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry
                .title
                .map(|t| t.content)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            summary: entry.summary.map(|s| s.content),
            published: entry.published,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Blog</title>
    <link>https://example.com</link>
    <description>posts</description>
    <item>
      <title>Hello, World!</title>
      <description>An opening post about nothing much.</description>
      <pubDate>Mon, 05 Aug 2024 12:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second Post</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_rss_items() {
        let entries = parse_entries(RSS_SAMPLE.as_bytes());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Hello, World!");
        assert_eq!(
            entries[0].summary.as_deref(),
            Some("An opening post about nothing much.")
        );
        assert!(entries[0].published.is_some());
        assert_eq!(entries[1].title, "Second Post");
        assert_eq!(entries[1].summary, None);
    }

    #[test]
    fn preserves_feed_order() {
        let entries = parse_entries(RSS_SAMPLE.as_bytes());
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Hello, World!", "Second Post"]);
    }

    #[test]
    fn missing_title_falls_back_to_untitled() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title>
  <item><description>no title here</description></item>
</channel></rss>"#;
        let entries = parse_entries(xml.as_bytes());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, UNTITLED);
    }

    #[test]
    fn unparseable_body_yields_no_entries() {
        assert!(parse_entries(b"this is not xml at all").is_empty());
        assert!(parse_entries(b"").is_empty());
    }
}

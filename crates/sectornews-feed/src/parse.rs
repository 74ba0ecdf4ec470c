//! RSS 2.0 parsing into raw feed entries.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;

use crate::error::FeedError;

/// One `<item>` exactly as the feed delivered it.
///
/// Every field is optional: feeds routinely omit `source` or `pubDate`, and
/// the consumer decides which absences are fatal for an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Raw description, possibly carrying HTML markup.
    pub description: Option<String>,
    pub pub_date: Option<String>,
    /// Outlet name from `<source>`.
    pub source: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Source,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"pubDate" => Some(Self::PubDate),
            b"source" => Some(Self::Source),
            _ => None,
        }
    }
}

impl FeedEntry {
    fn append(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::PubDate => &mut self.pub_date,
            Field::Source => &mut self.source,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn finish(mut self) -> Self {
        for slot in [
            &mut self.title,
            &mut self.link,
            &mut self.description,
            &mut self.pub_date,
            &mut self.source,
        ] {
            if let Some(value) = slot.take() {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    *slot = Some(trimmed.to_string());
                }
            }
        }
        self
    }
}

/// Parse an RSS XML body into [`FeedEntry`] values, in document order.
///
/// Only direct children of `<item>` are captured; channel-level `<title>` and
/// `<link>` are ignored. Text and CDATA sections inside one field are
/// concatenated.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the XML is malformed.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;
    // Element depth below the open <item>; fields are its depth-1 children.
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if current.is_none() {
                    if e.name().as_ref() == b"item" {
                        current = Some(FeedEntry::default());
                        depth = 0;
                    }
                    continue;
                }
                depth += 1;
                field = if depth == 1 {
                    Field::from_tag(e.name().as_ref())
                } else {
                    None
                };
            }
            Event::End(e) => {
                if current.is_none() {
                    continue;
                }
                if depth == 0 && e.name().as_ref() == b"item" {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish());
                    }
                    field = None;
                    continue;
                }
                depth = depth.saturating_sub(1);
                field = None;
            }
            Event::Text(e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    entry.append(f, &unescape_lossy(&e));
                }
            }
            Event::CData(e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    entry.append(f, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Unescapes XML entities, keeping the raw text when an entity is unknown
/// (HTML-only entities such as `&nbsp;` are common in news feeds).
fn unescape_lossy(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(text.as_ref()).into_owned(),
    }
}

/// Parse a feed timestamp (RFC 2822, falling back to RFC 3339) into UTC.
#[must_use]
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_NEWS_RSS: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>"chip" - Google News</title>
    <link>https://news.google.com/search?q=chip</link>
    <item>
      <title>Samsung unveils new chip factory - Daily Tech</title>
      <link>https://news.example.com/articles/a1</link>
      <guid isPermaLink="false">a1</guid>
      <pubDate>Mon, 14 Oct 2024 07:00:00 GMT</pubDate>
      <description>&lt;a href="https://news.example.com/articles/a1" target="_blank"&gt;Samsung unveils new chip factory&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;Daily Tech&lt;/font&gt;</description>
      <source url="https://dailytech.example.com">Daily Tech</source>
    </item>
    <item>
      <title>Chip exports fall</title>
      <link>https://news.example.com/articles/a2</link>
      <description><![CDATA[<a href="https://news.example.com/articles/a2">Chip exports fall</a>]]></description>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn parses_items_with_all_fields() {
        let entries = parse_feed(GOOGLE_NEWS_RSS).expect("should parse valid RSS");
        assert_eq!(entries.len(), 2, "expected 2 entries, got {entries:?}");

        let first = &entries[0];
        assert_eq!(
            first.title.as_deref(),
            Some("Samsung unveils new chip factory - Daily Tech")
        );
        assert_eq!(
            first.link.as_deref(),
            Some("https://news.example.com/articles/a1")
        );
        assert_eq!(
            first.pub_date.as_deref(),
            Some("Mon, 14 Oct 2024 07:00:00 GMT")
        );
        assert_eq!(first.source.as_deref(), Some("Daily Tech"));
        let description = first.description.as_deref().unwrap();
        assert!(description.starts_with(r#"<a href="https://news.example.com/articles/a1""#));
        assert!(description.contains("&nbsp;"));
    }

    #[test]
    fn missing_optional_fields_are_none() {
        let entries = parse_feed(GOOGLE_NEWS_RSS).unwrap();
        let second = &entries[1];
        assert!(second.pub_date.is_none());
        assert!(second.source.is_none());
        assert_eq!(
            second.description.as_deref(),
            Some(r#"<a href="https://news.example.com/articles/a2">Chip exports fall</a>"#)
        );
    }

    #[test]
    fn channel_level_fields_are_ignored() {
        let entries = parse_feed(GOOGLE_NEWS_RSS).unwrap();
        assert!(entries
            .iter()
            .all(|e| e.link.as_deref() != Some("https://news.google.com/search?q=chip")));
    }

    #[test]
    fn empty_channel_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let entries = parse_feed(xml).expect("should parse empty RSS");
        assert!(entries.is_empty());
    }

    #[test]
    fn blank_fields_become_none() {
        let xml = r"<rss><channel><item><title>  </title><link>https://x.example/1</link></item></channel></rss>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].title.is_none());
    }

    #[test]
    fn mismatched_tags_return_error() {
        let xml = "<rss><channel><item><title>Broken</item></channel></rss>";
        let result = parse_feed(xml);
        assert!(
            matches!(result, Err(FeedError::Xml(_))),
            "expected Xml error, got: {result:?}"
        );
    }

    #[test]
    fn parse_published_reads_rfc2822_gmt() {
        let ts = parse_published("Mon, 14 Oct 2024 07:00:00 GMT").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-10-14T07:00:00+00:00");
    }

    #[test]
    fn parse_published_converts_offsets_to_utc() {
        let ts = parse_published("Tue, 15 Oct 2024 02:00:00 +0900").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-10-14T17:00:00+00:00");
    }

    #[test]
    fn parse_published_accepts_rfc3339() {
        let ts = parse_published("2024-10-14T07:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-10-14T07:00:00+00:00");
    }

    #[test]
    fn parse_published_rejects_garbage() {
        assert!(parse_published("yesterday").is_none());
        assert!(parse_published("").is_none());
    }
}

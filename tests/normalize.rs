//! Integration tests for feed normalization through the public API.
//!
//! Each test parses a literal document and compares the serialized output,
//! so key presence (omitted vs `null`) is checked exactly as consumers see it.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use unifeed::feed::{detect, is_atom_document, is_rss_document, parse_atom, parse_rss, Dialect};
use unifeed::Document;

const RSS_SAMPLE: &str = r#"
    <rss version="2.0">
      <channel>
        <title>Channel Title</title>
        <item>
          <title>Post 1</title>
          <link>https://example.com/post-1</link>
          <description>This is the description of Post 1</description>
          <pubDate>2023-08-01T12:00:00Z</pubDate>
          <author>Author 1</author>
          <category>Category 1</category>
          <comments>https://example.com/post-1#comments</comments>
          <guid>post-1-guid</guid>
          <source>Example Source</source>
        </item>
        <item>
          <title>Post 2</title>
          <link>https://example.com/post-2</link>
        </item>
      </channel>
    </rss>
"#;

const ATOM_SAMPLE: &str = r#"
    <feed xmlns="http://www.w3.org/2005/Atom">
      <title>Feed Title</title>
      <entry>
        <title>Post 1</title>
        <link href="https://example.com/post-1" />
        <link rel="alternate" href="https://example.com/post-1-alternate" />
        <summary type="text">Summary of Post 1</summary>
        <content type="html">Content of Post 1</content>
        <published>2023-08-01T12:00:00Z</published>
        <author>
          <name>Author 1</name>
          <email>author1@example.com</email>
        </author>
        <contributor>
          <name>Contributor 1</name>
          <email>contributor1@example.com</email>
        </contributor>
        <updated>2023-08-02T10:00:00Z</updated>
      </entry>
      <entry>
        <title>Post 2</title>
        <link href="https://example.com/post-2" />
      </entry>
    </feed>
"#;

fn link(href: &str) -> Value {
    json!({ "href": href, "title": null, "rel": null, "type": "link", "hreflang": null })
}

fn rss_json(xml: &str) -> Value {
    serde_json::to_value(parse_rss(&Document::parse(xml).unwrap())).unwrap()
}

fn atom_json(xml: &str) -> Value {
    serde_json::to_value(parse_atom(&Document::parse(xml).unwrap())).unwrap()
}

// ============================================================================
// RSS
// ============================================================================

#[test]
fn test_rss_sample_output() {
    let expected = json!({
        "items": [
            {
                "lastUpdatedTimestamp": null,
                "publishTimestamp": "2023-08-01T12:00:00Z",
                "importerDesc": "Channel Title",
                "postContents": null,
                "postComment": "https://example.com/post-1#comments",
                "contributors": null,
                "postRights": null,
                "postEnclosures": [],
                "guid": "post-1-guid",
                "source": "Example Source",
                "postUrls": [link("https://example.com/post-1")],
                "postTitle": { "type": "text", "value": "Post 1" },
                "postDesc": { "type": "text", "value": "This is the description of Post 1" },
                "postCategories": ["Category 1"],
                "authors": [{ "name": "Author 1", "email": null }]
            },
            {
                "lastUpdatedTimestamp": null,
                "publishTimestamp": null,
                "importerDesc": "Channel Title",
                "postContents": null,
                "postComment": null,
                "contributors": null,
                "postRights": null,
                "postEnclosures": [],
                "guid": null,
                "source": null,
                "postUrls": [link("https://example.com/post-2")],
                "postTitle": { "type": "text", "value": "Post 2" }
            }
        ]
    });

    assert_eq!(rss_json(RSS_SAMPLE), expected);
}

#[test]
fn test_rss_minimal_item_has_no_optional_keys() {
    let value = rss_json(RSS_SAMPLE);
    let item = value["items"][1].as_object().unwrap();

    for key in ["postDesc", "authors", "postCategories"] {
        assert!(!item.contains_key(key), "unexpected key {}", key);
    }
    for key in ["publishTimestamp", "guid", "source", "postRights", "lastUpdatedTimestamp"] {
        assert_eq!(item[key], Value::Null, "{} should be null", key);
    }
}

#[test]
fn test_rss_without_channel_title_has_null_importer_desc() {
    let value = rss_json("<rss><channel><item><title>t</title></item></channel></rss>");
    assert_eq!(value["items"][0]["importerDesc"], Value::Null);
}

// ============================================================================
// Atom
// ============================================================================

#[test]
fn test_atom_sample_output() {
    let expected = json!({
        "items": [
            {
                "lastUpdatedTimestamp": "2023-08-02T10:00:00Z",
                "publishTimestamp": "2023-08-01T12:00:00Z",
                "importerDesc": "Feed Title",
                "postRights": null,
                "postEnclosures": null,
                "guid": null,
                "source": null,
                "postDesc": { "type": "text", "value": "Summary of Post 1" },
                "postContents": [{ "type": "html", "value": "Content of Post 1" }],
                "authors": [{ "name": "Author 1", "email": "author1@example.com" }],
                "contributors": [{ "name": "Contributor 1", "email": "contributor1@example.com" }],
                "postUrls": [
                    link("https://example.com/post-1"),
                    link("https://example.com/post-1-alternate")
                ],
                "postTitle": { "type": "text", "value": "Post 1" }
            },
            {
                "lastUpdatedTimestamp": null,
                "publishTimestamp": null,
                "importerDesc": "Feed Title",
                "postRights": null,
                "postEnclosures": null,
                "guid": null,
                "source": null,
                "postUrls": [link("https://example.com/post-2")],
                "postTitle": { "type": "text", "value": "Post 2" }
            }
        ]
    });

    assert_eq!(atom_json(ATOM_SAMPLE), expected);
}

#[test]
fn test_atom_minimal_entry_has_no_optional_keys() {
    let value = atom_json(ATOM_SAMPLE);
    let item = value["items"][1].as_object().unwrap();

    for key in [
        "authors",
        "contributors",
        "postDesc",
        "postContents",
        "postComment",
        "postCategories",
    ] {
        assert!(!item.contains_key(key), "unexpected key {}", key);
    }
}

#[test]
fn test_atom_related_link_becomes_comment() {
    let value = atom_json(
        r#"<feed><entry>
            <link rel="related" href="https://example.com/thread"/>
        </entry></feed>"#,
    );
    let item = &value["items"][0];
    assert_eq!(item["postComment"], json!("https://example.com/thread"));
    // The related link is also the first link, so it is the primary URL.
    assert_eq!(item["postUrls"], json!([link("https://example.com/thread")]));
}

#[test]
fn test_atom_html_summary_type_kept_verbatim() {
    let value = atom_json(r#"<feed><entry><summary type="html">&lt;b&gt;x&lt;/b&gt;</summary></entry></feed>"#);
    assert_eq!(
        value["items"][0]["postDesc"],
        json!({ "type": "html", "value": "<b>x</b>" })
    );
}

// ============================================================================
// Detection and idempotence
// ============================================================================

#[test]
fn test_detection_order() {
    let rss_with_feed = Document::parse("<rss><channel><feed/></channel></rss>").unwrap();
    assert!(is_rss_document(&rss_with_feed));
    assert!(is_atom_document(&rss_with_feed));
    assert_eq!(detect(&rss_with_feed), Some(Dialect::Rss));

    let atom = Document::parse(ATOM_SAMPLE).unwrap();
    assert_eq!(detect(&atom), Some(Dialect::Atom));

    let neither = Document::parse("<html><body/></html>").unwrap();
    assert_eq!(detect(&neither), None);
}

#[test]
fn test_normalizing_twice_is_equal_and_independent() {
    let doc = Document::parse(ATOM_SAMPLE).unwrap();

    let first = parse_atom(&doc);
    let mut second = parse_atom(&doc);
    assert_eq!(first, second);

    second.items[0].post_urls.clear();
    assert_eq!(first.items[0].post_urls.len(), 2);
    assert_eq!(parse_atom(&doc), first);
}

#[test]
fn test_output_round_trips_through_json() {
    let feed = parse_rss(&Document::parse(RSS_SAMPLE).unwrap());
    let json = serde_json::to_string(&feed).unwrap();
    let back: unifeed::UnifiedFeed = serde_json::from_str(&json).unwrap();
    assert_eq!(back, feed);
}

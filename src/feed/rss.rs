use super::extract::{non_empty, text_of};
use super::model::{FeedItem, Person, PostUrl, Presence, TextConstruct, UnifiedFeed};
use crate::xml::{Document, Element};

/// Normalizes an RSS 2.0 document.
///
/// Every `<item>` in the document becomes one [`FeedItem`], in document order.
/// The item's `importerDesc` is the text of the first `<title>` that is a
/// direct child of a `<channel>`, so item titles never leak into it.
///
/// Empty `title`, `description`, `category` and `author` elements are treated
/// as missing. `postUrls` always holds exactly one record built from the
/// `<link>` text, even when that text is empty or the element is absent.
pub fn parse_rss(doc: &Document) -> UnifiedFeed {
    let importer_desc = doc
        .root()
        .find_child_of("channel", "title")
        .map(Element::text);

    let items = doc
        .find_all("item")
        .map(|item| parse_item(item, importer_desc.as_deref()))
        .collect();

    UnifiedFeed { items }
}

fn parse_item(item: &Element, importer_desc: Option<&str>) -> FeedItem {
    let title = non_empty(text_of(item, "title"));
    let description = non_empty(text_of(item, "description"));
    let author = non_empty(text_of(item, "author"));
    let category = non_empty(text_of(item, "category"));

    FeedItem {
        last_updated_timestamp: None,
        publish_timestamp: text_of(item, "pubDate"),
        importer_desc: importer_desc.map(str::to_owned),
        post_title: title.map(TextConstruct::text),
        post_desc: description.map(TextConstruct::text),
        post_contents: Presence::Null,
        post_urls: vec![PostUrl::link(text_of(item, "link"))],
        post_comment: text_of(item, "comments").into(),
        authors: author.map(|name| vec![Person { name, email: None }]),
        contributors: Presence::Null,
        post_categories: category.map(|category| vec![category]),
        post_rights: None,
        post_enclosures: Some(Vec::new()),
        guid: text_of(item, "guid"),
        source: text_of(item, "source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> UnifiedFeed {
        parse_rss(&Document::parse(xml).unwrap())
    }

    #[test]
    fn test_full_item() {
        let feed = parse(
            r#"<rss version="2.0"><channel>
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
            </channel></rss>"#,
        );

        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(
            item,
            &FeedItem {
                last_updated_timestamp: None,
                publish_timestamp: Some("2023-08-01T12:00:00Z".into()),
                importer_desc: Some("Channel Title".into()),
                post_title: Some(TextConstruct::text("Post 1")),
                post_desc: Some(TextConstruct::text("This is the description of Post 1")),
                post_contents: Presence::Null,
                post_urls: vec![PostUrl::link(Some("https://example.com/post-1".into()))],
                post_comment: Presence::Present("https://example.com/post-1#comments".into()),
                authors: Some(vec![Person {
                    name: "Author 1".into(),
                    email: None
                }]),
                contributors: Presence::Null,
                post_categories: Some(vec!["Category 1".into()]),
                post_rights: None,
                post_enclosures: Some(Vec::new()),
                guid: Some("post-1-guid".into()),
                source: Some("Example Source".into()),
            }
        );
    }

    #[test]
    fn test_minimal_item_defaults() {
        let feed = parse(
            "<rss><channel><title>C</title><item><title>Post 2</title>\
             <link>https://example.com/post-2</link></item></channel></rss>",
        );
        let item = &feed.items[0];

        assert_eq!(item.post_title, Some(TextConstruct::text("Post 2")));
        assert_eq!(item.publish_timestamp, None);
        assert_eq!(item.post_comment, Presence::Null);
        assert_eq!(item.guid, None);
        assert_eq!(item.post_enclosures, Some(Vec::new()));
        assert_eq!(item.post_desc, None);
        assert_eq!(item.authors, None);
        assert_eq!(item.post_categories, None);
    }

    #[test]
    fn test_missing_link_still_produces_one_url() {
        let feed = parse("<rss><channel><item><title>No link</title></item></channel></rss>");
        assert_eq!(feed.items[0].post_urls, vec![PostUrl::link(None)]);
    }

    #[test]
    fn test_empty_link_kept_verbatim() {
        let feed = parse("<rss><channel><item><link></link></item></channel></rss>");
        assert_eq!(feed.items[0].post_urls, vec![PostUrl::link(Some(String::new()))]);
    }

    #[test]
    fn test_empty_title_is_suppressed() {
        let feed = parse(
            "<rss><channel><item><title></title><description/><author></author>\
             <category/></item></channel></rss>",
        );
        let item = &feed.items[0];
        assert_eq!(item.post_title, None);
        assert_eq!(item.post_desc, None);
        assert_eq!(item.authors, None);
        assert_eq!(item.post_categories, None);
    }

    #[test]
    fn test_empty_comments_not_suppressed() {
        let feed = parse("<rss><channel><item><comments/></item></channel></rss>");
        assert_eq!(feed.items[0].post_comment, Presence::Present(String::new()));
    }

    #[test]
    fn test_importer_desc_is_channel_scoped() {
        let feed = parse(
            "<rss><channel><item><title>Item First</title></item>\
             <title>Channel Later</title></channel></rss>",
        );
        assert_eq!(feed.items[0].importer_desc.as_deref(), Some("Channel Later"));
    }

    #[test]
    fn test_missing_channel_title_is_null() {
        let feed = parse("<rss><channel><item><title>Only</title></item></channel></rss>");
        assert_eq!(feed.items[0].importer_desc, None);
    }

    #[test]
    fn test_items_keep_document_order() {
        let feed = parse(
            "<rss><channel><item><title>a</title></item><item><title>b</title></item>\
             <item><title>c</title></item></channel></rss>",
        );
        let titles: Vec<&str> = feed
            .items
            .iter()
            .filter_map(|i| i.post_title.as_ref())
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cdata_description() {
        let feed = parse(
            "<rss><channel><item><description><![CDATA[<p>Hello</p>]]></description>\
             </item></channel></rss>",
        );
        assert_eq!(
            feed.items[0].post_desc,
            Some(TextConstruct::text("<p>Hello</p>"))
        );
    }

    #[test]
    fn test_no_items() {
        assert!(parse("<rss><channel><title>Empty</title></channel></rss>")
            .items
            .is_empty());
    }
}

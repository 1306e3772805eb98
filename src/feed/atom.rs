use super::extract::{link_of, non_empty, person_of, text_construct_of, text_of};
use super::model::{FeedItem, PostUrl, Presence, TextConstruct, UnifiedFeed};
use crate::xml::{Document, Element};

const REL_ALTERNATE: &str = "alternate";
const REL_RELATED: &str = "related";

/// Normalizes an Atom 1.0 document.
///
/// Every `<entry>` becomes one [`FeedItem`], in document order. Unlike RSS,
/// `importerDesc` is the first `<title>` anywhere in the document.
///
/// `postUrls` holds the first `<link>` followed by the first
/// `rel="alternate"` link, each only when it has a non-empty `href`. The two
/// are not deduplicated, so an entry whose only link is `rel="alternate"`
/// yields it twice. The `rel="related"` link becomes `postComment`.
pub fn parse_atom(doc: &Document) -> UnifiedFeed {
    let importer_desc = doc.find("title").map(Element::text);

    let items = doc
        .find_all("entry")
        .map(|entry| parse_entry(entry, importer_desc.as_deref()))
        .collect();

    UnifiedFeed { items }
}

fn parse_entry(entry: &Element, importer_desc: Option<&str>) -> FeedItem {
    let primary = non_empty(link_of(entry, None));
    let alternate = non_empty(link_of(entry, Some(REL_ALTERNATE)));
    let related = non_empty(link_of(entry, Some(REL_RELATED)));

    let post_urls = [primary, alternate]
        .into_iter()
        .flatten()
        .map(|href| PostUrl::link(Some(href)))
        .collect();

    FeedItem {
        last_updated_timestamp: text_of(entry, "updated"),
        publish_timestamp: text_of(entry, "published"),
        importer_desc: importer_desc.map(str::to_owned),
        post_title: non_empty(text_of(entry, "title")).map(TextConstruct::text),
        post_desc: text_construct_of(entry, "summary"),
        post_contents: Presence::omit_if_none(
            text_construct_of(entry, "content").map(|content| vec![content]),
        ),
        post_urls,
        post_comment: Presence::omit_if_none(related),
        authors: person_of(entry, "author").map(|author| vec![author]),
        contributors: Presence::omit_if_none(
            person_of(entry, "contributor").map(|contributor| vec![contributor]),
        ),
        post_categories: None,
        post_rights: None,
        post_enclosures: None,
        guid: None,
        source: None,
    }
}

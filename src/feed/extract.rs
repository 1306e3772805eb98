//! Single-value lookups shared by the RSS and Atom normalizers.

use super::model::{Person, TextConstruct, DEFAULT_TEXT_TYPE};
use crate::xml::Element;

/// Raw text content of the first descendant named `tag`.
pub fn text_of(element: &Element, tag: &str) -> Option<String> {
    element.find(tag).map(Element::text)
}

/// `href` of a `<link>` descendant.
///
/// Without a filter this is the first `<link>` in the subtree. With one, it is
/// the first `<link>` whose `rel`, lowercased, equals `rel_filter`; the filter
/// itself is expected to be lowercase already.
pub fn link_of(element: &Element, rel_filter: Option<&str>) -> Option<String> {
    let link = match rel_filter {
        None => element.find("link"),
        Some(filter) => element
            .find_all("link")
            .find(|link| rel_matches(link, filter)),
    }?;
    link.attr("href").map(str::to_owned)
}

/// Every `href` of `<link>` descendants matching `rel_filter`, in document order.
pub fn links_of(element: &Element, rel_filter: Option<&str>) -> Vec<String> {
    element
        .find_all("link")
        .filter(|link| match rel_filter {
            Some(filter) => rel_matches(link, filter),
            None => true,
        })
        .filter_map(|link| link.attr("href"))
        .map(str::to_owned)
        .collect()
}

/// `{type, value}` of the first descendant named `tag`; `type` falls back to
/// `"text"` when the attribute is missing or empty.
pub fn text_construct_of(element: &Element, tag: &str) -> Option<TextConstruct> {
    let found = element.find(tag)?;
    let kind = found
        .attr("type")
        .filter(|kind| !kind.is_empty())
        .unwrap_or(DEFAULT_TEXT_TYPE);
    Some(TextConstruct {
        kind: kind.to_string(),
        value: found.text(),
    })
}

/// `{name, email}` of the first descendant named `tag` (`author`, `contributor`).
///
/// Missing `<name>`/`<email>` children become empty strings, never `None`.
pub fn person_of(element: &Element, tag: &str) -> Option<Person> {
    let person = element.find(tag)?;
    Some(Person {
        name: text_of(person, "name").unwrap_or_default(),
        email: Some(text_of(person, "email").unwrap_or_default()),
    })
}

/// Treats an empty string the same as a missing value.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn rel_matches(link: &Element, filter: &str) -> bool {
    link.attr("rel")
        .is_some_and(|rel| rel.to_lowercase() == filter)
}

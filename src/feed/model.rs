use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `type` assigned to text constructs whose source element carries none.
pub const DEFAULT_TEXT_TYPE: &str = "text";

/// `type` carried by every [`PostUrl`] produced by the normalizers.
pub const LINK_TYPE: &str = "link";

/// A field that can be missing from the output, present as `null`, or present
/// with a value.
///
/// RSS and Atom disagree on which of these three states some keys take when
/// the source has no data, and downstream consumers can observe the
/// difference, so it is modelled explicitly. [`Presence::Absent`] keys are
/// skipped when serializing; a missing key deserializes back to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Presence<T> {
    /// `Present` for `Some`, `Absent` (not `Null`) for `None`.
    pub fn omit_if_none(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> Default for Presence<T> {
    fn default() -> Self {
        Self::Absent
    }
}

/// `None` maps to `Null`; use [`Presence::omit_if_none`] for `Absent`.
impl<T> From<Option<T>> for Presence<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }
}

impl<T: Serialize> Serialize for Presence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Presence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Normalizer output: one item per `<item>`/`<entry>`, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedFeed {
    pub items: Vec<FeedItem>,
}

/// A `{type, value}` pair for titles, descriptions and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConstruct {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl TextConstruct {
    /// A construct of the default `"text"` type.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: DEFAULT_TEXT_TYPE.to_string(),
            value: value.into(),
        }
    }
}

/// A link record. Only `href` is ever extracted; `type` is always `"link"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUrl {
    pub href: Option<String>,
    pub title: Option<String>,
    pub rel: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub hreflang: Option<String>,
}

impl PostUrl {
    pub fn link(href: Option<String>) -> Self {
        Self {
            href,
            title: None,
            rel: None,
            kind: LINK_TYPE.to_string(),
            hreflang: None,
        }
    }
}

/// An author or contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
}

/// One syndicated entry in dialect-agnostic form.
///
/// Serialized keys are camelCase. Fields typed `Option<T>` without a skip
/// attribute are always emitted (as `null` when empty); the rest are omitted
/// when the source had nothing for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub last_updated_timestamp: Option<String>,
    pub publish_timestamp: Option<String>,
    /// Title of the channel/feed the item came from.
    pub importer_desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_title: Option<TextConstruct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_desc: Option<TextConstruct>,
    #[serde(default, skip_serializing_if = "Presence::is_absent")]
    pub post_contents: Presence<Vec<TextConstruct>>,

    pub post_urls: Vec<PostUrl>,
    #[serde(default, skip_serializing_if = "Presence::is_absent")]
    pub post_comment: Presence<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Presence::is_absent")]
    pub contributors: Presence<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_categories: Option<Vec<String>>,

    /// Reserved; never populated.
    pub post_rights: Option<String>,
    pub post_enclosures: Option<Vec<PostUrl>>,
    pub guid: Option<String>,
    pub source: Option<String>,
}

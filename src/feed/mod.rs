//! Feed normalization: RSS 2.0 and Atom 1.0 into one item schema.
//!
//! This module is the pure core of the crate:
//!
//! - **Detection**: classify a parsed document as RSS, Atom, or neither
//! - **Normalization**: one independent function per dialect, both producing
//!   a [`UnifiedFeed`]
//!
//! # Architecture
//!
//! - [`detect`] - dialect predicates, RSS checked first
//! - [`rss`] / [`atom`] - per-dialect normalizers, no shared base
//! - [`extract`] - text, link and person lookups both normalizers use
//! - [`model`] - the output shape, including which keys are omitted vs `null`
//!
//! The normalizers never dispatch on dialect themselves; callers run
//! [`detect()`] and pick one.
//!
//! # Example
//!
//! ```
//! use unifeed::feed::{detect, parse_atom, parse_rss, Dialect};
//! use unifeed::xml::Document;
//!
//! let doc = Document::parse("<rss><channel><item><title>Hi</title></item></channel></rss>")?;
//! let feed = match detect(&doc) {
//!     Some(Dialect::Rss) => parse_rss(&doc),
//!     Some(Dialect::Atom) => parse_atom(&doc),
//!     None => unreachable!(),
//! };
//! assert_eq!(feed.items.len(), 1);
//! # Ok::<(), unifeed::xml::XmlError>(())
//! ```

pub mod atom;
pub mod detect;
pub mod extract;
pub mod model;
pub mod rss;

pub use atom::parse_atom;
pub use detect::{detect, is_atom_document, is_rss_document, Dialect};
pub use model::{FeedItem, Person, PostUrl, Presence, TextConstruct, UnifiedFeed};
pub use rss::parse_rss;

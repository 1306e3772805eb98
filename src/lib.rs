//! Normalizes RSS 2.0 and Atom 1.0 feeds into one unified item schema.
//!
//! - [`xml`] - owned XML tree built with `quick-xml`
//! - [`feed`] - dialect detection and the two normalizers (pure, synchronous)
//! - [`fetch`] / [`store`] - loading feeds over HTTP and holding the result
//! - [`timestamp`] - display formatting for the raw timestamps
//! - [`config`] - optional TOML configuration

pub mod config;
pub mod feed;
pub mod fetch;
pub mod store;
pub mod timestamp;
pub mod xml;

pub use feed::{FeedItem, UnifiedFeed};
pub use xml::Document;

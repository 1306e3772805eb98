use std::fmt;

use crate::xml::Document;

/// Syndication dialects the normalizers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Rss,
    Atom,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rss => f.write_str("RSS"),
            Self::Atom => f.write_str("Atom"),
        }
    }
}

/// True if any element in the document is named `rss`.
pub fn is_rss_document(doc: &Document) -> bool {
    doc.find("rss").is_some()
}

/// True if any element in the document is named `feed`.
pub fn is_atom_document(doc: &Document) -> bool {
    doc.find("feed").is_some()
}

/// Classifies a document, checking RSS before Atom.
///
/// `None` means neither dialect was recognized and no feed should be produced.
pub fn detect(doc: &Document) -> Option<Dialect> {
    if is_rss_document(doc) {
        Some(Dialect::Rss)
    } else if is_atom_document(doc) {
        Some(Dialect::Atom)
    } else {
        None
    }
}

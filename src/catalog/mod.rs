//! Local book catalog collaborator.
//!
//! The enrichment step fills gaps in engine records from locally
//! authoritative data. The catalog proper (its storage, CRUD surface) lives
//! in another service; this module only defines the read-only lookup seam
//! the pipeline depends on, plus an in-memory implementation seeded from
//! configuration.

use std::collections::HashMap;

use crate::config::CatalogSeed;

/// Locally known details for a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub author: String,
}

/// Read-only key-value lookup into the local book catalog.
///
/// Lookups are synchronous and expected to be fast; the pipeline calls this
/// once per record on the enrichment path.
pub trait CatalogLookup: Send + Sync + 'static {
    /// Return the locally known entry for `isbn`, if any.
    fn lookup(&self, isbn: &str) -> Option<CatalogEntry>;
}

/// In-memory catalog backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    books: HashMap<String, CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from configuration seed entries.
    pub fn from_seed(seed: &[CatalogSeed]) -> Self {
        let books = seed
            .iter()
            .map(|book| {
                (
                    book.isbn.clone(),
                    CatalogEntry {
                        title: book.title.clone(),
                        author: book.author.clone(),
                    },
                )
            })
            .collect();
        Self { books }
    }

    pub fn insert(&mut self, isbn: impl Into<String>, title: impl Into<String>, author: impl Into<String>) {
        self.books.insert(
            isbn.into(),
            CatalogEntry {
                title: title.into(),
                author: author.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn lookup(&self, isbn: &str) -> Option<CatalogEntry> {
        self.books.get(isbn).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hits_and_misses() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert("111", "Foo", "Bar");

        let entry = catalog.lookup("111").unwrap();
        assert_eq!(entry.title, "Foo");
        assert_eq!(entry.author, "Bar");
        assert!(catalog.lookup("222").is_none());
    }

    #[test]
    fn seeded_from_config() {
        let seed = vec![CatalogSeed {
            isbn: "978-1".into(),
            title: "Systems".into(),
            author: "Someone".into(),
        }];
        let catalog = InMemoryCatalog::from_seed(&seed);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.lookup("978-1").is_some());
    }
}

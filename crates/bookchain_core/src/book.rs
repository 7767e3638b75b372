//! Catalog entries.

use crate::CatalogId;
use serde::{Deserialize, Serialize};

/// A book in the catalog
///
/// The `id` is never taken from the client; it is derived from the ISBN
/// and publication date by [`Book::with_derived_id`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    /// Derived catalog id
    #[serde(skip_deserializing)]
    pub id: Option<CatalogId>,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Publication date, as supplied
    pub published_date: String,
    /// ISBN, as supplied
    pub isbn: String,
}

impl Book {
    /// Fill in the catalog id from `isbn` and `published_date`
    #[must_use]
    pub fn with_derived_id(mut self) -> Self {
        self.id = Some(CatalogId::derive(&self.isbn, &self.published_date));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_supplied_id_is_ignored() {
        let book: Book = serde_json::from_str(
            r#"{"id":"deadbeef","title":"T","author":"A","published_date":"2018","isbn":"1"}"#,
        )
        .unwrap();
        assert_eq!(book.id, None);
        assert_eq!(book.title, "T");
    }

    #[test]
    fn test_derived_id() {
        let book = Book {
            isbn: "978-0-13-468599-1".into(),
            published_date: "2018-01-01".into(),
            ..Book::default()
        }
        .with_derived_id();
        assert_eq!(
            book.id.map(|id| id.to_hex()).as_deref(),
            Some("5364efe13fb8bcec3d94eab2af619114")
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let book: Book = serde_json::from_str(r#"{"isbn":"1"}"#).unwrap();
        assert_eq!(book.isbn, "1");
        assert!(book.title.is_empty());
    }
}

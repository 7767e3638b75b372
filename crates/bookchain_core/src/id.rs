//! Catalog identifiers for books.
//!
//! A catalog id is the MD5 of `isbn || published_date`. It exists so the
//! same edition always maps to the same id; it is not a tamper-evidence
//! mechanism and never feeds into block digests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier - stable id for a book edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CatalogId([u8; 16]);

impl CatalogId {
    /// Derive the id for an edition
    #[must_use]
    pub fn derive(isbn: &str, published_date: &str) -> Self {
        let mut ctx = md5::Context::new();
        ctx.consume(isbn.as_bytes());
        ctx.consume(published_date.as_bytes());
        Self(ctx.compute().0)
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<CatalogId> for String {
    fn from(id: CatalogId) -> Self {
        id.to_hex()
    }
}

impl TryFrom<String> for CatalogId {
    type Error = crate::HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&value).map_err(|_| crate::HashError::InvalidHex)?;
        let arr: [u8; 16] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| crate::HashError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

//! Checkout events recorded in the log.

use crate::block::Payload;
use crate::encoding::CanonicalEncode;
use serde::{Deserialize, Serialize};

/// A book changing hands
///
/// Field order is part of the canonical encoding; do not reorder.
/// Missing fields decode as empty so partial client bodies are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutEvent {
    /// Catalog id of the book
    pub book_id: String,
    /// Who took it
    pub user: String,
    /// When, as reported by the client
    pub checkout_date: String,
    /// Marks the synthetic first entry
    pub is_genesis: bool,
}

impl CheckoutEvent {
    /// Create a regular checkout
    pub fn new(
        book_id: impl Into<String>,
        user: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            user: user.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }
}

impl CanonicalEncode for CheckoutEvent {}

impl Payload for CheckoutEvent {
    fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }

    fn is_genesis(&self) -> bool {
        self.is_genesis
    }
}

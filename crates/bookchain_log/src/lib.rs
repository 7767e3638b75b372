//! BOOKCHAIN Checkout Log
//!
//! Canonical encoding, hash-chained, append-only checkout records.
//! Payloads are deterministically encoded so digests reproduce anywhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod chain;
pub mod encoding;
pub mod event;
pub mod shared;

pub use block::{Block, Payload};
pub use chain::{Chain, ChainError, validate_blocks, verify_link};
pub use encoding::{CanonicalEncode, EncodingError, block_digest};
pub use event::CheckoutEvent;
pub use shared::SharedChain;

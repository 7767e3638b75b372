//! BOOKCHAIN Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! All types are serializable with stable, cross-platform encoding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod error;
pub mod hash;
pub mod id;
pub mod time;

// Re-exports
pub use book::Book;
pub use error::{CoreError, CoreResult};
pub use hash::{Hash, HashError};
pub use id::CatalogId;
pub use time::{Clock, FixedClock, StepClock, SystemClock, format_timestamp, parse_timestamp};

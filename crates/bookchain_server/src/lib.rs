//! BOOKCHAIN Server
//!
//! HTTP adapter over the checkout log. Decodes JSON bodies into
//! checkout events, appends them, and serves the chain back as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod logging;

pub use api::{ApiError, ApiServer, AppState, create_router};
pub use config::{LogFormat, ServerConfig};
pub use logging::init_logging;

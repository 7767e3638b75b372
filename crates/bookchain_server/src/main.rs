//! BOOKCHAIN Server
//!
//! Serves one in-memory checkout chain for the life of the process.

#![warn(missing_docs)]
#![warn(clippy::all)]

use anyhow::Result;
use bookchain_log::{Chain, SharedChain};
use bookchain_server::{ApiServer, ServerConfig, init_logging};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level, config.log_format);

    let chain: SharedChain = SharedChain::new(Chain::new()?);
    tracing::info!(genesis = %chain.tail().hash(), "chain initialized");

    let server = ApiServer::new(config, chain);
    server.serve().await?;

    Ok(())
}

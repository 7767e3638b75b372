//! Server configuration from flags and environment.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for local runs
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Runtime configuration for `bookchain-server`
#[derive(Debug, Clone, Parser)]
#[command(name = "bookchain-server")]
#[command(about = "BOOKCHAIN checkout log server", long_about = None, version)]
pub struct ServerConfig {
    /// Bind address
    #[arg(short, long, env = "BOOKCHAIN_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "BOOKCHAIN_LOG", default_value = "bookchain=info,tower_http=info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "BOOKCHAIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "bookchain=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

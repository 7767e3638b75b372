//! BOOKCHAIN CLI
//!
//! Offline tools over chain dumps (the JSON served by `GET /`).

#![warn(missing_docs)]
#![warn(clippy::all)]

use bookchain_core::{CatalogId, Hash, parse_timestamp};
use bookchain_log::{Block, CheckoutEvent, block_digest, validate_blocks};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "bookchain")]
#[command(about = "BOOKCHAIN - tamper-evident checkout log tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a chain dump
    Verify {
        /// Path to a JSON array of blocks
        #[arg(short, long)]
        file: String,
    },
    /// Derive a book's catalog id
    BookId {
        /// ISBN
        #[arg(long)]
        isbn: String,
        /// Publication date
        #[arg(long)]
        published_date: String,
    },
    /// Compute a block digest
    Digest {
        /// Block position
        #[arg(long)]
        position: u64,
        /// RFC 3339 timestamp, hashed as given
        #[arg(long)]
        timestamp: String,
        /// Book id
        #[arg(long)]
        book_id: String,
        /// User
        #[arg(long)]
        user: String,
        /// Checkout date
        #[arg(long, default_value = "")]
        checkout_date: String,
        /// Mark as the genesis payload
        #[arg(long)]
        genesis: bool,
        /// Hex digest of the previous block; omit for genesis
        #[arg(long)]
        prev: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify { file } => {
            let count = verify_file(Path::new(&file))?;
            println!("ok: {} blocks verified", count);
            Ok(())
        }
        Commands::BookId {
            isbn,
            published_date,
        } => {
            println!("{}", CatalogId::derive(&isbn, &published_date));
            Ok(())
        }
        Commands::Digest {
            position,
            timestamp,
            book_id,
            user,
            checkout_date,
            genesis,
            prev,
        } => {
            let event = CheckoutEvent {
                book_id,
                user,
                checkout_date,
                is_genesis: genesis,
            };
            let digest = digest(position, &timestamp, &event, prev.as_deref())?;
            println!("{}", digest);
            Ok(())
        }
    }
}

/// Load a dump and check it, returning the number of blocks
fn verify_file(path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    let blocks: Vec<Block<CheckoutEvent>> =
        serde_json::from_str(&text).wrap_err("dump is not a JSON array of blocks")?;
    validate_blocks(&blocks).map_err(|e| eyre!("chain is invalid: {}", e))?;
    Ok(blocks.len())
}

fn digest(position: u64, timestamp: &str, event: &CheckoutEvent, prev: Option<&str>) -> Result<Hash> {
    parse_timestamp(timestamp)?;
    let prev = prev.map(Hash::from_hex).transpose()?;
    Ok(block_digest(position, timestamp, event, prev.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookchain_core::StepClock;
    use bookchain_log::Chain;
    use clap::CommandFactory;
    use std::io::Write;
    use std::sync::Arc;

    fn dump(n: usize) -> Vec<Block<CheckoutEvent>> {
        let mut chain: Chain = Chain::with_clock(Arc::new(StepClock::from_unix(0))).unwrap();
        for i in 0..n {
            chain.append(CheckoutEvent::new(format!("ISBN{i}"), "bob", "")).unwrap();
        }
        chain.into_blocks()
    }

    fn write_dump(blocks: &[Block<CheckoutEvent>]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(blocks).unwrap().as_bytes())
            .unwrap();
        file
    }

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_valid_dump() {
        let file = write_dump(&dump(3));
        assert_eq!(verify_file(file.path()).unwrap(), 4);
    }

    #[test]
    fn test_verify_detects_edit() {
        let mut json = serde_json::to_value(dump(3)).unwrap();
        json[2]["data"]["user"] = "mallory".into();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.to_string().as_bytes()).unwrap();

        let err = verify_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_verify_rejects_non_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"hello\":1}").unwrap();
        assert!(verify_file(file.path()).is_err());
    }

    #[test]
    fn test_verify_missing_file() {
        assert!(verify_file(Path::new("/nonexistent/bookchain.json")).is_err());
    }

    #[test]
    fn test_digest_golden_fixture() {
        let event = CheckoutEvent::new("abc", "alice", "");
        let hash = digest(
            1,
            "2024-01-01T00:00:00Z",
            &event,
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        )
        .unwrap();
        assert_eq!(
            hash.to_hex(),
            "a692a03a259be624bdcf077845986e93c516382cc3347d5eb8fcc1b361681c46"
        );
    }

    #[test]
    fn test_digest_matches_served_block() {
        let blocks = dump(1);
        let block = &blocks[1];
        let prev = block.prev_hash().map(Hash::to_hex);
        let hash = digest(block.position(), block.timestamp(), block.data(), prev.as_deref()).unwrap();
        assert_eq!(&hash, block.hash());
    }

    #[test]
    fn test_digest_rejects_bad_inputs() {
        let event = CheckoutEvent::new("abc", "alice", "");
        assert!(digest(1, "not a time", &event, None).is_err());
        assert!(digest(1, "2024-01-01T00:00:00Z", &event, Some("abc")).is_err());
    }
}

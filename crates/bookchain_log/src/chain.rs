//! Hash chain for tamper-evident checkout logging.
//!
//! Each block's prev_hash must match the previous block's hash, its
//! position must be one past the previous block's, and its stored hash
//! must recompute from its own fields.

use bookchain_core::{Clock, Hash, SystemClock};
use std::fmt;
use std::sync::Arc;

use crate::block::{Block, Payload};
use crate::encoding::{CanonicalEncode, EncodingError};
use crate::event::CheckoutEvent;

/// An append-only chain of blocks, never empty
pub struct Chain<P = CheckoutEvent> {
    blocks: Vec<Block<P>>,
    clock: Arc<dyn Clock>,
}

impl<P: Payload> Chain<P> {
    /// Start a chain stamped by the system clock
    ///
    /// # Errors
    ///
    /// Returns error if the genesis payload cannot be encoded
    pub fn new() -> Result<Self, ChainError> {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Start a chain stamped by `clock`
    ///
    /// # Errors
    ///
    /// Returns error if the genesis payload cannot be encoded
    pub fn with_clock(clock: Arc<dyn Clock>) -> Result<Self, ChainError> {
        let genesis = Block::genesis(clock.as_ref())?;
        Ok(Self {
            blocks: vec![genesis],
            clock,
        })
    }

    /// Build a block for `payload` on top of the tail and append it
    ///
    /// # Errors
    ///
    /// Returns error if the candidate does not extend the tail. The chain
    /// is left unchanged.
    pub fn append(&mut self, payload: P) -> Result<&Block<P>, ChainError> {
        let candidate = Block::next(self.tail(), payload, self.clock.as_ref())?;
        self.try_push(candidate)?;
        Ok(self.tail())
    }

    /// Validate an already-built candidate against the tail and push it
    pub(crate) fn try_push(&mut self, candidate: Block<P>) -> Result<(), ChainError> {
        verify_link(self.tail(), &candidate, self.blocks.len())?;
        self.blocks.push(candidate);
        Ok(())
    }

    /// Check every block from genesis to tail
    ///
    /// # Errors
    ///
    /// Returns the first violation found
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_blocks(&self.blocks)
    }
}

impl<P> Chain<P> {
    /// Most recently appended block
    #[must_use]
    pub fn tail(&self) -> &Block<P> {
        // Genesis is pushed at construction and nothing is ever removed.
        &self.blocks[self.blocks.len() - 1]
    }

    /// First block
    #[must_use]
    pub fn genesis(&self) -> &Block<P> {
        &self.blocks[0]
    }

    /// All blocks in order
    #[must_use]
    pub fn blocks(&self) -> &[Block<P>] {
        &self.blocks
    }

    /// Block at `position`
    #[must_use]
    pub fn get(&self, position: u64) -> Option<&Block<P>> {
        usize::try_from(position).ok().and_then(|i| self.blocks.get(i))
    }

    /// Number of blocks, genesis included
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; present for clippy's `len_without_is_empty`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consume the chain, returning its blocks
    #[must_use]
    pub fn into_blocks(self) -> Vec<Block<P>> {
        self.blocks
    }
}

impl<P> fmt::Debug for Chain<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.blocks.len())
            .field("tail", &self.tail().hash)
            .finish()
    }
}

/// Check that `candidate` correctly extends `prev`
///
/// `position` is the candidate's index, used to tag errors.
///
/// # Errors
///
/// Returns the first failing check, in the order: link, digest, position
pub fn verify_link<P: CanonicalEncode>(
    prev: &Block<P>,
    candidate: &Block<P>,
    position: usize,
) -> Result<(), ChainError> {
    if candidate.prev_hash.as_ref() != Some(&prev.hash) {
        return Err(ChainError::LinkMismatch {
            position,
            expected: prev.hash.to_hex(),
            actual: hex_or_empty(candidate.prev_hash.as_ref()),
        });
    }
    verify_digest(candidate, position)?;
    if prev.position.checked_add(1) != Some(candidate.position) {
        return Err(ChainError::PositionMismatch {
            position,
            expected: prev.position.saturating_add(1),
            actual: candidate.position,
        });
    }
    Ok(())
}

/// Check a full sequence of blocks, genesis first
///
/// # Errors
///
/// Returns the first violation found, tagged with its index
pub fn validate_blocks<P: Payload>(blocks: &[Block<P>]) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::Empty)?;
    verify_genesis(genesis)?;
    for (i, pair) in blocks.windows(2).enumerate() {
        verify_link(&pair[0], &pair[1], i + 1)?;
    }
    Ok(())
}

fn verify_genesis<P: Payload>(genesis: &Block<P>) -> Result<(), ChainError> {
    if genesis.prev_hash.is_some() {
        return Err(ChainError::LinkMismatch {
            position: 0,
            expected: String::new(),
            actual: hex_or_empty(genesis.prev_hash.as_ref()),
        });
    }
    verify_digest(genesis, 0)?;
    if genesis.position != 0 {
        return Err(ChainError::PositionMismatch {
            position: 0,
            expected: 0,
            actual: genesis.position,
        });
    }
    if !genesis.data.is_genesis() {
        return Err(ChainError::NotGenesis);
    }
    Ok(())
}

fn verify_digest<P: CanonicalEncode>(block: &Block<P>, position: usize) -> Result<(), ChainError> {
    let computed = block.compute_hash()?;
    if computed != block.hash {
        return Err(ChainError::DigestMismatch {
            position,
            stored: block.hash,
            computed,
        });
    }
    Ok(())
}

fn hex_or_empty(hash: Option<&Hash>) -> String {
    hash.map(Hash::to_hex).unwrap_or_default()
}

/// Chain validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// prev_hash does not name the preceding block
    #[error("Broken link at position {position}: expected prev_hash {expected:?}, got {actual:?}")]
    LinkMismatch {
        /// Index of the offending block
        position: usize,
        /// Hex digest of the predecessor, empty for genesis
        expected: String,
        /// Hex prev_hash found on the block
        actual: String,
    },
    /// Stored hash does not recompute
    #[error("Digest mismatch at position {position}: stored {stored}, computed {computed}")]
    DigestMismatch {
        /// Index of the offending block
        position: usize,
        /// Digest carried by the block
        stored: Hash,
        /// Digest recomputed from its fields
        computed: Hash,
    },
    /// Position is not one past the predecessor's
    #[error("Position mismatch at index {position}: expected {expected}, got {actual}")]
    PositionMismatch {
        /// Index of the offending block
        position: usize,
        /// Position the block should carry
        expected: u64,
        /// Position it carries
        actual: u64,
    },
    /// Payload could not be canonically encoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// First block's payload lacks the genesis marker
    #[error("Block at position 0 is not marked as genesis")]
    NotGenesis,
    /// Predecessor already sits at the last representable position
    #[error("Position overflow: no position follows u64::MAX")]
    PositionOverflow,
    /// No blocks at all, not even genesis
    #[error("Chain has no genesis block")]
    Empty,
}

impl ChainError {
    /// Index of the offending block, if the error names one
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::LinkMismatch { position, .. }
            | Self::DigestMismatch { position, .. }
            | Self::PositionMismatch { position, .. } => Some(*position),
            Self::NotGenesis => Some(0),
            Self::Encoding(_) | Self::PositionOverflow | Self::Empty => None,
        }
    }
}

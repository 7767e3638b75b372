//! Blocks: one immutable record each, linked by digest.
//!
//! A block's digest is computed once, when it is built. Checking a block
//! recomputes into a local and compares; the stored digest is never
//! rewritten.

use bookchain_core::{Clock, Hash};
use serde::{Deserialize, Serialize};

use crate::chain::ChainError;
use crate::encoding::{CanonicalEncode, EncodingError, block_digest};

/// Data carried by a block
pub trait Payload: CanonicalEncode + Clone {
    /// Payload of the first block
    fn genesis() -> Self;

    /// Whether this payload carries the genesis marker
    fn is_genesis(&self) -> bool;
}

/// A single entry in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block<P> {
    pub(crate) position: u64,
    pub(crate) data: P,
    pub(crate) timestamp: String,
    pub(crate) hash: Hash,
    pub(crate) prev_hash: Option<Hash>,
}

impl<P: Payload> Block<P> {
    /// Build the first block: position 0, no predecessor
    ///
    /// # Errors
    ///
    /// Returns error if the genesis payload cannot be encoded
    pub fn genesis(clock: &dyn Clock) -> Result<Self, ChainError> {
        Ok(Self::seal(0, P::genesis(), clock.timestamp(), None)?)
    }

    /// Build the successor of `predecessor`
    ///
    /// # Errors
    ///
    /// Returns error if `payload` cannot be encoded or `predecessor` is
    /// already at the last representable position
    pub fn next(predecessor: &Block<P>, payload: P, clock: &dyn Clock) -> Result<Self, ChainError> {
        let position = predecessor
            .position
            .checked_add(1)
            .ok_or(ChainError::PositionOverflow)?;
        Ok(Self::seal(position, payload, clock.timestamp(), Some(predecessor.hash))?)
    }

    fn seal(
        position: u64,
        data: P,
        timestamp: String,
        prev_hash: Option<Hash>,
    ) -> Result<Self, EncodingError> {
        let hash = block_digest(position, &timestamp, &data, prev_hash.as_ref())?;
        Ok(Self {
            position,
            data,
            timestamp,
            hash,
            prev_hash,
        })
    }
}

impl<P: CanonicalEncode> Block<P> {
    /// Recompute the digest from the block's current fields
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be encoded
    pub fn compute_hash(&self) -> Result<Hash, EncodingError> {
        block_digest(self.position, &self.timestamp, &self.data, self.prev_hash.as_ref())
    }
}

impl<P> Block<P> {
    /// Position in the chain; genesis is 0
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Payload
    #[must_use]
    pub fn data(&self) -> &P {
        &self.data
    }

    /// Creation time
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Digest stored at construction
    #[must_use]
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Digest of the preceding block, `None` for genesis
    #[must_use]
    pub fn prev_hash(&self) -> Option<&Hash> {
        self.prev_hash.as_ref()
    }

    /// Whether this is the first block
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.position == 0 && self.prev_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckoutEvent;
    use bookchain_core::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::from_unix(1_704_067_200)
    }

    #[test]
    fn test_genesis_block_properties() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        assert_eq!(genesis.position(), 0);
        assert!(genesis.prev_hash().is_none());
        assert!(genesis.data().is_genesis);
        assert!(genesis.is_genesis());
        assert_eq!(genesis.timestamp(), "2024-01-01T00:00:00.000000000Z");
    }

    #[test]
    fn test_genesis_digest_recomputes() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        assert_eq!(genesis.compute_hash().unwrap(), *genesis.hash());
    }

    #[test]
    fn test_genesis_golden_digest() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        assert_eq!(
            genesis.hash().to_hex(),
            "3efa784f72e859fe53da92645c6a275e11b38b3685717d04b7fb361853f95ab8"
        );
    }

    #[test]
    fn test_next_links_to_predecessor() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        let block = Block::next(&genesis, CheckoutEvent::new("ISBN1", "bob", ""), &clock()).unwrap();

        assert_eq!(block.position(), 1);
        assert_eq!(block.prev_hash(), Some(genesis.hash()));
        assert_eq!(block.data().book_id, "ISBN1");
        assert!(!block.is_genesis());
        assert_eq!(block.compute_hash().unwrap(), *block.hash());
    }

    #[test]
    fn test_compute_hash_does_not_mutate() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        let mut block = Block::next(&genesis, CheckoutEvent::new("ISBN1", "bob", ""), &clock()).unwrap();
        let stored = *block.hash();

        block.data.user = "mallory".into();
        let recomputed = block.compute_hash().unwrap();

        assert_ne!(recomputed, stored);
        assert_eq!(*block.hash(), stored);
    }

    #[test]
    fn test_next_after_max_position_fails() {
        let mut last = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        last.position = u64::MAX;

        let err = Block::next(&last, CheckoutEvent::new("ISBN1", "bob", ""), &clock()).unwrap_err();
        assert_eq!(err, ChainError::PositionOverflow);
    }

    #[test]
    fn test_payload_is_covered_by_digest() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        let a = Block::next(&genesis, CheckoutEvent::new("ISBN1", "bob", ""), &clock()).unwrap();
        let b = Block::next(&genesis, CheckoutEvent::new("ISBN1", "carol", ""), &clock()).unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_block_json_shape() {
        let genesis = Block::<CheckoutEvent>::genesis(&clock()).unwrap();
        let json = serde_json::to_value(&genesis).unwrap();
        assert_eq!(json["position"], 0);
        assert_eq!(json["prev_hash"], serde_json::Value::Null);
        assert_eq!(json["data"]["is_genesis"], true);
        assert_eq!(json["hash"], genesis.hash().to_hex());

        let back: Block<CheckoutEvent> = serde_json::from_value(json).unwrap();
        assert_eq!(back, genesis);
    }
}

//! A chain shared between one writer at a time and any number of readers.
//!
//! Appends hold the write lock across build, validate and push, so two
//! appends can never both extend the same tail. Readers copy out under the
//! read lock and see either the state before an append or after it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::block::{Block, Payload};
use crate::chain::{Chain, ChainError};
use crate::event::CheckoutEvent;

/// Cloneable handle to a chain behind a read-write lock
pub struct SharedChain<P = CheckoutEvent> {
    inner: Arc<RwLock<Chain<P>>>,
}

impl<P> Clone for SharedChain<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Payload> SharedChain<P> {
    /// Wrap an existing chain
    #[must_use]
    pub fn new(chain: Chain<P>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append a block for `payload`, returning a copy of it
    ///
    /// # Errors
    ///
    /// Returns error if the candidate is rejected; the chain is unchanged
    pub fn append(&self, payload: P) -> Result<Block<P>, ChainError> {
        let mut chain = self.write();
        chain.append(payload).cloned()
    }

    /// Copy of every block, in order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Block<P>> {
        self.read().blocks().to_vec()
    }

    /// Copy of the tail block
    #[must_use]
    pub fn tail(&self) -> Block<P> {
        self.read().tail().clone()
    }

    /// Check the whole chain
    ///
    /// # Errors
    ///
    /// Returns the first violation found
    pub fn validate(&self) -> Result<(), ChainError> {
        self.read().validate()
    }

    /// Number of blocks, genesis included
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Always false: a chain holds at least genesis
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic under the lock cannot leave a partial block: push is the
    // last step of an append, so the data is consistent even if poisoned.
    fn read(&self) -> RwLockReadGuard<'_, Chain<P>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Chain<P>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

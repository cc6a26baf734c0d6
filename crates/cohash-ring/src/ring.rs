//! Thread-safe consistent hash ring.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::RingError;
use crate::hasher::{Blake3Hasher, TokenHasher};
use crate::state::RingState;

/// A consistent hash ring shared between threads.
///
/// All state sits behind a single `RwLock`. Mutations hold the write lock for
/// their whole duration, so a concurrent lookup sees the ring either before
/// or after an [`add`](Self::add)/[`remove`](Self::remove), never half way.
///
/// The lock is not reentrant: operations built on other public operations
/// (like [`get2`](Self::get2)) must not take it themselves.
pub struct ConsistentHash<H = Blake3Hasher> {
    state: RwLock<RingState<H>>,
}

impl ConsistentHash<Blake3Hasher> {
    /// Create an empty ring using BLAKE3 and
    /// [`DEFAULT_VNODE_COUNT`](crate::DEFAULT_VNODE_COUNT) vnodes per address.
    pub fn new() -> Self {
        Self::with_hasher(Blake3Hasher)
    }

    /// Create an empty BLAKE3 ring with `vnode_count` vnodes per address.
    pub fn with_vnode_count(vnode_count: usize) -> Result<Self, RingError> {
        RingState::with_vnode_count(Blake3Hasher, vnode_count).map(Self::from)
    }
}

impl Default for ConsistentHash<Blake3Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> From<RingState<H>> for ConsistentHash<H> {
    fn from(state: RingState<H>) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl<H: TokenHasher> ConsistentHash<H> {
    /// Create an empty ring placing vnodes and keys with `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        Self::from(RingState::with_hasher(hasher))
    }

    fn read(&self) -> RwLockReadGuard<'_, RingState<H>> {
        self.state.read().expect("lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, RingState<H>> {
        self.state.write().expect("lock poisoned")
    }

    /// Change the number of vnodes each address contributes.
    ///
    /// Fails with [`RingError::NotAvailableOnceMembersAdded`] once any address
    /// has been added, and with [`RingError::InvalidVnodeCount`] for 0.
    pub fn set_vnode_count(&self, count: usize) -> Result<(), RingError> {
        self.write().set_vnode_count(count)
    }

    /// Add `address`. Returns `false` if it was already a member.
    pub fn add(&self, address: &str) -> bool {
        self.write().add(address)
    }

    /// Remove `address`. Returns `false` if it was not a member.
    pub fn remove(&self, address: &str) -> bool {
        self.write().remove(address)
    }

    /// The address owning `key`.
    pub fn get(&self, key: &[u8]) -> Result<String, RingError> {
        self.read().get(key).map(str::to_owned)
    }

    /// The two nearest distinct addresses for `key`.
    pub fn get2(&self, key: &[u8]) -> Result<(String, String), RingError> {
        // get_n takes the lock.
        let [first, second]: [String; 2] = self
            .get_n(key, 2)?
            .try_into()
            .expect("get_n returns exactly `count` owners");
        Ok((first, second))
    }

    /// The `count` nearest distinct addresses for `key`, nearest first.
    pub fn get_n(&self, key: &[u8], count: usize) -> Result<Vec<String>, RingError> {
        let state = self.read();
        let owners = state.get_n(key, count)?;
        Ok(owners.into_iter().map(str::to_owned).collect())
    }

    /// Whether `address` is a member.
    pub fn contains(&self, address: &str) -> bool {
        self.read().contains(address)
    }

    /// Member addresses in lexicographic order.
    pub fn members(&self) -> Vec<String> {
        self.read().members().map(str::to_owned).collect()
    }

    /// Number of member addresses.
    pub fn member_count(&self) -> usize {
        self.read().member_count()
    }

    /// Vnodes contributed by each address.
    pub fn vnode_count(&self) -> usize {
        self.read().vnode_count()
    }

    /// Total vnodes on the ring.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the ring holds no vnodes.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<H: TokenHasher + Clone> ConsistentHash<H> {
    /// Copy of the current ring, detached from later mutations.
    ///
    /// Useful for running many lookups without holding the lock, or for
    /// comparing placement before and after a membership change.
    pub fn snapshot(&self) -> RingState<H> {
        self.read().clone()
    }
}

impl<H> std::fmt::Debug for ConsistentHash<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_read() {
            Ok(state) => f.debug_tuple("ConsistentHash").field(&*state).finish(),
            Err(_) => f.debug_struct("ConsistentHash").finish_non_exhaustive(),
        }
    }
}

//! Ring state: vnode store, membership, and the add/remove mutations.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::error::RingError;
use crate::hasher::{Blake3Hasher, TokenHasher, vnode_key};
use crate::store::{RingStore, VirtualNode};

/// Vnodes per address when none is configured.
///
/// Trades memory and a `log(n)` lookup cost against how evenly keys spread.
pub const DEFAULT_VNODE_COUNT: usize = 200;

/// A consistent hash ring owned by a single caller.
///
/// Holds the token-ordered vnodes, the set of member addresses, and the
/// number of vnodes each member contributes. Outside of a mutation,
/// `len() == vnode_count() * member_count()`.
///
/// Use [`ConsistentHash`](crate::ConsistentHash) to share a ring between
/// threads.
#[derive(Clone)]
pub struct RingState<H = Blake3Hasher> {
    pub(crate) store: RingStore,
    pub(crate) members: BTreeSet<String>,
    pub(crate) vnode_count: usize,
    pub(crate) hasher: H,
}

impl RingState<Blake3Hasher> {
    /// Create an empty ring using BLAKE3 and [`DEFAULT_VNODE_COUNT`].
    pub fn new() -> Self {
        Self::with_hasher(Blake3Hasher)
    }
}

impl Default for RingState<Blake3Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: TokenHasher> RingState<H> {
    /// Create an empty ring using `hasher` and [`DEFAULT_VNODE_COUNT`].
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            store: RingStore::new(),
            members: BTreeSet::new(),
            vnode_count: DEFAULT_VNODE_COUNT,
            hasher,
        }
    }

    /// Create an empty ring using `hasher` and `vnode_count` vnodes per address.
    pub fn with_vnode_count(hasher: H, vnode_count: usize) -> Result<Self, RingError> {
        let mut state = Self::with_hasher(hasher);
        state.set_vnode_count(vnode_count)?;
        Ok(state)
    }

    /// Change the number of vnodes each address contributes.
    ///
    /// Only allowed while the ring has no members, because removal has to
    /// recompute the same tokens that were inserted.
    pub fn set_vnode_count(&mut self, count: usize) -> Result<(), RingError> {
        if !self.members.is_empty() {
            return Err(RingError::NotAvailableOnceMembersAdded);
        }
        if count < 1 {
            return Err(RingError::InvalidVnodeCount(count));
        }
        self.vnode_count = count;
        debug!(vnodes = count, "vnode count set");
        Ok(())
    }

    /// Add `address` to the ring.
    ///
    /// Inserts `vnode_count` vnodes, one per token derived from
    /// [`vnode_key`]. Returns `false` without touching the ring if the address
    /// is already a member.
    pub fn add(&mut self, address: &str) -> bool {
        if self.members.contains(address) {
            return false;
        }
        for i in 0..self.vnode_count {
            let token = self.vnode_token(address, i);
            self.store.insert(VirtualNode::new(token, address));
        }
        self.members.insert(address.to_string());
        debug!(address, vnodes = self.vnode_count, "added address to ring");
        true
    }

    /// Remove `address` from the ring.
    ///
    /// Recomputes the tokens [`add`](Self::add) inserted and deletes each one.
    /// Returns `false` without touching the ring if the address is not a
    /// member.
    pub fn remove(&mut self, address: &str) -> bool {
        if !self.members.contains(address) {
            return false;
        }
        for i in 0..self.vnode_count {
            let token = self.vnode_token(address, i);
            self.store.remove(token);
        }
        self.members.remove(address);
        debug!(address, vnodes = self.vnode_count, "removed address from ring");
        true
    }

    fn vnode_token(&self, address: &str, index: usize) -> u64 {
        self.hasher.token(&vnode_key(address, index))
    }
}

impl<H> RingState<H> {
    /// Whether `address` is a member.
    pub fn contains(&self, address: &str) -> bool {
        self.members.contains(address)
    }

    /// Member addresses in lexicographic order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Number of member addresses.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Vnodes contributed by each address.
    pub fn vnode_count(&self) -> usize {
        self.vnode_count
    }

    /// Total vnodes on the ring.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the ring holds no vnodes.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All vnodes in token order.
    pub fn vnodes(&self) -> &[VirtualNode] {
        self.store.as_slice()
    }

    /// The hash primitive this ring places vnodes and keys with.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H> fmt::Debug for RingState<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingState")
            .field("members", &self.members)
            .field("vnode_count", &self.vnode_count)
            .field("vnodes", &self.store.len())
            .finish_non_exhaustive()
    }
}

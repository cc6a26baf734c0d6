//! Consistent hash ring for deterministic key-to-node assignment.
//!
//! This crate maps arbitrary keys onto a dynamic set of physical nodes
//! (servers, shards, cache backends) so that:
//!
//! - the assignment is deterministic for a fixed membership set, and
//! - adding or removing a node remaps only the keys that node owned.
//!
//! Each node is represented by `vnode_count` virtual nodes (vnodes) placed on
//! a circular `u64` token space. A vnode's token is the hash of
//! `"{index}={address}"`, so [`RingState::remove`] recomputes exactly the
//! tokens [`RingState::add`] inserted. A key maps to the first vnode whose
//! token is at or after the key's own token, wrapping past the end.
//!
//! [`RingState`] is the plain, single-owner ring. [`ConsistentHash`] wraps it
//! in a lock for sharing across threads.
//!
//! ```
//! use cohash_ring::ConsistentHash;
//!
//! let ring = ConsistentHash::new();
//! ring.add("server1");
//! ring.add("server2");
//! ring.add("server3");
//!
//! let owner = ring.get(b"user:42").unwrap();
//! let (primary, secondary) = ring.get2(b"user:42").unwrap();
//! assert_eq!(owner, primary);
//! assert_ne!(primary, secondary);
//! ```

pub mod analysis;
mod error;
mod hasher;
mod lookup;
mod ring;
mod state;
mod store;

#[cfg(test)]
mod tests;

pub use analysis::{Distribution, Remap, remaps};
pub use error::RingError;
pub use hasher::{
    Blake3Hasher, HashAlgorithm, TokenHasher, UnknownHashAlgorithm, Xxh3Hasher, vnode_key,
};
pub use ring::ConsistentHash;
pub use state::{DEFAULT_VNODE_COUNT, RingState};
pub use store::{RingStore, VirtualNode};

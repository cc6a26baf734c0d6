//! Token-ordered storage of virtual nodes.

use std::fmt;

use tracing::warn;

/// One point on the ring, owned by exactly one physical address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    /// Position on the circular `u64` token space.
    pub token: u64,
    /// Physical address that owns this position.
    pub address: String,
}

impl VirtualNode {
    /// Create a vnode at `token` owned by `address`.
    pub fn new(token: u64, address: impl Into<String>) -> Self {
        Self {
            token,
            address: address.into(),
        }
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token={} address={}", self.token, self.address)
    }
}

/// Virtual nodes sorted ascending by token.
///
/// The sequence is circular: the entry after the highest token is the entry
/// with the lowest token. Duplicate tokens are kept side by side, in
/// insertion order reversed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingStore {
    vnodes: Vec<VirtualNode>,
}

impl RingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` vnodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vnodes: Vec::with_capacity(capacity),
        }
    }

    /// Position of the first vnode whose token is `>= token`, or `len()` if
    /// every token is smaller.
    fn index(&self, token: u64) -> usize {
        self.vnodes.partition_point(|vn| vn.token < token)
    }

    /// Insert `vn` before the first entry with a token `>= vn.token`.
    pub fn insert(&mut self, vn: VirtualNode) {
        let index = self.index(vn.token);
        self.vnodes.insert(index, vn);
    }

    /// Delete the first entry whose token is `>= token` and return it.
    ///
    /// If every token is smaller than `token`, the last entry is deleted
    /// instead, so a non-empty store always loses exactly one entry. Only
    /// tokens that are known to be present should be passed here; the
    /// returned vnode tells which entry actually went. Returns `None` only
    /// when the store is empty.
    pub fn remove(&mut self, token: u64) -> Option<VirtualNode> {
        if self.vnodes.is_empty() {
            return None;
        }
        let index = self.index(token).min(self.vnodes.len() - 1);
        let removed = self.vnodes.remove(index);
        if removed.token != token {
            warn!(
                requested = token,
                removed = removed.token,
                address = %removed.address,
                "token not on ring, removed neighbouring vnode"
            );
        }
        Some(removed)
    }

    /// Index of the vnode that owns `token`: the first entry with a token
    /// `>= token`, wrapping to 0 past the end.
    ///
    /// Returns `None` on an empty store.
    pub fn closest(&self, token: u64) -> Option<usize> {
        if self.vnodes.is_empty() {
            return None;
        }
        let index = self.index(token);
        Some(if index == self.vnodes.len() { 0 } else { index })
    }

    /// The vnode at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&VirtualNode> {
        self.vnodes.get(index)
    }

    /// Number of vnodes stored.
    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    /// Whether the store holds no vnodes.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Iterate vnodes in token order.
    pub fn iter(&self) -> std::slice::Iter<'_, VirtualNode> {
        self.vnodes.iter()
    }

    /// All vnodes in token order.
    pub fn as_slice(&self) -> &[VirtualNode] {
        &self.vnodes
    }

    /// Walk the ring clockwise starting at `start`, visiting every vnode once.
    pub(crate) fn walk_from(&self, start: usize) -> impl Iterator<Item = &VirtualNode> {
        let (before, after) = self.vnodes.split_at(start.min(self.vnodes.len()));
        after.iter().chain(before.iter())
    }
}

impl<'a> IntoIterator for &'a RingStore {
    type Item = &'a VirtualNode;
    type IntoIter = std::slice::Iter<'a, VirtualNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

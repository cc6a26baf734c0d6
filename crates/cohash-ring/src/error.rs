//! Error types for ring configuration and lookups.

/// Errors returned by ring operations.
///
/// None of these are transient: they describe the ring as it currently is,
/// so retrying without changing membership or configuration will fail again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A lookup was made before any member was added.
    #[error("no members added")]
    NoMembers,

    /// More distinct members were requested than the ring holds.
    #[error("not enough members: requested {requested}, only {available} available")]
    NotEnoughMembers {
        /// Number of distinct members asked for.
        requested: usize,
        /// Number of members currently in the ring.
        available: usize,
    },

    /// The vnode count must be at least 1.
    #[error("invalid vnode count {0}: must be > 0")]
    InvalidVnodeCount(usize),

    /// The vnode count cannot change once members have been added.
    #[error("vnode count is not changeable once members are added")]
    NotAvailableOnceMembersAdded,
}

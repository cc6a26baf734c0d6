//! Load and remapping analysis over ring snapshots.
//!
//! These helpers answer "how evenly does this ring spread a key set" and
//! "which keys move if membership changes", typically by comparing a
//! [`RingState`] snapshot taken before a change with one taken after.

use std::collections::BTreeMap;

use crate::hasher::TokenHasher;
use crate::state::RingState;

/// How a set of keys spreads over a ring's members.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Keys owned per member. Every member appears, even with zero keys.
    pub counts: BTreeMap<String, usize>,
    /// Number of keys measured.
    pub total: usize,
}

impl Distribution {
    /// Count which member owns each of `keys`.
    ///
    /// An empty ring yields an empty distribution with `total == 0`.
    pub fn measure<H, K>(ring: &RingState<H>, keys: &[K]) -> Self
    where
        H: TokenHasher,
        K: AsRef<[u8]>,
    {
        let mut counts: BTreeMap<String, usize> =
            ring.members().map(|m| (m.to_string(), 0)).collect();
        let mut total = 0;
        for key in keys {
            if let Ok(owner) = ring.get(key.as_ref()) {
                *counts.entry(owner.to_string()).or_default() += 1;
                total += 1;
            }
        }
        Self { counts, total }
    }

    /// Mean keys per member.
    pub fn mean(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.total as f64 / self.counts.len() as f64
    }

    /// Population standard deviation of the per-member counts.
    pub fn std_dev(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .counts
            .values()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / self.counts.len() as f64;
        variance.sqrt()
    }
}

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remap {
    /// The key that moved.
    pub key: Vec<u8>,
    /// Owner in the old ring.
    pub from: String,
    /// Owner in the new ring.
    pub to: String,
}

/// Keys from `keys` that map to a different member in `new` than in `old`.
///
/// Keys that cannot be resolved in either ring (empty ring) are skipped.
pub fn remaps<H1, H2, K>(old: &RingState<H1>, new: &RingState<H2>, keys: &[K]) -> Vec<Remap>
where
    H1: TokenHasher,
    H2: TokenHasher,
    K: AsRef<[u8]>,
{
    let mut moved = Vec::new();
    for key in keys {
        let key = key.as_ref();
        let (Ok(from), Ok(to)) = (old.get(key), new.get(key)) else {
            continue;
        };
        if from != to {
            moved.push(Remap {
                key: key.to_vec(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Blake3Hasher;

    fn keys(n: u32) -> Vec<[u8; 4]> {
        (0..n).map(u32::to_le_bytes).collect()
    }

    #[test]
    fn test_measure_counts_every_key() {
        let mut ring = RingState::new();
        ring.add("server1");
        ring.add("server2");
        ring.add("server3");

        let dist = Distribution::measure(&ring, &keys(3000));
        assert_eq!(dist.total, 3000);
        assert_eq!(dist.counts.len(), 3);
        assert_eq!(dist.counts.values().sum::<usize>(), 3000);
        assert!((dist.mean() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_measure_lists_idle_members() {
        let mut ring = RingState::with_vnode_count(Blake3Hasher, 1).unwrap();
        ring.add("server1");
        ring.add("server2");
        // A single key can only land on one member.
        let dist = Distribution::measure(&ring, &[b"one"]);
        assert_eq!(dist.counts.len(), 2);
        assert!(dist.counts.values().any(|&c| c == 0));
        assert!((dist.std_dev() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_measure_empty_ring() {
        let ring = RingState::new();
        let dist = Distribution::measure(&ring, &keys(10));
        assert_eq!(dist.total, 0);
        assert!(dist.counts.is_empty());
        assert_eq!(dist.std_dev(), 0.0);
    }

    #[test]
    fn test_std_dev_even_split_is_zero() {
        let dist = Distribution {
            counts: [("a".to_string(), 5), ("b".to_string(), 5)].into(),
            total: 10,
        };
        assert_eq!(dist.std_dev(), 0.0);
    }

    #[test]
    fn test_remaps_after_adding_only_target_new_member() {
        let mut old = RingState::with_vnode_count(Blake3Hasher, 64).unwrap();
        old.add("server1");
        old.add("server2");
        let mut new = old.clone();
        new.add("server3");

        let moved = remaps(&old, &new, &keys(2000));
        assert!(!moved.is_empty(), "adding a member should move some keys");
        for m in &moved {
            assert_eq!(m.to, "server3");
            assert!(m.from == "server1" || m.from == "server2");
        }
    }

    #[test]
    fn test_remaps_identical_rings_is_empty() {
        let mut ring = RingState::new();
        ring.add("server1");
        ring.add("server2");
        assert!(remaps(&ring, &ring.clone(), &keys(500)).is_empty());
    }

    #[test]
    fn test_remaps_skip_unresolvable_keys() {
        let empty = RingState::new();
        let mut ring = RingState::new();
        ring.add("server1");
        assert!(remaps(&empty, &ring, &keys(10)).is_empty());
    }
}

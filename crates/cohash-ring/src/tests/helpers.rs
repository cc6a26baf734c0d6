//! Shared fixtures. Every test builds its own; nothing is process-wide.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::{Blake3Hasher, RingState, TokenHasher};

/// `count` random 10-byte keys from a seeded generator.
pub fn random_keys(seed: u64, count: usize) -> Vec<[u8; 10]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut key = [0u8; 10];
            rng.fill_bytes(&mut key);
            key
        })
        .collect()
}

/// Address of the `i`-th test server.
pub fn server(i: usize) -> String {
    format!("server{i}")
}

/// A BLAKE3 ring with `members` servers of `vnodes` vnodes each.
pub fn ring_with(members: usize, vnodes: usize) -> RingState {
    let mut ring = RingState::with_vnode_count(Blake3Hasher, vnodes).unwrap();
    for i in 0..members {
        ring.add(&server(i));
    }
    ring
}

/// Assert the vnode tokens never decrease.
pub fn assert_sorted<H>(ring: &RingState<H>) {
    let vnodes = ring.vnodes();
    for (i, pair) in vnodes.windows(2).enumerate() {
        assert!(
            pair[0].token <= pair[1].token,
            "vnodes {i} and {} out of order: {} > {}",
            i + 1,
            pair[0].token,
            pair[1].token
        );
    }
}

/// Assert `len == vnode_count * members` and every vnode belongs to a member.
pub fn assert_cardinality<H>(ring: &RingState<H>) {
    assert_eq!(ring.len(), ring.vnode_count() * ring.member_count());
    for vn in ring.vnodes() {
        assert!(ring.contains(&vn.address), "orphan vnode {vn}");
    }
}

/// Hand-placed hash for three servers with two vnodes each.
///
/// Ring layout, clockwise:
///
/// ```text
/// 100 s1 | 200 s2 | 300 s3 | 400 s1 | 500 s2 | 600 s3
/// ```
///
/// Keys `k1..k7` hash to 50, 150, ..., 650, 700, each just before one
/// vnode, with `k7` past the last vnode so it wraps to `s1`.
pub fn synthetic(bytes: &[u8]) -> u64 {
    match bytes {
        b"0=s1" => 100,
        b"0=s2" => 200,
        b"0=s3" => 300,
        b"1=s1" => 400,
        b"1=s2" => 500,
        b"1=s3" => 600,
        b"k1" => 50,
        b"k2" => 150,
        b"k3" => 250,
        b"k4" => 350,
        b"k5" => 450,
        b"k6" => 550,
        b"k7" => 700,
        other => panic!("no synthetic token for {:?}", String::from_utf8_lossy(other)),
    }
}

/// Ring of `s1`, `s2`, `s3` placed by [`synthetic`].
pub fn synthetic_ring() -> RingState<fn(&[u8]) -> u64> {
    let hasher: fn(&[u8]) -> u64 = synthetic;
    let mut ring = RingState::with_vnode_count(hasher, 2).unwrap();
    ring.add("s1");
    ring.add("s2");
    ring.add("s3");
    ring
}

/// The seven synthetic keys.
pub const SYNTHETIC_KEYS: [&str; 7] = ["k1", "k2", "k3", "k4", "k5", "k6", "k7"];

#[test]
fn test_synthetic_layout() {
    let ring = synthetic_ring();
    let layout: Vec<(u64, &str)> = ring
        .vnodes()
        .iter()
        .map(|vn| (vn.token, vn.address.as_str()))
        .collect();
    assert_eq!(
        layout,
        vec![
            (100, "s1"),
            (200, "s2"),
            (300, "s3"),
            (400, "s1"),
            (500, "s2"),
            (600, "s3"),
        ]
    );
    assert_eq!(ring.hasher().token(b"k7"), 700);
}

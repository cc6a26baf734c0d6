//! Pluggable 64-bit hash primitive used to place vnodes and keys on the ring.
//!
//! Swapping the primitive moves every token, so it changes placement for all
//! keys. Rings that must agree on placement must use the same primitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pure, deterministic mapping from bytes to a ring token.
///
/// Any `Fn(&[u8]) -> u64` closure is a `TokenHasher`, which makes it easy to
/// build rings with hand-picked tokens.
pub trait TokenHasher: Send + Sync {
    /// Hash `bytes` to a position on the ring.
    fn token(&self, bytes: &[u8]) -> u64;
}

impl<F> TokenHasher for F
where
    F: Fn(&[u8]) -> u64 + Send + Sync,
{
    fn token(&self, bytes: &[u8]) -> u64 {
        self(bytes)
    }
}

/// BLAKE3 truncated to its first 8 bytes (little-endian).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl TokenHasher for Blake3Hasher {
    fn token(&self, bytes: &[u8]) -> u64 {
        let hash = blake3::hash(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

/// XXH3 64-bit, for callers that want a cheaper non-cryptographic mix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl TokenHasher for Xxh3Hasher {
    fn token(&self, bytes: &[u8]) -> u64 {
        xxhash_rust::xxh3::xxh3_64(bytes)
    }
}

/// Runtime-selectable hash primitive, e.g. from a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// [`Blake3Hasher`].
    #[default]
    Blake3,
    /// [`Xxh3Hasher`].
    Xxh3,
}

impl TokenHasher for HashAlgorithm {
    fn token(&self, bytes: &[u8]) -> u64 {
        match self {
            Self::Blake3 => Blake3Hasher.token(bytes),
            Self::Xxh3 => Xxh3Hasher.token(bytes),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => f.write_str("blake3"),
            Self::Xxh3 => f.write_str("xxh3"),
        }
    }
}

/// Error returned when parsing an unknown [`HashAlgorithm`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hash algorithm {0:?}, expected \"blake3\" or \"xxh3\"")]
pub struct UnknownHashAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "xxh3" => Ok(Self::Xxh3),
            _ => Err(UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Build the hash input for the `index`-th vnode of `address`.
///
/// The decimal index comes first, then `=`, then the address. The index never
/// contains `=`, so the first `=` always ends it and no two `(index, address)`
/// pairs share an input.
pub fn vnode_key(address: &str, index: usize) -> Vec<u8> {
    format!("{index}={address}").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vnode_key_layout() {
        assert_eq!(vnode_key("server1", 0), b"0=server1");
        assert_eq!(vnode_key("10.0.0.1:11211", 199), b"199=10.0.0.1:11211");
    }

    #[test]
    fn test_vnode_key_no_ambiguity_across_addresses() {
        // "1" + "2=x" must not collide with "12" + "x" or "1=2" + "x".
        assert_ne!(vnode_key("2=x", 1), vnode_key("x", 12));
        assert_ne!(vnode_key("1=x", 2), vnode_key("x", 12));
        assert_ne!(vnode_key("=x", 1), vnode_key("x", 1));
    }

    #[test]
    fn test_blake3_matches_truncated_digest() {
        let digest = blake3::hash(b"hello");
        let expected = u64::from_le_bytes(digest.as_bytes()[..8].try_into().unwrap());
        assert_eq!(Blake3Hasher.token(b"hello"), expected);
    }

    #[test]
    fn test_hashers_deterministic_and_distinct() {
        for hasher in [HashAlgorithm::Blake3, HashAlgorithm::Xxh3] {
            assert_eq!(hasher.token(b"key"), hasher.token(b"key"));
            assert_ne!(hasher.token(b"key-a"), hasher.token(b"key-b"));
        }
        assert_ne!(Blake3Hasher.token(b"key"), Xxh3Hasher.token(b"key"));
    }

    #[test]
    fn test_algorithm_dispatch() {
        assert_eq!(HashAlgorithm::Blake3.token(b"k"), Blake3Hasher.token(b"k"));
        assert_eq!(HashAlgorithm::Xxh3.token(b"k"), Xxh3Hasher.token(b"k"));
    }

    #[test]
    fn test_closure_is_hasher() {
        let fixed = |bytes: &[u8]| bytes.len() as u64;
        assert_eq!(fixed.token(b"abcd"), 4);
    }

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("blake3".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Blake3));
        assert_eq!(" XXH3 ".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Xxh3));
        assert!("md5".parse::<HashAlgorithm>().is_err());
        for alg in [HashAlgorithm::Blake3, HashAlgorithm::Xxh3] {
            assert_eq!(alg.to_string().parse::<HashAlgorithm>(), Ok(alg));
        }
    }
}

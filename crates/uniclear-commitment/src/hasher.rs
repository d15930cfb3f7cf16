//! Hash primitive behind the commitment tree.
//!
//! `combine` hashes the *sorted* pair, so `combine(a, b) == combine(b, a)`.
//! Proof verification relies on this: it folds siblings without knowing
//! whether the running digest was a left or a right child. Any replacement
//! primitive must keep the sorted join.

use sha2::{Digest, Sha256};

use crate::MerkleHash;

/// A 32-byte digest function with an order-independent pair join.
pub trait HashPrimitive {
    /// Digest of a single byte string.
    fn hash(&self, bytes: &[u8]) -> MerkleHash;

    /// Digest of `min(a, b) || max(a, b)`.
    fn combine(&self, a: &MerkleHash, b: &MerkleHash) -> MerkleHash {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut joined = [0u8; 64];
        joined[..32].copy_from_slice(lo);
        joined[32..].copy_from_slice(hi);
        self.hash(&joined)
    }
}

/// SHA-256 primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashPrimitive for Sha256Hasher {
    fn hash(&self, bytes: &[u8]) -> MerkleHash {
        let result = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }
}

/// SHA-256 of `bytes`.
#[must_use]
pub fn hash(bytes: &[u8]) -> MerkleHash {
    Sha256Hasher.hash(bytes)
}

/// SHA-256 join of a sorted pair.
#[must_use]
pub fn combine(a: &MerkleHash, b: &MerkleHash) -> MerkleHash {
    Sha256Hasher.combine(a, b)
}

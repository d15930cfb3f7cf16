//! Fixed-depth binary Merkle tree with sibling-only inclusion proofs.

use serde::{Deserialize, Serialize};
use uniclear_types::{Result, UniclearError};

use crate::{HashPrimitive, Sha256Hasher};

/// A 32-byte leaf or node digest.
pub type MerkleHash = [u8; 32];

/// Padding leaf appended up to the next power of two.
pub const ZERO_HASH: MerkleHash = [0u8; 32];

/// A commitment tree over a batch's leaves.
///
/// `levels[0]` holds the padded leaves; each following level halves the
/// previous one until only the root remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<MerkleHash>>,
    leaf_count: usize,
    root: MerkleHash,
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub index: usize,
    pub leaf: MerkleHash,
    /// Sibling digests from the leaf level up to just below the root.
    pub siblings: Vec<MerkleHash>,
}

impl MerkleTree {
    /// Build a SHA-256 tree.
    ///
    /// # Errors
    /// `InvalidInput` if `leaves` is empty.
    pub fn build(leaves: &[MerkleHash]) -> Result<Self> {
        Self::build_with(&Sha256Hasher, leaves)
    }

    /// Build a tree with a caller-supplied hash primitive.
    ///
    /// # Errors
    /// `InvalidInput` if `leaves` is empty.
    pub fn build_with<H: HashPrimitive + ?Sized>(
        hasher: &H,
        leaves: &[MerkleHash],
    ) -> Result<Self> {
        if leaves.is_empty() {
            return Err(UniclearError::InvalidInput {
                reason: "cannot build a Merkle tree over zero leaves".into(),
            });
        }

        let mut current = leaves.to_vec();
        current.resize(leaves.len().next_power_of_two(), ZERO_HASH);

        let mut levels = Vec::new();
        while current.len() > 1 {
            let next: Vec<MerkleHash> = current
                .chunks_exact(2)
                .map(|pair| hasher.combine(&pair[0], &pair[1]))
                .collect();
            levels.push(std::mem::replace(&mut current, next));
        }
        let root = current[0];
        levels.push(current);

        Ok(Self {
            levels,
            leaf_count: leaves.len(),
            root,
        })
    }

    #[must_use]
    pub fn root(&self) -> MerkleHash {
        self.root
    }

    #[must_use]
    pub fn root_hex(&self) -> String {
        hex::encode(self.root)
    }

    /// Number of leaves supplied, padding excluded.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of leaves including padding (a power of two).
    #[must_use]
    pub fn padded_leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// log2 of the padded leaf count; 0 for a single leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Inclusion proof for leaf `index`, or `None` if it is out of range.
    #[must_use]
    pub fn prove(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count {
            return None;
        }
        let mut siblings = Vec::with_capacity(self.height());
        let mut idx = index;
        for level in &self.levels[..self.height()] {
            siblings.push(level[idx ^ 1]);
            idx >>= 1;
        }
        Some(MerkleProof {
            index,
            leaf: self.levels[0][index],
            siblings,
        })
    }
}

impl MerkleProof {
    /// Verify this proof's own leaf against `root` with SHA-256.
    #[must_use]
    pub fn verify(&self, root: &MerkleHash) -> bool {
        verify(&self.leaf, self, root)
    }
}

/// Fold `leaf` with the proof's siblings and compare with `root` (SHA-256).
#[must_use]
pub fn verify(leaf: &MerkleHash, proof: &MerkleProof, root: &MerkleHash) -> bool {
    verify_with(&Sha256Hasher, leaf, proof, root)
}

/// [`verify`] with a caller-supplied hash primitive.
#[must_use]
pub fn verify_with<H: HashPrimitive + ?Sized>(
    hasher: &H,
    leaf: &MerkleHash,
    proof: &MerkleProof,
    root: &MerkleHash,
) -> bool {
    let computed = proof
        .siblings
        .iter()
        .fold(*leaf, |acc, sibling| hasher.combine(&acc, sibling));
    computed == *root
}

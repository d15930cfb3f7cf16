//! # uniclear-commitment
//!
//! **Merkle commitment over a batch's fills and orders.**
//!
//! - [`HashPrimitive`]: single-value hashing plus an order-independent pair
//!   join, so proofs carry no left/right flags
//! - [`MerkleTree`]: fixed-depth binary tree padded with zero digests to the
//!   next power of two
//! - [`MerkleProof`] / [`verify`]: inclusion proofs, leaf to root
//! - [`leaves`]: domain-separated leaf encodings for allocations and orders
//!
//! ## Errors
//!
//! Building over an empty leaf set is `InvalidInput`; asking for a proof of
//! an index outside the tree yields `None`.

pub mod hasher;
pub mod leaves;
pub mod tree;

pub use hasher::{HashPrimitive, Sha256Hasher, combine, hash};
pub use leaves::{allocation_leaf, commit_allocations, commit_orders, order_leaf};
pub use tree::{MerkleHash, MerkleProof, MerkleTree, ZERO_HASH, verify, verify_with};

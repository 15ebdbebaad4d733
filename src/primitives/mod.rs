//! The small, dependency-free building blocks the rest of the kernel is
//! assembled from: the Keccak-f\[800\] permutation, FNV-1a, the KISS99 RNG,
//! and the random-op table.

pub mod fnv;
pub mod keccak;
pub mod kiss99;
pub mod random_op;

pub use fnv::{fnv1a, FNV_OFFSET};
pub use keccak::keccak_f800;
pub use kiss99::Kiss99;
pub use random_op::random_op;

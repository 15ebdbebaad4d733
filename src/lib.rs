//! # AdaptivePow
//!
//! Hash kernel and dataset pipeline for the AdaptivePow GPU proof-of-work
//! algorithm: a ProgPoW-family, memory-hard construction built from a
//! Keccak-f\[800\] permutation, FNV-1a mixing, a KISS99 PRNG, and a
//! seed-derived two-stage dataset (cache, then DAG).
//!
//! ## Layout
//! - [`primitives`] — Keccak-f\[800\], FNV-1a, KISS99, and the random-math-op
//!   table the mix kernel is built from.
//! - [`epoch`], [`cache`], [`dag`] — the dataset pipeline: epoch sizing,
//!   sequential cache generation, parallel DAG expansion.
//! - [`mix`] — the per-nonce search kernel.
//! - [`verifier`] — bit-exact CPU recomputation, against either a
//!   materialized DAG or an on-demand cache reconstruction.
//! - [`device`], [`batch`] — the backend abstraction and the device-context
//!   state machine that drives dataset generation and batched nonce search.
//! - [`job`], [`target`] — wire-shaped job/result/stats types and
//!   compact-bits target arithmetic.
//!
//! ## Disclaimer
//! This crate implements the hash kernel and host-side dataset/driver logic
//! only. GPU kernel dispatch is abstracted behind the [`device::Backend`]
//! trait; [`device::CpuReference`] is the reference implementation used for
//! testing and for bit-exact share verification.

pub mod alloc;
pub mod batch;
pub mod cache;
pub mod dag;
pub mod device;
pub mod epoch;
pub mod error;
pub mod job;
pub mod mix;
pub mod primitives;
pub mod target;
pub mod verifier;

use crate::cache::Cache;
use crate::dag::{Dag, OnDemandDag};
use crate::job::Header;
use crate::mix::mix_hash;
use crate::target::target_check;

/// Deterministic, single-nonce CPU recomputation of §4.5. Any nonce a GPU
/// searcher reports as found MUST be re-checked here before it is accepted;
/// a GPU result is never trusted on its own.
pub struct Verifier;

impl Verifier {
    /// Verifies against a fully materialized DAG.
    pub fn verify_with_dag(header: &Header, nonce: u64, target: u64, dag: &Dag) -> bool {
        target_check(mix_hash(header, nonce, dag), target)
    }

    /// Verifies against the cache alone, reconstructing DAG items on demand
    /// (256 cache-indexed FNV passes per item touched).
    pub fn verify_with_cache(
        header: &Header,
        nonce: u64,
        target: u64,
        cache: &Cache,
        n_dag: u64,
    ) -> bool {
        let dag = OnDemandDag::new(cache, n_dag);
        target_check(mix_hash(header, nonce, &dag), target)
    }
}

use crate::cache::Cache;
use crate::dag::Dag;
use crate::epoch;
use crate::error::Result;
use crate::job::Header;

/// The capability set any GPU dispatch layer (or the CPU reference backend
/// below) must provide. The core depends only on this trait, never on a
/// concrete backend variant, per the polymorphic-backend design note.
pub trait Backend {
    /// Human-readable name of the concrete backend, for logging.
    fn name(&self) -> &'static str;

    fn generate_cache(&self, seed: &[u8; 32], cache_bytes: u64) -> Result<Cache>;

    fn generate_dag(&self, cache: &Cache, dag_bytes: u64) -> Result<Dag>;

    /// Searches `[start_nonce, start_nonce + batch_size)` against `dag`,
    /// returning every nonce whose `hash_high <= target`.
    fn search(
        &self,
        dag: &Dag,
        header: &Header,
        target: u64,
        start_nonce: u64,
        batch_size: u64,
    ) -> Result<Vec<u64>>;
}

/// A CPU implementation of the three kernel entry points (§6), standing in
/// for the backend-specific GPU dispatch layer this crate treats as an
/// opaque executor. Exercises the exact same cache/DAG/mix code the GPU
/// searcher and the verifier both depend on, just driven by `rayon` instead
/// of a device queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuReference;

impl Backend for CpuReference {
    fn name(&self) -> &'static str {
        "cpu-reference"
    }

    fn generate_cache(&self, seed: &[u8; 32], cache_bytes: u64) -> Result<Cache> {
        Cache::build(seed, cache_bytes)
    }

    fn generate_dag(&self, cache: &Cache, dag_bytes: u64) -> Result<Dag> {
        Dag::build(cache, dag_bytes)
    }

    fn search(
        &self,
        dag: &Dag,
        header: &Header,
        target: u64,
        start_nonce: u64,
        batch_size: u64,
    ) -> Result<Vec<u64>> {
        use rayon::prelude::*;
        use crate::mix::mix_hash;
        use crate::target::target_check;

        let found: Vec<u64> = (start_nonce..start_nonce.wrapping_add(batch_size))
            .into_par_iter()
            .filter(|&nonce| target_check(mix_hash(header, nonce, dag), target))
            .collect();
        Ok(found)
    }
}

/// Convenience: derive the seed, cache, and DAG for `epoch` using `backend`.
pub fn build_dataset(backend: &dyn Backend, epoch_index: u32) -> Result<(Cache, Dag)> {
    let seed = epoch::seed(epoch_index);
    let cache_bytes = epoch::cache_size(epoch_index);
    let dag_bytes = epoch::dag_size(epoch_index);
    log::info!(
        "generating dataset for epoch {} (seed {}): cache={}MB dag={}MB",
        epoch_index,
        hex::encode(seed),
        cache_bytes / (1024 * 1024),
        dag_bytes / (1024 * 1024)
    );
    let cache = backend.generate_cache(&seed, cache_bytes)?;
    let dag = backend.generate_dag(&cache, dag_bytes)?;
    Ok((cache, dag))
}

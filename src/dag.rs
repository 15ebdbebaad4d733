use rayon::prelude::*;

use crate::alloc::try_alloc_u32;
use crate::cache::Cache;
use crate::epoch::HASH_BYTES;
use crate::error::{MinerError, Result};
use crate::primitives::fnv1a;

/// DAG items are generated in chunks of this size so a single dispatch never
/// runs long enough to trip a device watchdog. Not part of the public
/// contract — purely an internal pacing knob.
const DAG_GEN_CHUNK: usize = 1_000_000;

/// A read-only source of 16-word DAG items, indexed by item number. The mix
/// kernel is generic over this so it can run identically against a fully
/// materialized `Dag` or against items reconstructed on demand from a
/// `Cache` (the verifier's memory-constrained path, §4.7).
pub trait DagView {
    fn n_items(&self) -> u64;
    fn item(&self, index: u64) -> [u32; 16];
}

/// The large, read-only dataset every nonce search probes. Produced once per
/// epoch from the cache and then shared across all concurrent searches.
pub struct Dag {
    items: Vec<u32>,
    n_items: u64,
}

impl Dag {
    /// Builds the full DAG from `cache`, sized `dag_bytes`.
    ///
    /// Item `i` is computed independently of every other item (only the
    /// cache is read), so generation chunks run in parallel with `rayon`.
    pub fn build(cache: &Cache, dag_bytes: u64) -> Result<Self> {
        if dag_bytes % HASH_BYTES != 0 {
            return Err(MinerError::InvalidJob(format!(
                "dag size {dag_bytes} is not a multiple of {HASH_BYTES}"
            )));
        }
        let n_items = dag_bytes / HASH_BYTES;
        let n_cache = cache.n_items();
        let mut items = try_alloc_u32((n_items * 16) as usize, dag_bytes)?;

        let mut generated = 0u64;
        while generated < n_items {
            let chunk_end = (generated + DAG_GEN_CHUNK as u64).min(n_items);
            let chunk: Vec<[u32; 16]> = (generated..chunk_end)
                .into_par_iter()
                .map(|i| dag_item(cache, n_cache, i))
                .collect();
            for (offset, item) in chunk.into_iter().enumerate() {
                let base = ((generated + offset as u64) * 16) as usize;
                items[base..base + 16].copy_from_slice(&item);
            }
            log::debug!(
                "dag generation progress: {}/{} items",
                chunk_end,
                n_items
            );
            generated = chunk_end;
        }

        Ok(Dag { items, n_items })
    }

    pub fn n_items(&self) -> u64 {
        self.n_items
    }

    /// Returns the 16 little-endian words of DAG item `index`.
    pub fn item(&self, index: u64) -> &[u32] {
        let off = (index as usize) * 16;
        &self.items[off..off + 16]
    }

    pub fn as_words(&self) -> &[u32] {
        &self.items
    }
}

impl DagView for Dag {
    fn n_items(&self) -> u64 {
        self.n_items
    }

    fn item(&self, index: u64) -> [u32; 16] {
        let mut out = [0u32; 16];
        out.copy_from_slice(Dag::item(self, index));
        out
    }
}

/// Reconstructs DAG items from the cache alone, at the cost of 256
/// cache-indexed FNV passes per item instead of one array read. Used by the
/// verifier when only the cache, not the full DAG, is resident.
pub struct OnDemandDag<'a> {
    cache: &'a Cache,
    n_items: u64,
}

impl<'a> OnDemandDag<'a> {
    pub fn new(cache: &'a Cache, n_items: u64) -> Self {
        Self { cache, n_items }
    }
}

impl DagView for OnDemandDag<'_> {
    fn n_items(&self) -> u64 {
        self.n_items
    }

    fn item(&self, index: u64) -> [u32; 16] {
        dag_item(self.cache, self.cache.n_items(), index)
    }
}

/// Computes DAG item `i` from `cache`; pure function of `(cache, i)` so it
/// can be re-run on any subrange and still produce identical bytes.
pub(crate) fn dag_item(cache: &Cache, n_cache: u64, i: u64) -> [u32; 16] {
    let base = (i % n_cache) * 16;
    let mut mix = [0u32; 16];
    mix.copy_from_slice(&cache.as_words()[base as usize..base as usize + 16]);
    mix[0] ^= i as u32;

    for round in 0..256u32 {
        let parent = fnv1a(i as u32 ^ round, mix[0]) as u64 % n_cache;
        let parent_base = (parent * 16) as usize;
        let parent_words = &cache.as_words()[parent_base..parent_base + 16];
        for k in 0..16 {
            mix[k] = fnv1a(mix[k], parent_words[k]);
        }
    }

    mix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::seed;

    fn small_cache() -> Cache {
        Cache::build(&seed(0), 64 * 16).unwrap()
    }

    #[test]
    fn deterministic_and_independent_of_range() {
        let cache = small_cache();
        let dag_a = Dag::build(&cache, 64 * 8).unwrap();
        let dag_b = Dag::build(&cache, 64 * 8).unwrap();
        assert_eq!(dag_a.as_words(), dag_b.as_words());
    }

    #[test]
    fn item_matches_direct_computation() {
        let cache = small_cache();
        let dag = Dag::build(&cache, 64 * 8).unwrap();
        let direct = dag_item(&cache, cache.n_items(), 3);
        assert_eq!(dag.item(3), &direct);
    }

    #[test]
    fn rejects_non_multiple_of_hash_bytes() {
        let cache = small_cache();
        assert!(Dag::build(&cache, 100).is_err());
    }

    #[test]
    fn on_demand_matches_materialized() {
        let cache = small_cache();
        let dag = Dag::build(&cache, 64 * 8).unwrap();
        let on_demand = OnDemandDag::new(&cache, dag.n_items());
        for i in 0..dag.n_items() {
            assert_eq!(DagView::item(&dag, i), on_demand.item(i));
        }
    }

    #[test]
    fn distinct_items_for_distinct_indices() {
        let cache = small_cache();
        let dag = Dag::build(&cache, 64 * 8).unwrap();
        assert_ne!(dag.item(0), dag.item(1));
    }
}

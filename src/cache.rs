use crate::alloc::try_alloc_u32;
use crate::epoch::HASH_BYTES;
use crate::error::{MinerError, Result};
use crate::primitives::keccak_f800;

/// The small, seed-derived dataset that DAG items are expanded from.
///
/// Each item is a 64-byte block viewed as 16 little-endian 32-bit words.
/// Item 0 is derived from the seed; every later item is derived from its
/// immediate predecessor, so generation is strictly sequential.
pub struct Cache {
    items: Vec<u32>,
    n_items: u64,
}

impl Cache {
    /// Builds the cache for `epoch`, sized `cache_bytes` (a multiple of
    /// `HASH_BYTES`), from the epoch's 32-byte seed.
    pub fn build(seed: &[u8; 32], cache_bytes: u64) -> Result<Self> {
        if cache_bytes % HASH_BYTES != 0 {
            return Err(MinerError::InvalidJob(format!(
                "cache size {cache_bytes} is not a multiple of {HASH_BYTES}"
            )));
        }
        let n_items = cache_bytes / HASH_BYTES;
        let mut items = try_alloc_u32((n_items * 16) as usize, cache_bytes)?;

        let mut seed_words = [0u32; 8];
        for i in 0..8 {
            seed_words[i] = u32::from_le_bytes([
                seed[4 * i],
                seed[4 * i + 1],
                seed[4 * i + 2],
                seed[4 * i + 3],
            ]);
        }

        for i in 0..16 {
            items[i] = if i < 8 {
                seed_words[i]
            } else {
                seed_words[i - 8] ^ 0xFFFFFFFF
            };
        }

        for idx in 1..n_items as usize {
            let prev = (idx - 1) * 16;
            let cur = idx * 16;
            let mut st = [0u32; 25];
            st[0..16].copy_from_slice(&items[prev..prev + 16]);
            keccak_f800(&mut st);
            items[cur..cur + 16].copy_from_slice(&st[0..16]);
        }

        log::debug!(
            "built cache: {} items ({} bytes)",
            n_items,
            cache_bytes
        );

        Ok(Cache { items, n_items })
    }

    pub fn n_items(&self) -> u64 {
        self.n_items
    }

    /// Returns the 16 little-endian words of cache item `index`.
    pub fn item(&self, index: u64) -> &[u32] {
        let off = (index as usize) * 16;
        &self.items[off..off + 16]
    }

    pub fn as_words(&self) -> &[u32] {
        &self.items
    }
}

use crate::error::{MinerError, Result};

/// Allocates a zeroed `Vec<u32>` of `len` words, surfacing allocation
/// failure as `MinerError::OutOfMemory` instead of aborting the process —
/// the only realistic failure mode for multi-GB dataset allocation.
pub fn try_alloc_u32(len: usize, requested_bytes: u64) -> Result<Vec<u32>> {
    let mut v: Vec<u32> = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| MinerError::OutOfMemory(requested_bytes))?;
    v.resize(len, 0);
    Ok(v)
}

use serde::{Deserialize, Serialize};

/// An 80-byte / 20-word block header. Word layout: `[0..8)` previous-block
/// hash, `[8..16)` merkle root, `[16]` time, `[17]` bits, `[18..20)` nonce
/// (low, high) — the nonce words are filled in by the kernel per work-item.
pub type Header = [u32; 20];

/// Builds a header from its named fields, leaving the nonce words zeroed
/// (the mix kernel overwrites them per work-item).
pub fn build_header(prev_hash: &[u32; 8], merkle_root: &[u32; 8], n_time: u32, n_bits: u32) -> Header {
    let mut header = [0u32; 20];
    header[0..8].copy_from_slice(prev_hash);
    header[8..16].copy_from_slice(merkle_root);
    header[16] = n_time;
    header[17] = n_bits;
    header
}

/// A unit of mining work submitted to a device context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningJob {
    pub job_id: String,
    pub prev_hash: [u32; 8],
    pub merkle_root: [u32; 8],
    pub n_time: u32,
    pub n_bits: u32,
    pub target: u64,
}

impl MiningJob {
    /// Maximum length of `job_id`, per the data model.
    pub const MAX_JOB_ID_LEN: usize = 32;

    pub fn header(&self) -> Header {
        build_header(&self.prev_hash, &self.merkle_root, self.n_time, self.n_bits)
    }
}

/// The outcome of probing one nonce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningResult {
    pub job_id: String,
    pub nonce: u64,
    pub found: bool,
}

/// Aggregate hash-rate and share statistics for a device context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinerStats {
    pub total_hashes: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub current_epoch: u32,
    pub dag_size: u64,
    pub uptime_seconds: u64,
    pub hashrate: f64,
}

/// A minimal GPU device record, as supplied by the external enumeration
/// layer and consumed here only to select a device by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub free_bytes: u64,
    pub compute_units: u32,
    pub available: bool,
}

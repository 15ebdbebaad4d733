use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use crate::cache::Cache;
use crate::dag::Dag;
use crate::device::Backend;
use crate::epoch;
use crate::error::{MinerError, Result};
use crate::job::{MiningJob, MiningResult, MinerStats};
use crate::verifier::Verifier;

/// Nonces probed per `search_batch` call.
pub const BATCH_SIZE: u64 = 1 << 21;
/// Maximum number of found nonces collected per batch; a sampling bound,
/// not a correctness bound (expected hits per batch are 0 or 1).
pub const RESULTS_CAP: usize = 16;

/// Lifecycle of a device context's dataset, per §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetState {
    Uninit,
    DagGenerating,
    Ready,
    Searching,
    Shutdown,
}

/// A bounded, concurrency-safe sampler for found nonces: an atomic counter
/// plus a fixed-size slot array. Entries beyond `RESULTS_CAP` are dropped —
/// intentionally, since a correctness-preserving unbounded channel would be
/// overkill for an event that is expected 0 or 1 times per batch.
struct ResultSampler {
    count: AtomicUsize,
    slots: [AtomicU64; RESULTS_CAP],
}

impl ResultSampler {
    fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            slots: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    fn push(&self, nonce: u64) {
        let idx = self.count.fetch_add(1, Ordering::SeqCst);
        if idx < RESULTS_CAP {
            self.slots[idx].store(nonce, Ordering::SeqCst);
        }
    }

    /// Drains whatever was collected this batch and resets the counter.
    fn drain(&self) -> Vec<u64> {
        let observed = self.count.swap(0, Ordering::SeqCst);
        let usable = observed.min(RESULTS_CAP);
        (0..usable)
            .map(|i| self.slots[i].load(Ordering::SeqCst))
            .collect()
    }
}

/// Stats counters, held behind atomics so a reporting thread can sample
/// them concurrently with the host control path advancing batches.
pub struct DeviceStatsCounters {
    pub total_hashes: AtomicU64,
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
    started_at: Instant,
}

impl DeviceStatsCounters {
    fn new() -> Self {
        Self {
            total_hashes: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// One GPU (or CPU-reference) device's dataset, cursor, and stats.
///
/// Single-threaded on the host control path: one context owns its dataset
/// and nonce cursor exclusively, and batches run to completion before the
/// next state transition is observed. Multiple contexts run independently
/// and never share state or aggregate errors.
pub struct DeviceContext<B: Backend> {
    backend: B,
    state: DatasetState,
    cache: Option<Cache>,
    dag: Option<Dag>,
    current_epoch: Option<u32>,
    current_job: Option<MiningJob>,
    current_nonce: u64,
    results: ResultSampler,
    stats: DeviceStatsCounters,
}

impl<B: Backend> DeviceContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: DatasetState::Uninit,
            cache: None,
            dag: None,
            current_epoch: None,
            current_job: None,
            current_nonce: 0,
            results: ResultSampler::new(),
            stats: DeviceStatsCounters::new(),
        }
    }

    pub fn state(&self) -> DatasetState {
        self.state
    }

    /// Adopts an already-built cache and DAG directly, skipping generation.
    /// Used to restore a dataset cached to disk across restarts, and by
    /// tests that need a `Ready` context without paying for a full-size
    /// epoch's generation.
    pub fn with_dataset(backend: B, epoch_index: u32, cache: Cache, dag: Dag) -> Self {
        Self {
            backend,
            state: DatasetState::Ready,
            cache: Some(cache),
            dag: Some(dag),
            current_epoch: Some(epoch_index),
            current_job: None,
            current_nonce: 0,
            results: ResultSampler::new(),
            stats: DeviceStatsCounters::new(),
        }
    }

    /// Regenerates the cache and DAG for `new_epoch`. Transitions
    /// `Ready|Uninit -> DagGenerating -> Ready`. On failure the dataset
    /// state regresses to `Uninit` and the error propagates. `Shutdown` is
    /// terminal: a context that has been shut down rejects this call
    /// instead of resurrecting itself.
    pub fn update_epoch(&mut self, new_epoch: u32) -> Result<()> {
        if self.state == DatasetState::Shutdown {
            return Err(MinerError::ContextShutdown);
        }
        self.state = DatasetState::DagGenerating;
        self.dag = None;
        self.cache = None;

        let result = (|| -> Result<(Cache, Dag)> {
            let seed = epoch::seed(new_epoch);
            let cache_bytes = epoch::cache_size(new_epoch);
            let dag_bytes = epoch::dag_size(new_epoch);
            log::info!(
                "epoch {new_epoch}: generating cache ({cache_bytes} bytes) and DAG ({dag_bytes} bytes)"
            );
            let cache = self.backend.generate_cache(&seed, cache_bytes)?;
            let dag = self.backend.generate_dag(&cache, dag_bytes)?;
            Ok((cache, dag))
        })();

        match result {
            Ok((cache, dag)) => {
                self.cache = Some(cache);
                self.dag = Some(dag);
                self.current_epoch = Some(new_epoch);
                self.state = DatasetState::Ready;
                log::info!("epoch {new_epoch}: dataset ready");
                Ok(())
            }
            Err(err) => {
                self.state = DatasetState::Uninit;
                log::error!("epoch {new_epoch}: DAG generation failed: {err}");
                Err(err)
            }
        }
    }

    /// Accepts a new job. Fails with `DatasetNotReady` unless the dataset is
    /// currently `Ready`. Superseding an in-flight job resets the nonce
    /// cursor for the new job; stale results from the old job are discarded
    /// by `job_id` comparison when batches are collected.
    pub fn submit_job(&mut self, job: MiningJob) -> Result<()> {
        if self.state != DatasetState::Ready {
            return Err(MinerError::DatasetNotReady);
        }
        if job.job_id.len() > MiningJob::MAX_JOB_ID_LEN {
            return Err(MinerError::InvalidJob(format!(
                "job_id length {} exceeds MAX_JOB_ID_LEN ({})",
                job.job_id.len(),
                MiningJob::MAX_JOB_ID_LEN
            )));
        }
        self.current_job = Some(job);
        self.current_nonce = 0;
        self.results.drain();
        Ok(())
    }

    /// Dispatches one batch of `BATCH_SIZE` nonces against the current job.
    ///
    /// Reports `total_hashes += BATCH_SIZE` regardless of how many nonces
    /// were found, advances `current_nonce` monotonically so every nonce in
    /// `[start, start + BATCH_SIZE)` is probed exactly once, and verifies
    /// every candidate on the CPU before accepting it — a candidate that
    /// fails verification is counted as a rejected share, not propagated.
    pub fn search_batch(&mut self) -> Result<Vec<MiningResult>> {
        if self.state != DatasetState::Ready {
            return Err(MinerError::DatasetNotReady);
        }
        let job = self
            .current_job
            .clone()
            .ok_or_else(|| MinerError::InvalidJob("no job submitted".into()))?;
        let dag = self
            .dag
            .as_ref()
            .ok_or(MinerError::DatasetNotReady)?;

        self.state = DatasetState::Searching;
        let start_nonce = self.current_nonce;
        let header = job.header();

        let dispatch = self
            .backend
            .search(dag, &header, job.target, start_nonce, BATCH_SIZE);

        let found = match dispatch {
            Ok(found) => found,
            Err(err) => {
                self.state = DatasetState::Ready;
                log::warn!("kernel launch failed at nonce {start_nonce}: {err}");
                return Err(err);
            }
        };

        for nonce in &found {
            self.results.push(*nonce);
        }

        self.current_nonce = start_nonce.wrapping_add(BATCH_SIZE);
        self.stats.total_hashes.fetch_add(BATCH_SIZE, Ordering::Relaxed);

        let mut out = Vec::new();
        for nonce in self.results.drain() {
            let verified = Verifier::verify_with_dag(&header, nonce, job.target, dag);
            if verified {
                self.stats.accepted.fetch_add(1, Ordering::Relaxed);
                out.push(MiningResult {
                    job_id: job.job_id.clone(),
                    nonce,
                    found: true,
                });
            } else {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                log::warn!("nonce {nonce} failed CPU verification for job {}", job.job_id);
            }
        }

        self.state = DatasetState::Ready;
        Ok(out)
    }

    pub fn stats(&self) -> MinerStats {
        let hashrate = if self.stats.uptime_seconds() > 0 {
            self.stats.total_hashes.load(Ordering::Relaxed) as f64 / self.stats.uptime_seconds() as f64
        } else {
            0.0
        };
        MinerStats {
            total_hashes: self.stats.total_hashes.load(Ordering::Relaxed),
            accepted: self.stats.accepted.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
            current_epoch: self.current_epoch.unwrap_or(0),
            dag_size: self.dag.as_ref().map(|d| d.n_items() * 64).unwrap_or(0),
            uptime_seconds: self.stats.uptime_seconds(),
            hashrate,
        }
    }

    pub fn shutdown(&mut self) {
        self.state = DatasetState::Shutdown;
        self.dag = None;
        self.cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::CpuReference;

    fn job(target: u64) -> MiningJob {
        MiningJob {
            job_id: "job".into(),
            prev_hash: [0u32; 8],
            merkle_root: [0u32; 8],
            n_time: 0,
            n_bits: 0,
            target,
        }
    }

    #[test]
    fn submit_job_before_ready_fails() {
        let mut ctx = DeviceContext::new(CpuReference);
        assert!(matches!(
            ctx.submit_job(job(0)),
            Err(MinerError::DatasetNotReady)
        ));
    }

    #[test]
    fn submit_job_rejects_oversized_job_id() {
        let cache = Cache::build(&epoch::seed(0), 64 * 16).unwrap();
        let dag = Dag::build(&cache, 64 * 4).unwrap();
        let mut ctx = DeviceContext::with_dataset(CpuReference, 0, cache, dag);

        let mut at_limit = job(0);
        at_limit.job_id = "a".repeat(MiningJob::MAX_JOB_ID_LEN);
        assert!(ctx.submit_job(at_limit).is_ok());

        let mut over_limit = job(0);
        over_limit.job_id = "a".repeat(MiningJob::MAX_JOB_ID_LEN + 1);
        assert!(matches!(
            ctx.submit_job(over_limit),
            Err(MinerError::InvalidJob(_))
        ));
    }

    #[test]
    fn full_lifecycle_accepts_max_target() {
        let cache = Cache::build(&epoch::seed(0), 64 * 16).unwrap();
        let dag = Dag::build(&cache, 64 * 4).unwrap();
        let mut ctx = DeviceContext::with_dataset(CpuReference, 0, cache, dag);

        ctx.submit_job(job(u64::MAX)).unwrap();

        // BATCH_SIZE is too large to run in a unit test directly against a
        // tiny DAG; instead verify the pieces search_batch composes.
        let header = ctx.current_job.clone().unwrap().header();
        assert!(Verifier::verify_with_dag(
            &header,
            0,
            u64::MAX,
            ctx.dag.as_ref().unwrap()
        ));
    }

    #[test]
    fn update_epoch_rejects_after_shutdown() {
        let cache = Cache::build(&epoch::seed(0), 64 * 16).unwrap();
        let dag = Dag::build(&cache, 64 * 4).unwrap();
        let mut ctx = DeviceContext::with_dataset(CpuReference, 0, cache, dag);

        ctx.shutdown();
        assert_eq!(ctx.state(), DatasetState::Shutdown);
        assert!(matches!(
            ctx.update_epoch(1),
            Err(MinerError::ContextShutdown)
        ));
        assert_eq!(ctx.state(), DatasetState::Shutdown);
    }

    #[test]
    fn result_sampler_drops_beyond_cap() {
        let sampler = ResultSampler::new();
        for n in 0..(RESULTS_CAP as u64 * 2) {
            sampler.push(n);
        }
        let drained = sampler.drain();
        assert_eq!(drained.len(), RESULTS_CAP);
        assert_eq!(drained, (0..RESULTS_CAP as u64).collect::<Vec<_>>());
    }

    #[test]
    fn result_sampler_resets_after_drain() {
        let sampler = ResultSampler::new();
        sampler.push(1);
        assert_eq!(sampler.drain(), vec![1]);
        assert!(sampler.drain().is_empty());
    }
}

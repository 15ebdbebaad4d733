use thiserror::Error;

/// Errors surfaced by the AdaptivePow core.
///
/// `DatasetNotReady` is the only recoverable kind (the caller should trigger
/// DAG generation and retry); every other variant tears the owning device
/// context down.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("no device with id {0}")]
    NoSuchDevice(u32),

    #[error("device initialization failed: {0}")]
    DeviceInitFailed(String),

    #[error("kernel build failed: {0}")]
    KernelBuildFailed(String),

    #[error("out of memory: {0} bytes requested")]
    OutOfMemory(u64),

    #[error("dataset not ready, call update_epoch first")]
    DatasetNotReady,

    #[error("device context is shut down and cannot be reused")]
    ContextShutdown,

    #[error("dispatch failed at stage {0}")]
    DispatchFailed(String),

    #[error("invalid job: {0}")]
    InvalidJob(String),
}

pub type Result<T> = std::result::Result<T, MinerError>;

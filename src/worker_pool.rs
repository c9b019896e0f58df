//! Fixed-size worker pool for per-head transform tasks.

use crate::error::RedactError;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 5;

/// Explicit fixed-size thread pool.
///
/// The pool is a passed-in resource rather than process-global state: hand
/// it to the transforms (or to [`crate::FaceRedactor::worker_pool`] wrapped
/// in an `Arc` to share across requests). A single-threaded pool gives
/// tests a deterministic scheduler substitute.
pub struct WorkerPool {
    inner: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with the given number of worker threads.
    pub fn new(threads: usize) -> Result<Self, RedactError> {
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RedactError::WorkerPool(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Build a pool with [`DEFAULT_WORKERS`] threads.
    pub fn with_default_workers() -> Result<Self, RedactError> {
        Self::new(DEFAULT_WORKERS)
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.inner.current_num_threads()
    }

    /// Run `op` inside the pool and block until it returns. Rayon parallel
    /// iterators used within `op` execute on this pool's workers.
    pub(crate) fn run<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.inner.install(op)
    }
}

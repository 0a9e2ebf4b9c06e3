use crate::foundation::error::{RaytideError, RaytideResult};

/// Fixed-size pool of long-lived render worker threads.
///
/// The pool is built once at a chosen concurrency level and never grows or
/// shrinks for its lifetime. Only one render job runs at a time, and that job
/// is granted the whole pool for its duration; there is no checkout/return
/// protocol for individual workers. Dropping the pool joins all workers —
/// the controller's lifecycle guarantees no job still holds outstanding work
/// by then.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

impl WorkerPool {
    /// Build a pool with exactly `size` workers, spawned eagerly.
    ///
    /// Returns [`RaytideError::PoolInit`] when any worker thread fails to
    /// start; a partially started pool is torn down and never returned.
    pub fn new(size: usize) -> RaytideResult<Self> {
        if size == 0 {
            return Err(RaytideError::validation("worker pool size must be >= 1"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("raytide-worker-{i}"))
            .build()
            .map_err(|e| RaytideError::pool_init(e.to_string()))?;
        Ok(Self { pool, size })
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `task` on one of the pool's workers.
    pub(crate) fn spawn(&self, task: impl FnOnce() + Send + 'static) {
        self.pool.spawn(task);
    }

    /// The host's available hardware parallelism, the conventional upper
    /// bound for pool size. Read this once at startup.
    pub fn max_concurrency() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(RaytideError::Validation(_))
        ));
    }

    #[test]
    fn pool_reports_configured_size() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn spawned_tasks_run_on_pool_workers() {
        let pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.spawn(move || {
            let name = std::thread::current().name().map(str::to_owned);
            tx.send(name).unwrap();
        });
        let name = rx.recv().unwrap().unwrap();
        assert!(name.starts_with("raytide-worker-"), "got {name}");
    }

    #[test]
    fn max_concurrency_is_at_least_one() {
        assert!(WorkerPool::max_concurrency() >= 1);
    }
}

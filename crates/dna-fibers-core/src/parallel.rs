//! Fork-join worker pool shared by every parallel stage.
//!
//! Each stage hands the pool a read-only slice and a per-item task. Results
//! come back in input order, and a panicking task turns the whole stage into a
//! single [`ParallelError::TaskPanicked`] with no partial output.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

#[derive(thiserror::Error, Debug)]
pub enum ParallelError {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("worker task panicked: {message}")]
    TaskPanicked { message: String },
}

/// Handle to a rayon thread pool, cheap to clone.
///
/// The default handle runs on rayon's global pool.
#[derive(Clone, Debug, Default)]
pub struct WorkerPool {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl WorkerPool {
    pub fn global() -> Self {
        Self::default()
    }

    /// Dedicated pool with exactly `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, ParallelError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dna-fibers-{i}"))
            .build()?;
        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Dedicated pool when `threads` is set, the global pool otherwise.
    pub fn from_threads(threads: Option<usize>) -> Result<Self, ParallelError> {
        match threads {
            Some(n) => Self::with_threads(n),
            None => Ok(Self::global()),
        }
    }

    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `task` on every item and collect the results in input order.
    pub fn map<T, U, F>(&self, items: &[T], task: F) -> Result<Vec<U>, ParallelError>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &T) -> U + Sync + Send,
    {
        let run = || -> Vec<(usize, U)> {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| (index, task(index, item)))
                .collect()
        };
        let tagged = panic::catch_unwind(AssertUnwindSafe(|| match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }))
        .map_err(|payload| ParallelError::TaskPanicked {
            message: panic_message(payload.as_ref()),
        })?;
        Ok(in_index_order(tagged))
    }
}

fn in_index_order<U>(mut tagged: Vec<(usize, U)>) -> Vec<U> {
    tagged.sort_unstable_by_key(|(index, _)| *index);
    tagged.into_iter().map(|(_, value)| value).collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

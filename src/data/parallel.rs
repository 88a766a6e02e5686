// ============================================================
// Layer 4 - Parallel Filter-Map
// ============================================================
// Runs the per-sentence work (split, truncate, vocab lookup,
// target shift) on a rayon thread pool.
//
// Why a dedicated pool?
//   num_threads must bound this stage alone. rayon's global
//   pool is shared with anything else in the process, so the
//   pipeline builds its own ThreadPool and runs inside
//   pool.install().
//
// The input is pulled in chunks of `chunk_size`; each chunk is
// mapped in parallel and collected back in input order, so the
// output order is exactly what a sequential filter_map would
// give. Only one chunk of results is held at a time.
//
// Reference: rayon documentation (ThreadPool::install, par_iter)

use rayon::{prelude::*, ThreadPool};
use std::{collections::VecDeque, sync::Arc};

pub struct ParallelFilterMap<I, O, F>
where
    I: Iterator,
{
    inner:      I,
    pool:       Arc<ThreadPool>,
    chunk_size: usize,
    f:          F,
    ready:      VecDeque<O>,
    exhausted:  bool,
}

impl<I, O, F> ParallelFilterMap<I, O, F>
where
    I: Iterator,
    I::Item: Send,
    O: Send,
    F: Fn(I::Item) -> Option<O> + Send + Sync,
{
    pub fn new(inner: I, pool: Arc<ThreadPool>, chunk_size: usize, f: F) -> Self {
        Self {
            inner,
            pool,
            chunk_size: chunk_size.max(1),
            f,
            ready: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fill(&mut self) {
        let chunk: Vec<I::Item> = self.inner.by_ref().take(self.chunk_size).collect();
        if chunk.len() < self.chunk_size {
            self.exhausted = true;
        }
        if chunk.is_empty() {
            return;
        }

        let f = &self.f;
        let mapped: Vec<O> = self
            .pool
            .install(|| chunk.into_par_iter().filter_map(f).collect());

        tracing::trace!("Mapped chunk: {} elements kept", mapped.len());
        self.ready.extend(mapped);
    }
}

impl<I, O, F> Iterator for ParallelFilterMap<I, O, F>
where
    I: Iterator,
    I::Item: Send,
    O: Send,
    F: Fn(I::Item) -> Option<O> + Send + Sync,
{
    type Item = O;

    fn next(&mut self) -> Option<O> {
        loop {
            if let Some(out) = self.ready.pop_front() {
                return Some(out);
            }
            if self.exhausted {
                return None;
            }
            self.fill();
        }
    }
}

/// Build the worker pool used by the element map.
pub fn build_pool(num_threads: usize) -> anyhow::Result<Arc<ThreadPool>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .thread_name(|i| format!("nmt-input-map-{i}"))
        .build()?;
    Ok(Arc::new(pool))
}

//! Fixed-size row worker pool.
//!
//! Rows of a row-major byte raster are handed out as disjoint `&mut`
//! slices through one FIFO queue. Each worker drains the queue until it
//! receives its shutdown sentinel (`None`); the pool joins every worker
//! before [`RowPool::run`] returns, so no thread outlives the borrowed
//! raster or the caller's accumulators.

use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::unbounded;

/// Worker count used when none is configured: the host core count, at least 1.
pub fn default_worker_count() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// A pool of `workers` threads, spawned per [`run`](Self::run) call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RowPool {
    workers: NonZeroUsize,
}

impl RowPool {
    pub(crate) fn new(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Call `work(row, texels)` once for every `width`-sized row of `raster`.
    ///
    /// Rows are processed in no particular order. Blocks until all workers
    /// have consumed their sentinel and exited.
    pub(crate) fn run<F>(&self, raster: &mut [u8], width: usize, work: F)
    where
        F: Fn(usize, &mut [u8]) + Sync,
    {
        if width == 0 || raster.is_empty() {
            return;
        }

        let workers = self.workers.get();
        let (queue, jobs) = unbounded::<Option<(usize, &mut [u8])>>();
        let work = &work;

        thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = jobs.clone();
                scope.spawn(move || {
                    while let Ok(Some((row, texels))) = jobs.recv() {
                        work(row, texels);
                    }
                });
            }

            // `jobs` stays alive in this frame, so sends cannot fail.
            for job in raster.chunks_mut(width).enumerate() {
                let _ = queue.send(Some(job));
            }
            for _ in 0..workers {
                let _ = queue.send(None);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn every_row_is_visited_exactly_once() {
        for workers in [1, 2, 7] {
            let pool = RowPool::new(NonZeroUsize::new(workers).expect("non-zero"));
            let (w, h) = (5, 33);
            let mut raster = vec![0u8; w * h];
            let calls = AtomicUsize::new(0);

            pool.run(&mut raster, w, |row, texels| {
                calls.fetch_add(1, Ordering::Relaxed);
                for t in texels.iter_mut() {
                    *t += (row % 250) as u8 + 1;
                }
            });

            assert_eq!(calls.load(Ordering::Relaxed), h);
            for (row, texels) in raster.chunks(w).enumerate() {
                assert!(texels.iter().all(|&t| t == (row % 250) as u8 + 1));
            }
        }
    }

    #[test]
    fn empty_raster_is_a_no_op() {
        let pool = RowPool::new(NonZeroUsize::MIN);
        let mut raster: Vec<u8> = Vec::new();
        pool.run(&mut raster, 4, |_, _| panic!("no rows expected"));
    }

    #[test]
    fn default_worker_count_is_positive() {
        assert!(default_worker_count().get() >= 1);
    }
}

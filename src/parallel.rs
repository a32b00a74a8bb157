//! Thread-parallel reduction over private output buffers.
//!
//! Assemblies split their iteration units (pair records or sites) over a set
//! of workers. Each worker owns a zero-initialised copy of the output buffer
//! and handles an interlaced range of units: worker `w` out of `T` handles
//! `w, w + T, w + 2T, ...`, which balances load when the per-unit cost varies
//! with locality. Once all workers are done, their buffers are summed into
//! the caller's output on the calling thread, in worker order. There are no
//! locks anywhere.
//!
//! With a single worker the kernel writes directly to the output, and results
//! are byte-identical from run to run. With more workers the only
//! run-to-run difference permitted is the floating point summation order,
//! and only when the worker count itself changes.

use std::iter::StepBy;
use std::ops::{AddAssign, Range};
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use rayon::prelude::*;

/// Process-wide worker count cap; 0 means "use the hardware parallelism"
static MAX_THREADS: AtomicUsize = AtomicUsize::new(0);

static HARDWARE_PARALLELISM: Lazy<usize> = Lazy::new(|| {
    std::thread::available_parallelism().map(|threads| threads.get()).unwrap_or(1)
});

/// Cap the number of workers used by assemblies. `1` forces sequential
/// execution, `0` resets to the hardware parallelism.
///
/// The value is read once at the start of each assembly, never inside hot
/// loops, so changing it concurrently with a running assembly only affects
/// later calls.
pub fn set_max_threads(max_threads: usize) {
    MAX_THREADS.store(max_threads, Ordering::Relaxed);
}

/// Get the current worker count cap.
pub fn max_threads() -> usize {
    let value = MAX_THREADS.load(Ordering::Relaxed);
    if value == 0 {
        *HARDWARE_PARALLELISM
    } else {
        value
    }
}

/// Interlaced range of units handled by one worker
pub(crate) type WorkerRange = StepBy<Range<usize>>;

/// Run `kernel` over `units` iteration units, accumulating into `out`.
///
/// The kernel receives the interlaced unit range of its worker and a buffer
/// shaped like `out`; it must only add into the buffer. Contributions must be
/// commutative and associative up to floating point rounding.
#[time_graph::instrument(name = "map_to_sites")]
pub(crate) fn map_reduce<O, K>(units: usize, out: &mut [O], kernel: K)
where
    O: Copy + Default + AddAssign + Send,
    K: Fn(WorkerRange, &mut [O]) + Sync,
{
    let workers = max_threads()
        .min(*HARDWARE_PARALLELISM)
        .min(units.max(1));
    map_reduce_with(workers, units, out, kernel);
}

pub(crate) fn map_reduce_with<O, K>(workers: usize, units: usize, out: &mut [O], kernel: K)
where
    O: Copy + Default + AddAssign + Send,
    K: Fn(WorkerRange, &mut [O]) + Sync,
{
    if workers <= 1 {
        kernel((0..units).step_by(1), out);
        return;
    }

    let size = out.len();
    let buffers: Vec<Vec<O>> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let mut buffer = vec![O::default(); size];
            kernel((worker..units).step_by(workers), &mut buffer);
            buffer
        })
        .collect();

    for buffer in buffers {
        for (target, value) in out.iter_mut().zip(buffer) {
            *target += value;
        }
    }
}

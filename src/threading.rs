//! Parallel map over a disjoint flat index range.
//!
//! Both parallel reduction strategies share one primitive: apply a body to
//! every slot of an output slice, where each invocation writes exactly its
//! own slot and reads only inputs no other invocation writes. Under that
//! independence guarantee the only synchronization needed is the join before
//! this function returns.
//!
//! Two interchangeable backends provide the primitive:
//! - [`ParallelBackend::WorkStealing`]: recursive halving with
//!   `rayon::join`, splitting until a subrange fits under
//!   [`crate::MIN_PARALLEL_LENGTH`] or the thread budget runs out;
//! - [`ParallelBackend::ThreadTeam`]: a lazily-built shared
//!   `rayon::ThreadPool` driving fixed-size chunks, one chunk per thread.
//!
//! Without the `parallel` feature both backends degrade to the serial loop.

#[cfg(feature = "parallel")]
use std::env;
#[cfg(feature = "parallel")]
use std::sync::OnceLock;

/// Which concurrency backend distributes the flat slot range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallelBackend {
    /// Fork-join work stealing (`rayon::join` recursive halving).
    WorkStealing,
    /// Managed thread team (shared `rayon::ThreadPool`, chunk per thread).
    ThreadTeam,
}

/// Apply `body(i, &mut slots[i])` for every `i`, distributing the range
/// across the chosen backend. Returns after all slots are processed.
#[cfg(feature = "parallel")]
pub fn parallel_for_slots<T, F>(backend: ParallelBackend, slots: &mut [T], body: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    match backend {
        ParallelBackend::WorkStealing => {
            split_join(slots, 0, rayon::current_num_threads(), &body)
        }
        ParallelBackend::ThreadTeam => team_install(slots, &body),
    }
}

/// Serial rendition of the same contract, used when the `parallel` feature
/// is disabled.
#[cfg(not(feature = "parallel"))]
pub fn parallel_for_slots<T, F>(_backend: ParallelBackend, slots: &mut [T], body: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    run_serial(slots, 0, &body);
}

fn run_serial<T, F>(slots: &mut [T], base: usize, body: &F)
where
    F: Fn(usize, &mut T),
{
    for (i, slot) in slots.iter_mut().enumerate() {
        body(base + i, slot);
    }
}

/// Recursive halving over disjoint subslices.
///
/// Each level splits the range in two and the thread budget with it, the
/// same divide-and-conquer Strided.jl uses for its threaded mapreduce.
/// Subranges at or below [`crate::MIN_PARALLEL_LENGTH`] run serially.
#[cfg(feature = "parallel")]
fn split_join<T, F>(slots: &mut [T], base: usize, nthreads: usize, body: &F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    if nthreads <= 1 || slots.len() <= crate::MIN_PARALLEL_LENGTH {
        run_serial(slots, base, body);
        return;
    }

    let mid = slots.len() / 2;
    let (left, right) = slots.split_at_mut(mid);
    let nt_left = nthreads / 2;
    rayon::join(
        || split_join(left, base, nt_left, body),
        || split_join(right, base + mid, nthreads - nt_left, body),
    );
}

/// The shared thread team, built on first use.
///
/// `COHORT_THREADS` overrides the pool size. A pool that fails to build
/// leaves the team backend running serially.
#[cfg(feature = "parallel")]
fn thread_pool() -> Option<&'static rayon::ThreadPool> {
    static POOL: OnceLock<Option<rayon::ThreadPool>> = OnceLock::new();
    POOL.get_or_init(|| {
        let explicit = env::var("COHORT_THREADS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&threads| threads > 0);
        let builder = match explicit {
            Some(threads) => rayon::ThreadPoolBuilder::new().num_threads(threads),
            None => rayon::ThreadPoolBuilder::new(),
        };
        builder.build().ok()
    })
    .as_ref()
}

#[cfg(feature = "parallel")]
fn team_install<T, F>(slots: &mut [T], body: &F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    let Some(pool) = thread_pool() else {
        run_serial(slots, 0, body);
        return;
    };
    if slots.is_empty() {
        return;
    }

    let threads = pool.current_num_threads().max(1);
    let chunk = ((slots.len() + threads - 1) / threads).max(1);
    pool.install(|| {
        use rayon::prelude::*;
        slots
            .par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(chunk_index, chunk_slots)| {
                run_serial(chunk_slots, chunk_index * chunk, body);
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKENDS: [ParallelBackend; 2] =
        [ParallelBackend::WorkStealing, ParallelBackend::ThreadTeam];

    #[test]
    fn every_slot_touched_exactly_once() {
        // 1031 is prime, so the range never divides evenly across chunk
        // sizes or join splits.
        for backend in BACKENDS {
            let mut touches = vec![0usize; 1031];
            parallel_for_slots(backend, &mut touches, |_, slot| *slot += 1);
            assert!(
                touches.iter().all(|&t| t == 1),
                "{backend:?} skipped or duplicated a slot"
            );
        }
    }

    #[test]
    fn slot_indices_match_positions() {
        for backend in BACKENDS {
            let mut slots = vec![usize::MAX; 10_000];
            parallel_for_slots(backend, &mut slots, |i, slot| *slot = i);
            for (position, &value) in slots.iter().enumerate() {
                assert_eq!(position, value, "{backend:?} mapped a wrong index");
            }
        }
    }

    #[test]
    fn empty_range_is_a_no_op() {
        for backend in BACKENDS {
            let mut slots: Vec<usize> = Vec::new();
            parallel_for_slots(backend, &mut slots, |_, _| unreachable!());
        }
    }

    #[test]
    fn large_range_above_split_threshold() {
        // Forces at least one join split when threads are available.
        let len = crate::MIN_PARALLEL_LENGTH * 4 + 17;
        let mut slots = vec![0u64; len];
        parallel_for_slots(ParallelBackend::WorkStealing, &mut slots, |i, slot| {
            *slot = i as u64 + 1
        });
        assert!(slots.iter().enumerate().all(|(i, &v)| v == i as u64 + 1));
    }
}

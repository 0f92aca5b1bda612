//! Static partitioning of per-individual work over scoped threads.
//!
//! The population slice is split into at most `workers` contiguous chunks and
//! each chunk is handed to its own scoped thread. Writes are therefore disjoint
//! by construction, and every closure receives the global index of the item it
//! works on so results stay index-stable regardless of scheduling.

use std::{num::NonZeroUsize, thread};

/// Resolves the configured worker count, falling back to the available parallelism.
#[must_use]
pub fn worker_count(requested: Option<NonZeroUsize>) -> NonZeroUsize {
    requested
        .or_else(|| thread::available_parallelism().ok())
        .unwrap_or(NonZeroUsize::MIN)
}

/// Calls `f(index, item)` for every item, in parallel.
pub fn for_each_mut<T, F>(items: &mut [T], workers: NonZeroUsize, f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    for_each_mut_with(items, workers, || (), |_, index, item| f(index, item));
}

/// Like [`for_each_mut`], but every worker first builds its own state with
/// `init` and passes it to each call.
///
/// Use this for scratch buffers or simulation instances that should be owned by
/// one worker rather than recreated per item.
pub fn for_each_mut_with<T, S, I, F>(items: &mut [T], workers: NonZeroUsize, init: I, f: F)
where
    T: Send,
    I: Fn() -> S + Sync,
    F: Fn(&mut S, usize, &mut T) + Sync,
{
    if items.is_empty() {
        return;
    }
    let chunk_len = items.len().div_ceil(workers.get());
    let (init, f) = (&init, &f);
    thread::scope(|s| {
        for (chunk, part) in items.chunks_mut(chunk_len).enumerate() {
            let base = chunk * chunk_len;
            s.spawn(move || {
                let mut state = init();
                for (offset, item) in part.iter_mut().enumerate() {
                    f(&mut state, base + offset, item);
                }
            });
        }
    });
}

/// Computes `f(index)` for `0..len` in parallel and returns the results in index order.
pub fn map<T, F>(len: usize, workers: NonZeroUsize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();
    for_each_mut(&mut slots, workers, |index, slot| *slot = Some(f(index)));
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn every_item_is_visited_once_with_its_index() {
        for n in [1, 3, 8, 64] {
            let mut items = vec![usize::MAX; 37];
            for_each_mut(&mut items, workers(n), |i, item| *item = i);
            assert_eq!(items, (0..37).collect::<Vec<_>>());
        }
    }

    #[test]
    fn worker_state_is_built_once_per_chunk() {
        let inits = AtomicUsize::new(0);
        let mut items = vec![0; 10];
        for_each_mut_with(
            &mut items,
            workers(4),
            || {
                inits.fetch_add(1, Ordering::Relaxed);
                0usize
            },
            |seen, _, item| {
                *seen += 1;
                *item = *seen;
            },
        );
        // chunks of 3, 3, 3, 1
        assert_eq!(inits.load(Ordering::Relaxed), 4);
        assert_eq!(items, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn map_keeps_order() {
        let squares = map(20, workers(6), |i| i * i);
        assert_eq!(squares, (0..20).map(|i| i * i).collect::<Vec<_>>());
        assert!(map(0, workers(2), |i| i).is_empty());
    }

    #[test]
    fn worker_count_prefers_requested() {
        assert_eq!(worker_count(Some(workers(3))), workers(3));
        assert!(worker_count(None).get() >= 1);
    }
}

//! Worst-case linear-time k-th order statistic selection (median-of-medians),
//! used by `Block::locate_min_q` to keep Pull's amortized bound intact: a
//! sort-based select would cost O(n log n) per call and blow the bound.

use std::cmp::Ordering;

/// Partitions `slice` so that every element `<= pivot` is moved to the front;
/// returns the count of such elements. Linear time, one pass.
fn partition_le_pivot<T: Copy, F: Fn(&T, &T) -> Ordering>(
    slice: &mut [T],
    pivot: T,
    cmp: &F,
) -> usize {
    let mut i = 0;
    for j in 0..slice.len() {
        if cmp(&slice[j], &pivot) != Ordering::Greater {
            slice.swap(i, j);
            i += 1;
        }
    }
    i
}

fn median_of_five<T: Copy, F: Fn(&T, &T) -> Ordering>(group: &mut [T], cmp: &F) -> T {
    group.sort_unstable_by(cmp);
    group[group.len() / 2]
}

/// Finds the `k`-th smallest element (0-indexed rank) of `slice` in
/// worst-case linear time via the standard five-per-group median-of-medians
/// recurrence, permuting `slice` in the process.
fn select_nth<T: Copy, F: Fn(&T, &T) -> Ordering>(slice: &mut [T], k: usize, cmp: &F) -> T {
    let n = slice.len();
    debug_assert!(k < n);

    if n == 1 {
        return slice[0];
    }
    if n == 2 {
        if cmp(&slice[0], &slice[1]) == Ordering::Greater {
            slice.swap(0, 1);
        }
        return slice[k];
    }

    // Boundary short-circuits: min and max don't need a full partition pass.
    if k == 0 {
        let mut min_idx = 0;
        for i in 1..n {
            if cmp(&slice[i], &slice[min_idx]) == Ordering::Less {
                min_idx = i;
            }
        }
        slice.swap(0, min_idx);
        return slice[0];
    }
    if k == n - 1 {
        let mut max_idx = 0;
        for i in 1..n {
            if cmp(&slice[i], &slice[max_idx]) == Ordering::Greater {
                max_idx = i;
            }
        }
        slice.swap(n - 1, max_idx);
        return slice[n - 1];
    }

    let num_groups = n.div_ceil(5);
    let mut medians: Vec<T> = Vec::with_capacity(num_groups);
    for g in 0..num_groups {
        let start = g * 5;
        let end = (start + 5).min(n);
        medians.push(median_of_five(&mut slice[start..end], cmp));
    }
    let mom_len = medians.len();
    let pivot = select_nth(&mut medians, mom_len / 2, cmp);

    let low_count = partition_le_pivot(slice, pivot, cmp);
    match k.cmp(&low_count) {
        Ordering::Less => select_nth(&mut slice[..low_count], k, cmp),
        _ => select_nth(&mut slice[low_count..], k - low_count, cmp),
    }
}

/// Permutes the addressed subsequence `cache[first..last]` (`last == 0`
/// means "to the end") so that the `q`-th smallest value (1-indexed) lands
/// at `cache[first]`; returns that value. `q` must be in `1..=len`.
pub fn locate_min_q<T: Ord + Copy>(cache: &mut [T], q: usize, first: usize, last: usize) -> T {
    let last = if last == 0 { cache.len() } else { last };
    let slice = &mut cache[first..last];
    debug_assert!(q >= 1 && q <= slice.len());
    let k = q - 1;
    let value = select_nth(slice, k, &|a: &T, b: &T| a.cmp(b));
    slice.swap(0, k);
    value
}

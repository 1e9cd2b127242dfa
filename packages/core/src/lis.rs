//! Longest increasing subsequence over a `source` map built by the keyed
//! children diff (spec §4.4, §9).
//!
//! The upstream crate this was originally borrowed from treats `0` as a
//! hole to skip, which silently drops a legitimate match at old-index `0`.
//! This routine is written against an explicit `-1` hole sentinel instead
//! (spec §9 "LIS subtlety"), so every non-negative entry - including `0` -
//! participates.

/// Returns the indices (into `source`) of one longest strictly increasing
/// subsequence of its non-negative entries. Entries equal to `-1` are holes
/// and can never appear in the result.
pub fn longest_increasing_subsequence(source: &[isize]) -> Vec<usize> {
    if source.is_empty() {
        return Vec::new();
    }

    // `tails[k]` is the index into `source` of the smallest tail value of
    // any increasing subsequence of length `k + 1` found so far.
    let mut tails: Vec<usize> = Vec::new();
    // `predecessors[i]` is the index into `source` preceding `i` in the
    // subsequence ending at `i`, or `None` if `i` starts it.
    let mut predecessors: Vec<Option<usize>> = vec![None; source.len()];

    for i in 0..source.len() {
        let value = source[i];
        if value < 0 {
            continue;
        }

        // Binary search for the first tail whose value is >= `value`.
        let mut lo = 0usize;
        let mut hi = tails.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if source[tails[mid]] < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo > 0 {
            predecessors[i] = Some(tails[lo - 1]);
        }

        if lo == tails.len() {
            tails.push(i);
        } else {
            tails[lo] = i;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        result.push(i);
        cursor = predecessors[i];
    }
    result.reverse();
    result
}

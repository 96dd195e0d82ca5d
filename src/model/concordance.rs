use std::cmp::Ordering;

/// Above this sample size pairs are counted with the merge-sort method.
pub const PAIRWISE_MAX_N: usize = 2_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    pub concordant: u64,
    pub discordant: u64,
    pub tied: u64,
}

impl PairCounts {
    pub fn untied(&self) -> u64 {
        self.concordant + self.discordant
    }
}

pub fn count_pairs(x: &[f64], y: &[f64]) -> PairCounts {
    if x.len() <= PAIRWISE_MAX_N {
        count_pairs_pairwise(x, y)
    } else {
        count_pairs_merge(x, y)
    }
}

pub fn count_pairs_pairwise(x: &[f64], y: &[f64]) -> PairCounts {
    let n = x.len().min(y.len());
    let mut counts = PairCounts::default();
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 || dy == 0.0 {
                counts.tied += 1;
            } else if (dx > 0.0) == (dy > 0.0) {
                counts.concordant += 1;
            } else {
                counts.discordant += 1;
            }
        }
    }
    counts
}

/// Knight's O(N log N) count: sort by (x, y), subtract tie blocks, and take
/// strict inversions of the reordered y as the discordant pairs.
pub fn count_pairs_merge(x: &[f64], y: &[f64]) -> PairCounts {
    let n = x.len().min(y.len());
    if n < 2 {
        return PairCounts::default();
    }

    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&a, &b| cmp_f64(x[a], x[b]).then_with(|| cmp_f64(y[a], y[b])));

    let mut x_tied = 0u64;
    let mut joint_tied = 0u64;
    let mut start = 0usize;
    while start < n {
        let mut end = start + 1;
        while end < n && x[order[end]] == x[order[start]] {
            end += 1;
        }
        x_tied += pairs_in(end - start);

        let mut k = start;
        while k < end {
            let mut m = k + 1;
            while m < end && y[order[m]] == y[order[k]] {
                m += 1;
            }
            joint_tied += pairs_in(m - k);
            k = m;
        }
        start = end;
    }

    let mut ys = order.iter().map(|&i| y[i]).collect::<Vec<_>>();
    let discordant = sort_count_inversions(&mut ys);

    let mut y_tied = 0u64;
    let mut start = 0usize;
    while start < n {
        let mut end = start + 1;
        while end < n && ys[end] == ys[start] {
            end += 1;
        }
        y_tied += pairs_in(end - start);
        start = end;
    }

    let tied = x_tied + y_tied - joint_tied;
    let untied = pairs_in(n) - tied;
    PairCounts {
        concordant: untied - discordant,
        discordant,
        tied,
    }
}

/// Bottom-up merge sort; returns the number of strict inversions.
fn sort_count_inversions(values: &mut [f64]) -> u64 {
    let n = values.len();
    let mut buf = vec![0.0f64; n];
    let mut inversions = 0u64;
    let mut width = 1usize;
    while width < n {
        let mut lo = 0usize;
        while lo < n {
            let mid = (lo + width).min(n);
            let hi = (lo + 2 * width).min(n);
            let (mut i, mut j, mut k) = (lo, mid, lo);
            while i < mid && j < hi {
                if values[j] < values[i] {
                    inversions += (mid - i) as u64;
                    buf[k] = values[j];
                    j += 1;
                } else {
                    buf[k] = values[i];
                    i += 1;
                }
                k += 1;
            }
            buf[k..k + (mid - i)].copy_from_slice(&values[i..mid]);
            k += mid - i;
            buf[k..k + (hi - j)].copy_from_slice(&values[j..hi]);
            lo = hi;
        }
        values.copy_from_slice(&buf);
        width *= 2;
    }
    inversions
}

fn pairs_in(k: usize) -> u64 {
    let k = k as u64;
    k * k.saturating_sub(1) / 2
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/concordance.rs"]
mod tests;

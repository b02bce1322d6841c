// src/similarity.rs
//! Leaf comparison utilities: URL normalization for exact-duplicate detection
//! and a character-level sequence ratio for fuzzy title matching.

/// Normalize a URL for equality comparison: lowercase `host + path`, query
/// string and fragment discarded, trailing slashes stripped. The result is
/// never surfaced; it exists only for duplicate detection.
pub fn normalize_url(url: &str) -> String {
    let lower = url.trim().to_ascii_lowercase();

    // Drop scheme ("https://", "ftp://", protocol-relative "//", ...)
    let rest = match lower.find("://") {
        Some(idx) => &lower[idx + 3..],
        None => lower.strip_prefix("//").unwrap_or(&lower),
    };

    // Drop fragment, then query.
    let rest = rest.split('#').next().unwrap_or(rest);
    let rest = rest.split('?').next().unwrap_or(rest);

    rest.trim_end_matches('/').to_string()
}

/// Ratcliff/Obershelp sequence similarity over characters:
/// `2 * matching_chars / (len(a) + len(b))`, in [0.0, 1.0].
///
/// Matching characters are counted by recursively taking the longest common
/// contiguous block and matching the pieces to its left and right, so exact
/// duplicates always score 1.0 and unrelated strings near 0.0.
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    let matches = matching_chars(&a_chars, &b_chars);
    (2.0 * matches as f32) / total as f32
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    // Explicit work stack instead of recursion; titles are short but input is
    // not under our control.
    let mut total = 0usize;
    let mut stack: Vec<(usize, usize, usize, usize)> = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = stack.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, len) = longest_common_block(a, alo, ahi, b, blo, bhi);
        if len == 0 {
            continue;
        }
        total += len;
        stack.push((alo, i, blo, j));
        stack.push((i + len, ahi, j + len, bhi));
    }

    total
}

/// Longest common contiguous block between `a[alo..ahi]` and `b[blo..bhi]`.
/// Returns (start_in_a, start_in_b, length); ties resolve to the earliest
/// occurrence in `a`.
fn longest_common_block(
    a: &[char],
    alo: usize,
    ahi: usize,
    b: &[char],
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0usize);

    // lengths[j] = length of the common suffix ending at a[i], b[j]
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let jj = j - blo + 1;
            if a[i] == b[j] {
                curr[jj] = prev[jj - 1] + 1;
                if curr[jj] > best_len {
                    best_len = curr[jj];
                    best_i = i + 1 - best_len;
                    best_j = j + 1 - best_len;
                }
            } else {
                curr[jj] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.fill(0);
    }

    (best_i, best_j, best_len)
}

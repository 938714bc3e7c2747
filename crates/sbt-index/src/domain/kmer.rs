//! Fixed-length windows over a sequence

/// Iterate the overlapping windows of length `k` of `sequence`, left to right
///
/// Yields nothing when `k` is zero or longer than the sequence.
pub fn kmers(sequence: &[u8], k: usize) -> impl Iterator<Item = &[u8]> {
    let count = kmer_count(sequence.len(), k);
    sequence.windows(k.max(1)).take(count)
}

/// Number of windows of length `k` in a sequence of length `len`
pub fn kmer_count(len: usize, k: usize) -> usize {
    if k == 0 || len < k {
        0
    } else {
        len - k + 1
    }
}

//! Table sizing for nodegraphs
//!
//! Each nodegraph uses several bit tables of distinct prime sizes. A single
//! hash taken modulo each prime behaves like independent hash functions.
//!
//! Formulas:
//! - sizes = the `n` largest primes at or below `starting_size`
//! - FPR   = (occupied / min(sizes)) ^ n

/// Trial-division primality test
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Up to `count` primes at or below `start`, in descending order
///
/// Returns fewer than `count` primes if the range below `start` runs out.
pub fn primes_at_or_below(start: u64, count: usize) -> Vec<u64> {
    let mut primes = Vec::with_capacity(count);
    let mut candidate = start;
    while primes.len() < count && candidate >= 2 {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate -= 1;
    }
    primes
}

/// Expected false positive rate of a nodegraph
///
/// Formula: FPR = (occupied / min_table_size) ^ n_tables
pub fn expected_fpr(occupied: u64, min_table_size: u64, n_tables: usize) -> f64 {
    if min_table_size == 0 {
        return 1.0;
    }
    let load = (occupied as f64 / min_table_size as f64).min(1.0);
    load.powi(n_tables as i32)
}

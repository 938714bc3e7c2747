//! Sampled bit distance between filters
//!
//! Offline analysis only (e.g. clustering datasets before building a tree);
//! never used on the query path.

use rand::Rng;

use crate::error::{SbtError, SbtResult};
use crate::ports::MembershipFilter;

/// Estimate the per-bit mismatch rate between two compatible filters
///
/// Samples `sample_count` byte positions per table, uniformly and with
/// replacement, and returns mismatched bits over sampled bits. The result
/// always lies in `[0, 1]`, is exactly 0 for identical filters and converges
/// to [`exact_distance`] as `sample_count` grows. Pass a seeded RNG for a
/// reproducible estimate.
pub fn estimate_distance<F, R>(a: &F, b: &F, sample_count: usize, rng: &mut R) -> SbtResult<f64>
where
    F: MembershipFilter,
    R: Rng + ?Sized,
{
    if sample_count == 0 {
        return Err(SbtError::InvalidParameters(
            "sample_count must be at least 1".to_string(),
        ));
    }
    let tables = compatible_tables(a, b)?;

    let mut mismatched: u64 = 0;
    let mut sampled: u64 = 0;
    for (ta, tb) in tables {
        if ta.is_empty() {
            continue;
        }
        for _ in 0..sample_count {
            let i = rng.gen_range(0..ta.len());
            mismatched += u64::from((ta[i] ^ tb[i]).count_ones());
        }
        sampled += 8 * sample_count as u64;
    }

    if sampled == 0 {
        return Ok(0.0);
    }
    Ok(mismatched as f64 / sampled as f64)
}

/// Exact per-bit mismatch rate over the full raw tables
pub fn exact_distance<F: MembershipFilter>(a: &F, b: &F) -> SbtResult<f64> {
    let tables = compatible_tables(a, b)?;

    let mut mismatched: u64 = 0;
    let mut total: u64 = 0;
    for (ta, tb) in tables {
        mismatched += ta
            .iter()
            .zip(tb.iter())
            .map(|(x, y)| u64::from((x ^ y).count_ones()))
            .sum::<u64>();
        total += 8 * ta.len() as u64;
    }

    if total == 0 {
        return Ok(0.0);
    }
    Ok(mismatched as f64 / total as f64)
}

/// Pair up raw tables, failing unless both filters share one layout
fn compatible_tables<'a, F: MembershipFilter>(a: &'a F, b: &'a F) -> SbtResult<Vec<(&'a [u8], &'a [u8])>> {
    if !a.is_compatible(b) {
        return Err(SbtError::incompatible(a.params(), b.params()));
    }

    let (ta, tb) = (a.raw_tables(), b.raw_tables());
    let same_layout = ta.len() == tb.len() && ta.iter().zip(tb.iter()).all(|(x, y)| x.len() == y.len());
    if !same_layout {
        let lengths = |tables: &[&[u8]]| tables.iter().map(|t| t.len()).collect::<Vec<_>>();
        return Err(SbtError::IncompatibleFilter {
            expected: format!("table bytes {:?}", lengths(&ta[..])),
            found: format!("table bytes {:?}", lengths(&tb[..])),
        });
    }

    Ok(ta.into_iter().zip(tb).collect())
}

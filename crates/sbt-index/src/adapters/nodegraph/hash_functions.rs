//! Hash functions for k-mer tables
//!
//! Uses MurmurHash3 over the canonical form of each k-mer, so a k-mer and
//! its reverse complement always land on the same bits.

use std::io::Cursor;

/// Seed used for every k-mer hash; table independence comes from the
/// distinct prime table sizes, not from distinct seeds.
pub const KMER_SEED: u32 = 0;

/// Hash an element with MurmurHash3 using a seed
pub fn murmur_hash(element: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(element);

    // Use murmur3 128-bit hash and take the lower 64 bits
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    hash as u64
}

/// Watson-Crick complement of a nucleotide; anything else maps to itself
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Canonical form of a k-mer: the lexicographically smaller of the
/// upper-cased k-mer and its reverse complement
pub fn canonical_kmer(kmer: &[u8]) -> Vec<u8> {
    let forward: Vec<u8> = kmer.iter().map(u8::to_ascii_uppercase).collect();
    let reverse: Vec<u8> = forward.iter().rev().map(|&b| complement(b)).collect();
    if reverse < forward {
        reverse
    } else {
        forward
    }
}

/// Hash a k-mer (strand-independent)
pub fn hash_kmer(kmer: &[u8]) -> u64 {
    murmur_hash(&canonical_kmer(kmer), KMER_SEED)
}

/// Bit position of `hash` in each table
pub fn table_positions(hash: u64, table_sizes: &[u64]) -> impl Iterator<Item = usize> + '_ {
    table_sizes.iter().map(move |&size| (hash % size) as usize)
}

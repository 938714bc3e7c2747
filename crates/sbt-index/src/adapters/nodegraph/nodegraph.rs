//! Nodegraph: k-mer presence filter with prime-sized tables
//!
//! INVARIANTS:
//! - No false negatives: if a k-mer was inserted, `contains()` MUST return true
//! - Union is a superset: `union()` ORs tables, so nothing is ever cleared

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::hash_functions::{hash_kmer, table_positions};
use super::parameters::expected_fpr;
use crate::domain::kmer::kmers;
use crate::error::{SbtError, SbtResult};
use crate::ports::MembershipFilter;

/// File signature written before every persisted nodegraph
pub const MAGIC: &[u8; 8] = b"SBTGRAPH";

/// Construction parameters of a nodegraph
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodegraphParams {
    /// k-mer length
    pub ksize: usize,
    /// Size in bits of each table (distinct primes)
    pub table_sizes: Vec<u64>,
}

impl NodegraphParams {
    /// Check the layout is usable for hashing
    ///
    /// Requires a non-zero `ksize` and at least one table, with every table
    /// size non-zero and distinct.
    pub fn validate(&self) -> SbtResult<()> {
        if self.ksize == 0 {
            return Err(SbtError::InvalidParameters("ksize must be at least 1".to_string()));
        }
        if self.table_sizes.is_empty() {
            return Err(SbtError::InvalidParameters(
                "a nodegraph needs at least one table".to_string(),
            ));
        }
        if self.table_sizes.contains(&0) {
            return Err(SbtError::InvalidParameters(format!(
                "table sizes must be non-zero, got {:?}",
                self.table_sizes
            )));
        }
        let mut sizes = self.table_sizes.clone();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.len() != self.table_sizes.len() {
            return Err(SbtError::InvalidParameters(format!(
                "table sizes must be distinct, got {:?}",
                self.table_sizes
            )));
        }
        Ok(())
    }

    /// [`NodegraphParams::validate`] for parameters read from `path`
    fn validate_stored(&self, path: &Path) -> SbtResult<()> {
        self.validate().map_err(|err| match err {
            SbtError::InvalidParameters(reason) => {
                SbtError::Format(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }
}

/// Bloom filter over k-mers
///
/// One hash per k-mer, taken modulo each table size. A k-mer is present
/// when its bit is set in every table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nodegraph {
    /// Serialized first so `extract_params` can stop after it
    params: NodegraphParams,
    /// Bit tables, one per entry of `params.table_sizes`
    #[serde(with = "tables_serde")]
    tables: Vec<BitVec<u8, Lsb0>>,
}

/// Serde support for a list of BitVec tables
mod tables_serde {
    use bitvec::prelude::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(tables: &[BitVec<u8, Lsb0>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let raw: Vec<(&[u8], usize)> = tables
            .iter()
            .map(|bits| (bits.as_raw_slice(), bits.len()))
            .collect();
        raw.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<BitVec<u8, Lsb0>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<(Vec<u8>, usize)> = Deserialize::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(bytes, len)| {
                let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes);
                bits.truncate(len);
                bits
            })
            .collect())
    }
}

impl Nodegraph {
    /// Create an empty nodegraph, rejecting unusable layouts
    pub fn new(params: NodegraphParams) -> SbtResult<Self> {
        params.validate()?;
        Ok(Self::allocate(params))
    }

    fn allocate(params: NodegraphParams) -> Self {
        let tables = params
            .table_sizes
            .iter()
            .map(|&size| bitvec![u8, Lsb0; 0; size as usize])
            .collect();
        Self { params, tables }
    }

    /// Insert every k-mer window of `sequence`
    ///
    /// Returns the number of windows inserted (zero if the sequence is
    /// shorter than k).
    pub fn consume_sequence(&mut self, sequence: &[u8]) -> usize {
        let ksize = self.params.ksize;
        let mut inserted = 0;
        for kmer in kmers(sequence, ksize) {
            self.insert(kmer);
            inserted += 1;
        }
        inserted
    }

    /// Table sizes in bits
    pub fn table_sizes(&self) -> &[u64] {
        &self.params.table_sizes
    }

    /// Number of bits set across all tables
    pub fn bits_set(&self) -> usize {
        self.tables.iter().map(|bits| bits.count_ones()).sum()
    }

    fn check_layout(&self, path: &Path) -> SbtResult<()> {
        self.params.validate_stored(path)?;
        if self.tables.len() != self.params.table_sizes.len() {
            return Err(SbtError::Format(format!(
                "{}: {} tables stored, {} declared",
                path.display(),
                self.tables.len(),
                self.params.table_sizes.len()
            )));
        }
        for (bits, &size) in self.tables.iter().zip(self.params.table_sizes.iter()) {
            if bits.len() as u64 != size {
                return Err(SbtError::Format(format!(
                    "{}: table of {} bits stored, {} declared",
                    path.display(),
                    bits.len(),
                    size
                )));
            }
        }
        Ok(())
    }

    fn open_checked(path: &Path) -> SbtResult<BufReader<File>> {
        let file = File::open(path).map_err(|e| SbtError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut magic = [0u8; 8];
        reader
            .read_exact(&mut magic)
            .map_err(|e| SbtError::io(path, e))?;
        if &magic != MAGIC {
            return Err(SbtError::Format(format!(
                "{}: not a nodegraph file",
                path.display()
            )));
        }
        Ok(reader)
    }
}

impl MembershipFilter for Nodegraph {
    type Params = NodegraphParams;

    /// # Panics
    /// Panics if `params` fail [`NodegraphParams::validate`]. Use
    /// [`Nodegraph::new`] or `NodegraphConfig::create_nodegraph` for
    /// unchecked input.
    fn create(params: &NodegraphParams) -> Self {
        if let Err(err) = params.validate() {
            panic!("Cannot create nodegraph: {err}");
        }
        Self::allocate(params.clone())
    }

    fn params(&self) -> &NodegraphParams {
        &self.params
    }

    fn ksize(&self) -> usize {
        self.params.ksize
    }

    fn insert(&mut self, element: &[u8]) {
        let hash = hash_kmer(element);
        for (bits, pos) in self
            .tables
            .iter_mut()
            .zip(table_positions(hash, &self.params.table_sizes))
        {
            bits.set(pos, true);
        }
    }

    fn contains(&self, element: &[u8]) -> bool {
        let hash = hash_kmer(element);
        self.tables
            .iter()
            .zip(table_positions(hash, &self.params.table_sizes))
            .all(|(bits, pos)| bits[pos])
    }

    /// OR every table of `other` into `self`
    ///
    /// # Panics
    /// Panics if the filters have different table layouts.
    fn union(&mut self, other: &Nodegraph) {
        assert_eq!(
            self.params, other.params,
            "Cannot union nodegraphs with different parameters"
        );

        for (mine, theirs) in self.tables.iter_mut().zip(other.tables.iter()) {
            for (s, o) in mine
                .as_raw_mut_slice()
                .iter_mut()
                .zip(theirs.as_raw_slice().iter())
            {
                *s |= *o;
            }
        }
    }

    /// Bits set in the first table
    fn occupancy(&self) -> u64 {
        self.tables
            .first()
            .map(|bits| bits.count_ones() as u64)
            .unwrap_or(0)
    }

    fn expected_false_positive_rate(&self) -> f64 {
        let min_size = self.params.table_sizes.iter().copied().min().unwrap_or(0);
        expected_fpr(self.occupancy(), min_size, self.tables.len())
    }

    fn raw_tables(&self) -> Vec<&[u8]> {
        self.tables.iter().map(|bits| bits.as_raw_slice()).collect()
    }

    fn save(&self, path: &Path) -> SbtResult<()> {
        let file = File::create(path).map_err(|e| SbtError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC).map_err(|e| SbtError::io(path, e))?;
        bincode::serialize_into(&mut writer, self).map_err(|e| SbtError::from_bincode(path, e))?;
        writer.flush().map_err(|e| SbtError::io(path, e))
    }

    fn load(path: &Path) -> SbtResult<Self> {
        let mut reader = Self::open_checked(path)?;
        let graph: Nodegraph =
            bincode::deserialize_from(&mut reader).map_err(|e| SbtError::from_bincode(path, e))?;
        graph.check_layout(path)?;
        Ok(graph)
    }

    fn extract_params(path: &Path) -> SbtResult<NodegraphParams> {
        let mut reader = Self::open_checked(path)?;
        let params: NodegraphParams =
            bincode::deserialize_from(&mut reader).map_err(|e| SbtError::from_bincode(path, e))?;
        params.validate_stored(path)?;
        Ok(params)
    }
}

//! Tree persistence: JSON manifest plus one filter file per node
//!
//! `save(tree, "out/genomes")` writes
//!
//! ```text
//! out/genomes.sbt.json                         manifest
//! out/.sbt.genomes/genomes.internal.0.sbt      one filter per internal node
//! out/.sbt.genomes/genomes.leaf.<identity>.sbt  one filter per leaf
//! ```
//!
//! Leaf and internal files live under distinct prefixes, and identities are
//! percent-escaped, so every distinct leaf identity gets its own file.
//!
//! Filter paths in the manifest are relative to the manifest's directory,
//! so a saved tree can be moved as a unit. Loading is all-or-nothing: any
//! missing field, unreadable filter or incompatible filter aborts the load
//! and no partial tree is returned.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::config::TreeConfig;
use crate::domain::node::{Internal, Leaf, Node};
use crate::domain::tree::{internal_name, SequenceBloomTree};
use crate::error::{SbtError, SbtResult};
use crate::ports::MembershipFilter;

/// Manifest format version written by [`save`]
pub const MANIFEST_VERSION: u32 = 1;

/// Suffix appended to the tag to form the manifest file name
pub const MANIFEST_SUFFIX: &str = ".sbt.json";

fn default_version() -> u32 {
    MANIFEST_VERSION
}

/// Top-level manifest document
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,
    /// `None` for an empty tree
    #[serde(default)]
    pub root: Option<NodeRecord>,
}

/// One node of the manifest
///
/// Leaves carry `metadata` (the leaf identity); internal nodes carry
/// `left` and `right`. Any other combination is a format error.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Display name (leaves) or synthetic id (internal nodes)
    pub name: String,
    /// Filter file, relative to the manifest's directory
    pub filter_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<NodeRecord>>,
}

/// Where a tag's manifest and filter files live
struct Layout {
    /// Directory holding the manifest
    base_dir: PathBuf,
    /// Last component of the tag
    stem: String,
}

impl Layout {
    fn from_tag(tag: &Path) -> SbtResult<Self> {
        let stem = tag
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                SbtError::InvalidParameters(format!("invalid tree tag {}", tag.display()))
            })?
            .to_string();
        let base_dir = match tag.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { base_dir, stem })
    }

    fn manifest_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}{}", self.stem, MANIFEST_SUFFIX))
    }

    /// Filter directory, relative to `base_dir`
    fn filter_dir(&self) -> PathBuf {
        PathBuf::from(format!(".sbt.{}", self.stem))
    }

    /// Filter file for a leaf, relative to `base_dir`
    fn leaf_file(&self, identity: &str) -> PathBuf {
        self.filter_dir()
            .join(format!("{}.leaf.{}.sbt", self.stem, escape_identity(identity)))
    }

    /// Filter file for the `index`-th internal node, relative to `base_dir`
    fn internal_file(&self, index: usize) -> PathBuf {
        self.filter_dir()
            .join(format!("{}.{}.sbt", self.stem, internal_name(index)))
    }
}

/// Percent-escape everything outside `[A-Za-z0-9._-]`
///
/// Injective, and the result is always a single path component.
fn escape_identity(identity: &str) -> String {
    let mut escaped = String::with_capacity(identity.len());
    for byte in identity.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => escaped.push(byte as char),
            other => escaped.push_str(&format!("%{other:02X}")),
        }
    }
    escaped
}

/// Persist `tree` under `tag`, returning the manifest path
///
/// Leaves are stored under their escaped identity, internal nodes under
/// `internal.<n>` numbered in pre-order. Two leaves with the same identity
/// fail with `NameCollision` before the manifest is written.
pub fn save<F: MembershipFilter>(tree: &SequenceBloomTree<F>, tag: impl AsRef<Path>) -> SbtResult<PathBuf> {
    let layout = Layout::from_tag(tag.as_ref())?;
    let manifest_path = layout.manifest_path();

    let root = match tree.root() {
        Some(root) => {
            let filter_dir = layout.base_dir.join(layout.filter_dir());
            std::fs::create_dir_all(&filter_dir).map_err(|e| SbtError::io(&filter_dir, e))?;

            let mut writer = RecordWriter {
                layout: &layout,
                next_internal: 0,
                written: HashSet::new(),
            };
            Some(writer.write_node(root)?)
        }
        None => None,
    };

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        root,
    };
    write_manifest(&manifest_path, &manifest)?;

    info!(
        manifest = %manifest_path.display(),
        leaves = tree.len(),
        "saved tree"
    );
    Ok(manifest_path)
}

/// Write via a temp file and rename, so a crash never leaves a torn manifest
fn write_manifest(path: &Path, manifest: &Manifest) -> SbtResult<()> {
    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| SbtError::io(&temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest)?;
    writer.flush().map_err(|e| SbtError::io(&temp_path, e))?;
    drop(writer);
    std::fs::rename(&temp_path, path).map_err(|e| SbtError::io(path, e))
}

struct RecordWriter<'a> {
    layout: &'a Layout,
    next_internal: usize,
    written: HashSet<PathBuf>,
}

impl RecordWriter<'_> {
    fn write_node<F: MembershipFilter>(&mut self, node: &Node<F>) -> SbtResult<NodeRecord> {
        match node {
            Node::Leaf(leaf) => {
                let relative = self.layout.leaf_file(leaf.identity());
                let filter_file = self.write_filter(relative, leaf.filter())?;
                Ok(NodeRecord {
                    name: leaf.name().to_string(),
                    filter_file,
                    metadata: Some(leaf.identity().to_string()),
                    left: None,
                    right: None,
                })
            }
            Node::Internal(internal) => {
                let name = internal_name(self.next_internal);
                let relative = self.layout.internal_file(self.next_internal);
                self.next_internal += 1;
                let filter_file = self.write_filter(relative, internal.filter())?;
                let left = self.write_node(internal.left())?;
                let right = self.write_node(internal.right())?;
                Ok(NodeRecord {
                    name,
                    filter_file,
                    metadata: None,
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                })
            }
        }
    }

    fn write_filter<F: MembershipFilter>(&mut self, relative: PathBuf, filter: &F) -> SbtResult<PathBuf> {
        if !self.written.insert(relative.clone()) {
            return Err(SbtError::NameCollision {
                file: relative.display().to_string(),
            });
        }
        let path = self.layout.base_dir.join(&relative);
        debug!(file = %path.display(), "writing filter");
        filter.save(&path)?;
        Ok(relative)
    }
}

/// Rebuild a tree from a manifest written by [`save`]
pub fn load<F: MembershipFilter>(manifest_path: impl AsRef<Path>) -> SbtResult<SequenceBloomTree<F>> {
    load_with_config(manifest_path, &TreeConfig::default())
}

/// [`load`] with an explicit configuration for further insertions
pub fn load_with_config<F: MembershipFilter>(
    manifest_path: impl AsRef<Path>,
    config: &TreeConfig,
) -> SbtResult<SequenceBloomTree<F>> {
    let manifest_path = manifest_path.as_ref();
    let bytes = std::fs::read(manifest_path).map_err(|e| SbtError::io(manifest_path, e))?;
    let manifest: Manifest = serde_json::from_slice(&bytes)?;

    if manifest.version != MANIFEST_VERSION {
        return Err(SbtError::Format(format!(
            "unsupported manifest version {} (expected {})",
            manifest.version, MANIFEST_VERSION
        )));
    }

    let root = manifest.root.ok_or_else(|| SbtError::EmptyTree {
        path: manifest_path.to_path_buf(),
    })?;

    let base_dir = match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let params = F::extract_params(&base_dir.join(&root.filter_file))?;

    let reader = RecordReader {
        base_dir: &base_dir,
        params: &params,
    };
    let root = reader.read_node(root)?;

    info!(
        manifest = %manifest_path.display(),
        leaves = root.leaf_count(),
        "loaded tree"
    );
    Ok(SequenceBloomTree::from_root(root, params, config))
}

struct RecordReader<'a, P> {
    base_dir: &'a Path,
    params: &'a P,
}

impl<P: PartialEq + std::fmt::Debug> RecordReader<'_, P> {
    fn read_node<F: MembershipFilter<Params = P>>(&self, record: NodeRecord) -> SbtResult<Node<F>> {
        let NodeRecord {
            name,
            filter_file,
            metadata,
            left,
            right,
        } = record;

        match (metadata, left, right) {
            (Some(identity), None, None) => {
                let filter = self.read_filter(&filter_file)?;
                Ok(Node::Leaf(Leaf::with_name(identity, name, filter)))
            }
            (None, Some(left), Some(right)) => {
                let filter = self.read_filter(&filter_file)?;
                let left = self.read_node(*left)?;
                let right = self.read_node(*right)?;
                Ok(Node::Internal(Internal::join(filter, left, right)))
            }
            (Some(_), _, _) => Err(SbtError::Format(format!(
                "record {name}: a leaf (has metadata) cannot have children"
            ))),
            (None, None, None) => Err(SbtError::Format(format!(
                "record {name}: missing field `metadata` or `left`/`right`"
            ))),
            (None, _, _) => Err(SbtError::Format(format!(
                "record {name}: internal node needs both `left` and `right`"
            ))),
        }
    }

    fn read_filter<F: MembershipFilter<Params = P>>(&self, filter_file: &Path) -> SbtResult<F> {
        let path = self.base_dir.join(filter_file);
        let filter = F::load(&path)?;
        if filter.params() != self.params {
            return Err(SbtError::incompatible(self.params, filter.params()));
        }
        Ok(filter)
    }
}

//! Dataset index - maps hierarchical dataset names to byte ranges in a region body

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Bound, Range};

use crate::core::{FacadeError, Result};

/// Location and layout of one block inside the region body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Byte offset relative to the start of the body
    pub offset: u64,
    /// Number of records
    pub count: u64,
    /// Size of one record in bytes
    pub elem_size: u32,
}

impl BlockEntry {
    pub fn byte_len(&self) -> u64 {
        self.count.saturating_mul(self.elem_size as u64)
    }

    pub fn byte_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.byte_len() as usize
    }
}

/// Name -> block table of a region.
///
/// Names are `/`-separated paths. A dataset such as `/common/names` is a group
/// of blocks (`/common/names/offsets`, `/common/names/values`); probing the
/// group name tells whether the dataset was produced at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataIndex {
    blocks: BTreeMap<String, BlockEntry>,
}

impl DataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, entry: BlockEntry) -> Result<()> {
        if self.blocks.contains_key(&name) {
            return Err(FacadeError::DuplicateDataset(name));
        }
        self.blocks.insert(name, entry);
        Ok(())
    }

    /// True if a block is named `name` or lives underneath it
    pub fn exists(&self, name: &str) -> bool {
        self.list(name).next().is_some()
    }

    /// Looks up one block by its exact name
    pub fn resolve(&self, name: &str) -> Result<&BlockEntry> {
        self.blocks
            .get(name)
            .ok_or_else(|| FacadeError::DatasetNotFound(name.to_string()))
    }

    /// Iterates every block named `prefix` or nested below it, in name order
    pub fn list<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a BlockEntry)> + 'a {
        self.blocks
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(name, _)| name.starts_with(prefix))
            .filter(move |(name, _)| {
                name.len() == prefix.len()
                    || prefix.ends_with('/')
                    || name.as_bytes()[prefix.len()] == b'/'
            })
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// All blocks in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlockEntry)> {
        self.blocks.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(offset: u64) -> BlockEntry {
        BlockEntry {
            offset,
            count: 2,
            elem_size: 4,
        }
    }

    fn sample_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert("/common/names/offsets".into(), entry(0)).unwrap();
        index.insert("/common/names/values".into(), entry(64)).unwrap();
        index.insert("/common/names-extra".into(), entry(128)).unwrap();
        index.insert("/common/timestamp".into(), entry(192)).unwrap();
        index
    }

    #[test]
    fn test_exists_is_path_aware() {
        let index = sample_index();
        assert!(index.exists("/common/names"));
        assert!(index.exists("/common/names/values"));
        assert!(index.exists("/common/timestamp"));
        assert!(index.exists("/common"));
        assert!(!index.exists("/common/name"));
        assert!(!index.exists("/common/turn_data"));
        assert!(!index.exists("/ch"));
    }

    #[test]
    fn test_resolve() {
        let index = sample_index();
        assert_eq!(index.resolve("/common/names/values").unwrap().offset, 64);
        let err = index.resolve("/common/names").unwrap_err();
        assert!(matches!(err, FacadeError::DatasetNotFound(name) if name == "/common/names"));
    }

    #[test]
    fn test_list_skips_sibling_prefixes() {
        let index = sample_index();
        let names: Vec<_> = index.list("/common/names").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["/common/names/offsets", "/common/names/values"]);
    }

    #[test]
    fn test_list_starts_at_prefix() {
        let index = sample_index();
        assert_eq!(index.list("/").count(), 4);
        assert_eq!(index.list("/common/").count(), 4);
        let names: Vec<_> = index.list("/common/timestamp").map(|(n, _)| n).collect();
        assert_eq!(names, vec!["/common/timestamp"]);
        assert_eq!(index.list("/mld").count(), 0);
        assert_eq!(index.list("/common/zzz").count(), 0);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut index = sample_index();
        let err = index.insert("/common/timestamp".into(), entry(0)).unwrap_err();
        assert!(matches!(err, FacadeError::DuplicateDataset(_)));
    }

    #[test]
    fn test_json_round_trip_is_a_plain_map() {
        let index = sample_index();
        let json = serde_json::to_string(&index).unwrap();
        assert!(json.starts_with("{\"/common/names-extra\""));
        let back: DataIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
        assert_eq!(back.resolve("/common/timestamp").unwrap().byte_range(), 192..200);
    }
}

//! Contiguous region - the immutable byte buffer every view aliases
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! HEADER (64 bytes):
//!   magic: u32 = 0x47524642 ("BFRG")
//!   version: u16
//!   reserved: u16
//!   index_len: u64      JSON dataset index length
//!   body_len: u64
//!   body_crc: u64       CRC-64-ISO of the body
//!   padding: 32 bytes
//! INDEX: index_len bytes, zero padded to 64
//! BODY: blocks, each at a 64-byte aligned offset
//! ```

use bytemuck::Pod;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::crc;
use super::index::DataIndex;
use crate::core::{FacadeError, Result};

pub(crate) const MAGIC: u32 = 0x4752_4642; // "BFRG"
pub(crate) const VERSION: u16 = 1;
pub(crate) const HEADER_SIZE: usize = 64;

/// Alignment of the body start and of every block inside it
pub const BLOCK_ALIGNMENT: usize = 64;

pub(crate) fn align_up(value: usize) -> usize {
    value.div_ceil(BLOCK_ALIGNMENT) * BLOCK_ALIGNMENT
}

enum Backing {
    /// Process-local copy, stored as words so the body is 8-byte aligned
    Owned { words: Vec<u64>, len: usize },
    /// Read-only file mapping, shareable between processes
    Mapped(Mmap),
}

impl Backing {
    fn bytes(&self) -> &[u8] {
        match self {
            Backing::Owned { words, len } => &bytemuck::cast_slice::<u64, u8>(words)[..*len],
            Backing::Mapped(mmap) => mmap,
        }
    }
}

/// Owner of a contiguous region and its dataset index.
///
/// A region is fully validated when it is created and never written to
/// afterwards. Views borrow from it, so the borrow checker guarantees the
/// region outlives every facade built on it.
pub struct Region {
    backing: Backing,
    body_start: usize,
    body_len: usize,
    index: DataIndex,
}

impl Region {
    /// Memory-maps a region file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        // Safety: the mapping is read-only and regions are never rewritten in
        // place; a new data generation is always written to a new file.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.as_ref().display(), bytes = mmap.len(), "mapped region");
        Self::parse(Backing::Mapped(mmap))
    }

    /// Reads a region file into process memory
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let len = file.metadata()?.len() as usize;
        let mut words = vec![0u64; len.div_ceil(8)];
        file.read_exact(&mut bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..len])?;
        debug!(path = %path.as_ref().display(), bytes = len, "read region");
        Self::parse(Backing::Owned { words, len })
    }

    /// Copies a serialized region into process memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let len = bytes.len();
        let mut words = vec![0u64; len.div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..len].copy_from_slice(bytes);
        Self::parse(Backing::Owned { words, len })
    }

    fn parse(backing: Backing) -> Result<Self> {
        let bytes = backing.bytes();
        if bytes.len() < HEADER_SIZE {
            return Err(FacadeError::InvalidRegion(format!(
                "{} bytes is shorter than the header",
                bytes.len()
            )));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Err(FacadeError::InvalidRegion(format!("bad magic 0x{magic:08x}")));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(FacadeError::InvalidRegion(format!(
                "unsupported version {version}"
            )));
        }
        let read_u64 = |at: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[at..at + 8]);
            u64::from_le_bytes(buf)
        };
        let index_len = read_u64(8) as usize;
        let body_len = read_u64(16) as usize;
        let body_crc = read_u64(24);
        if index_len > bytes.len() || body_len > bytes.len() {
            return Err(FacadeError::InvalidRegion("header lengths exceed the file".to_string()));
        }

        let body_start = HEADER_SIZE + align_up(index_len);
        if body_start.checked_add(body_len) != Some(bytes.len()) {
            return Err(FacadeError::InvalidRegion(format!(
                "expected {} bytes, found {}",
                body_start.saturating_add(body_len),
                bytes.len()
            )));
        }

        let body = &bytes[body_start..];
        if crc::checksum(body) != body_crc {
            return Err(FacadeError::InvalidRegion("body checksum mismatch".to_string()));
        }

        let index: DataIndex = serde_json::from_slice(&bytes[HEADER_SIZE..HEADER_SIZE + index_len])?;
        for (name, entry) in index.iter() {
            let end = entry
                .offset
                .checked_add(entry.byte_len())
                .filter(|&end| end <= body_len as u64);
            if end.is_none() {
                return Err(FacadeError::InvalidRegion(format!(
                    "block {name} extends past the body"
                )));
            }
        }

        debug!(blocks = index.len(), body_len, "region validated");
        Ok(Self {
            backing,
            body_start,
            body_len,
            index,
        })
    }

    pub fn index(&self) -> &DataIndex {
        &self.index
    }

    /// Shorthand for `index().exists(name)`
    pub fn exists(&self, name: &str) -> bool {
        self.index.exists(name)
    }

    /// Size of the body in bytes
    pub fn body_len(&self) -> usize {
        self.body_len
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    fn body(&self) -> &[u8] {
        &self.backing.bytes()[self.body_start..]
    }

    /// Raw bytes of one block
    pub fn raw_block(&self, name: &str) -> Result<&[u8]> {
        let entry = self.index.resolve(name)?;
        Ok(&self.body()[entry.byte_range()])
    }

    /// Views one block as a slice of records, without copying
    pub fn block<T: Pod>(&self, name: &str) -> Result<&[T]> {
        let entry = self.index.resolve(name)?;
        let expected = std::mem::size_of::<T>();
        if entry.elem_size as usize != expected {
            return Err(FacadeError::LayoutMismatch {
                name: name.to_string(),
                expected,
                found: entry.elem_size as usize,
            });
        }
        bytemuck::try_cast_slice(&self.body()[entry.byte_range()]).map_err(|e| {
            FacadeError::Misaligned {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Views a single-record block
    pub fn value<T: Pod>(&self, name: &str) -> Result<&T> {
        match self.block::<T>(name)? {
            [value] => Ok(value),
            other => Err(FacadeError::invalid(
                name,
                format!("expected exactly one record, found {}", other.len()),
            )),
        }
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("mapped", &self.is_mapped())
            .field("blocks", &self.index.len())
            .field("body_len", &self.body_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    fn sample_bytes() -> Vec<u8> {
        let mut builder = RegionBuilder::new();
        builder.add("/test/values", &[1u32, 2, 3]).unwrap();
        builder.add("/test/wide", &[10u64, 20]).unwrap();
        builder.add_value("/test/single", &7u32).unwrap();
        builder.to_bytes().unwrap()
    }

    #[test]
    fn test_block_views_alias_region() {
        let region = Region::from_bytes(&sample_bytes()).unwrap();
        assert_eq!(region.block::<u32>("/test/values").unwrap(), &[1, 2, 3]);
        assert_eq!(region.block::<u64>("/test/wide").unwrap(), &[10, 20]);
        assert_eq!(*region.value::<u32>("/test/single").unwrap(), 7);
        assert!(!region.is_mapped());
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let region = Region::from_bytes(&sample_bytes()).unwrap();
        let err = region.block::<u64>("/test/values").unwrap_err();
        assert!(matches!(err, FacadeError::LayoutMismatch { expected: 8, found: 4, .. }));
        let err = region.value::<u32>("/test/values").unwrap_err();
        assert!(matches!(err, FacadeError::InvalidDataset { .. }));
    }

    #[test]
    fn test_missing_block() {
        let region = Region::from_bytes(&sample_bytes()).unwrap();
        assert!(matches!(
            region.block::<u32>("/test/absent"),
            Err(FacadeError::DatasetNotFound(_))
        ));
    }

    #[test]
    fn test_corruption_detected() {
        let mut bytes = sample_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            Region::from_bytes(&bytes),
            Err(FacadeError::InvalidRegion(_))
        ));

        let mut bytes = sample_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            Region::from_bytes(&bytes),
            Err(FacadeError::InvalidRegion(_))
        ));

        let bytes = sample_bytes();
        assert!(Region::from_bytes(&bytes[..bytes.len() - 8]).is_err());
        assert!(Region::from_bytes(&bytes[..10]).is_err());
    }

    #[test]
    fn test_open_mapped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.region");
        std::fs::write(&path, sample_bytes()).unwrap();

        let mapped = Region::open(&path).unwrap();
        assert!(mapped.is_mapped());
        assert_eq!(mapped.block::<u32>("/test/values").unwrap(), &[1, 2, 3]);

        let read = Region::read(&path).unwrap();
        assert_eq!(read.index(), mapped.index());
        assert_eq!(read.block::<u64>("/test/wide").unwrap(), &[10, 20]);
    }
}

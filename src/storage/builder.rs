//! Region builder - the producer side of the region layout
//!
//! Upstream pipelines (extraction, contraction, partitioning) hand their typed
//! tables to a builder, which packs them into one region file.

use bytemuck::Pod;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::crc;
use super::index::{BlockEntry, DataIndex};
use super::region::{align_up, Region, HEADER_SIZE, MAGIC, VERSION};
use crate::core::Result;

/// Accumulates named blocks and serializes them as a region
#[derive(Debug, Default)]
pub struct RegionBuilder {
    index: DataIndex,
    body: Vec<u8>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block of records under `name`
    pub fn add<T: Pod>(&mut self, name: impl Into<String>, values: &[T]) -> Result<&mut Self> {
        let offset = align_up(self.body.len());
        let entry = BlockEntry {
            offset: offset as u64,
            count: values.len() as u64,
            elem_size: std::mem::size_of::<T>() as u32,
        };
        self.index.insert(name.into(), entry)?;
        self.body.resize(offset, 0);
        self.body.extend_from_slice(bytemuck::cast_slice(values));
        Ok(self)
    }

    /// Appends a single-record block
    pub fn add_value<T: Pod>(&mut self, name: impl Into<String>, value: &T) -> Result<&mut Self> {
        self.add(name, std::slice::from_ref(value))
    }

    /// Appends a UTF-8 string as a byte block
    pub fn add_str(&mut self, name: impl Into<String>, value: &str) -> Result<&mut Self> {
        self.add(name, value.as_bytes())
    }

    pub fn index(&self) -> &DataIndex {
        &self.index
    }

    /// Serializes header, index and body into one buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Writes the region to a file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(path = %path.as_ref().display(), blocks = self.index.len(), "wrote region");
        Ok(())
    }

    /// Serializes and loads the region into process memory
    pub fn build(&self) -> Result<Region> {
        Region::from_bytes(&self.to_bytes()?)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let index = serde_json::to_vec(&self.index)?;
        let mut crc_digest = crc::Digest::new();
        crc_digest.update(&self.body);

        // Header (64 bytes): 4+2+2+8+8+8 = 32, pad 32
        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&(index.len() as u64).to_le_bytes())?;
        writer.write_all(&(self.body.len() as u64).to_le_bytes())?;
        writer.write_all(&crc_digest.finalize().to_le_bytes())?;
        writer.write_all(&[0u8; HEADER_SIZE - 32])?;

        writer.write_all(&index)?;
        writer.write_all(&vec![0u8; align_up(index.len()) - index.len()])?;

        writer.write_all(&self.body)?;
        Ok(())
    }
}

//! Packed bit vectors stored as u64 words

use crate::core::{FacadeError, Result};
use crate::storage::Region;

/// Read-only bit vector over a `u64` block
#[derive(Debug, Clone, Copy)]
pub struct BitsetView<'r> {
    words: &'r [u64],
    len: usize,
}

impl<'r> BitsetView<'r> {
    /// Views `name` as a bitset that must cover at least `len` bits
    pub fn load(region: &'r Region, name: &str, len: usize) -> Result<Self> {
        let words = region.block::<u64>(name)?;
        if words.len() < len.div_ceil(64) {
            return Err(FacadeError::invalid(
                name,
                format!("{} words cannot hold {len} bits", words.len()),
            ));
        }
        Ok(Self { words, len })
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count_ones(&self) -> usize {
        (0..self.len).filter(|&i| self.get(i)).count()
    }
}

/// Packs booleans into words, the inverse of [`BitsetView`]
pub fn pack_bits(bits: impl IntoIterator<Item = bool>) -> Vec<u64> {
    let mut words = Vec::new();
    for (i, bit) in bits.into_iter().enumerate() {
        if i % 64 == 0 {
            words.push(0);
        }
        if bit {
            words[i / 64] |= 1u64 << (i % 64);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    #[test]
    fn test_bitset_view() {
        let bits: Vec<bool> = (0..70).map(|i| i % 3 == 0).collect();
        let mut builder = RegionBuilder::new();
        builder.add("/bits", &pack_bits(bits.iter().copied())).unwrap();
        let region = builder.build().unwrap();

        let view = BitsetView::load(&region, "/bits", 70).unwrap();
        for (i, &bit) in bits.iter().enumerate() {
            assert_eq!(view.get(i), bit, "bit {i}");
        }
        assert_eq!(view.count_ones(), 24);

        let err = BitsetView::load(&region, "/bits", 200).unwrap_err();
        assert!(matches!(err, FacadeError::InvalidDataset { .. }));
    }
}

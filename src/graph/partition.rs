//! Nested cell partition used by MLD
//!
//! Level 0 is the graph itself; levels `1..number_of_levels()` group nodes
//! into ever larger cells. The cell ids of all levels are packed into one
//! `u64` per node, each level owning a bit field.

use bytemuck::{Pod, Zeroable};
use std::ops::Range;

use crate::core::{CellId, FacadeError, LevelId, NodeId, Result};
use crate::storage::Region;

pub const MAX_NUM_LEVEL: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct LevelData {
    /// Number of levels including level 0
    pub num_level: u32,
    pub _padding: u32,
    pub lidx_to_offset: [u8; MAX_NUM_LEVEL],
    pub lidx_to_mask: [u64; MAX_NUM_LEVEL],
    pub lidx_to_num_cells: [u32; MAX_NUM_LEVEL],
    pub lidx_to_children_offsets: [u32; MAX_NUM_LEVEL],
}

impl LevelData {
    /// Bit layout for levels with the given cell counts, lowest level first
    pub fn new(cells_per_level: &[u32]) -> Self {
        let mut data = Self::zeroed();
        data.num_level = cells_per_level.len() as u32 + 1;
        let mut offset = 0u32;
        let mut children = 0u32;
        for (lidx, &cells) in cells_per_level.iter().enumerate() {
            let bits = (32 - cells.saturating_sub(1).leading_zeros()).max(1);
            data.lidx_to_offset[lidx] = offset as u8;
            data.lidx_to_mask[lidx] = ((1u64 << bits) - 1) << offset;
            data.lidx_to_num_cells[lidx] = cells;
            data.lidx_to_children_offsets[lidx] = children;
            if lidx > 0 {
                children += cells + 1;
            }
            offset += bits;
        }
        data
    }

    /// Packs per-level cell ids (lowest level first) into a partition word
    pub fn pack(&self, cells: &[CellId]) -> u64 {
        cells.iter().enumerate().fold(0u64, |word, (lidx, &cell)| {
            word | ((cell as u64) << self.lidx_to_offset[lidx]) & self.lidx_to_mask[lidx]
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MultiLevelPartitionView<'r> {
    level_data: &'r LevelData,
    partition: &'r [u64],
    cell_to_children: &'r [CellId],
}

impl<'r> MultiLevelPartitionView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let level_data = region.value::<LevelData>(&format!("{name}/level_data"))?;
        let partition = region.block::<u64>(&format!("{name}/partition"))?;
        let cell_to_children = region.block::<CellId>(&format!("{name}/cell_to_children"))?;

        let levels = level_data.num_level as usize;
        if levels == 0 || levels > MAX_NUM_LEVEL + 1 {
            return Err(FacadeError::invalid(name, format!("{levels} levels")));
        }
        for lidx in 1..levels - 1 {
            let children = level_data.lidx_to_children_offsets[lidx] as usize
                + level_data.lidx_to_num_cells[lidx] as usize
                + 1;
            if children > cell_to_children.len() {
                return Err(FacadeError::invalid(
                    name,
                    format!("children of level {} exceed the table", lidx + 1),
                ));
            }
        }
        Ok(Self {
            level_data,
            partition,
            cell_to_children,
        })
    }

    /// Number of levels including level 0
    pub fn number_of_levels(&self) -> usize {
        self.level_data.num_level as usize
    }

    pub fn number_of_cells(&self, level: LevelId) -> usize {
        debug_assert!(level > 0);
        self.level_data.lidx_to_num_cells[level as usize - 1] as usize
    }

    pub fn cell(&self, level: LevelId, node: NodeId) -> CellId {
        debug_assert!(level > 0 && (level as usize) < self.number_of_levels());
        let lidx = level as usize - 1;
        ((self.partition[node as usize] & self.level_data.lidx_to_mask[lidx])
            >> self.level_data.lidx_to_offset[lidx]) as CellId
    }

    /// Highest level at which `first` and `second` sit in different cells, 0 if none
    pub fn highest_different_level(&self, first: NodeId, second: NodeId) -> LevelId {
        if self.partition[first as usize] == self.partition[second as usize] {
            return 0;
        }
        (1..self.number_of_levels() as LevelId)
            .rev()
            .find(|&level| self.cell(level, first) != self.cell(level, second))
            .unwrap_or(0)
    }

    /// Level a search may use when settling `node` between `start` and `target`
    pub fn query_level(&self, start: NodeId, target: NodeId, node: NodeId) -> LevelId {
        self.highest_different_level(start, node)
            .min(self.highest_different_level(target, node))
    }

    /// Cells of `level - 1` that make up `cell` at `level`
    pub fn children(&self, level: LevelId, cell: CellId) -> Range<CellId> {
        debug_assert!(level > 1);
        let offset = self.level_data.lidx_to_children_offsets[level as usize - 1] as usize + cell as usize;
        self.cell_to_children[offset]..self.cell_to_children[offset + 1]
    }

    pub fn number_of_nodes(&self) -> usize {
        self.partition.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    // Four nodes, level 1: {0,1} {2} {3}, level 2: {0,1,2} {3}
    fn region() -> Region {
        let level_data = LevelData::new(&[3, 2]);
        let partition: Vec<u64> = [[0, 0], [0, 0], [1, 0], [2, 1]]
            .iter()
            .map(|cells| level_data.pack(cells))
            .collect();
        let mut builder = RegionBuilder::new();
        builder.add_value("/p/level_data", &level_data).unwrap();
        builder.add("/p/partition", &partition).unwrap();
        // level 2 cell 0 -> level 1 cells 0..2, cell 1 -> 2..3
        builder.add("/p/cell_to_children", &[0u32, 2, 3]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_cells_and_levels() {
        let region = region();
        let p = MultiLevelPartitionView::load(&region, "/p").unwrap();
        assert_eq!(p.number_of_levels(), 3);
        assert_eq!(p.number_of_cells(1), 3);
        assert_eq!(p.cell(1, 2), 1);
        assert_eq!(p.cell(2, 3), 1);
        assert_eq!(p.highest_different_level(0, 1), 0);
        assert_eq!(p.highest_different_level(0, 2), 1);
        assert_eq!(p.highest_different_level(0, 3), 2);
        assert_eq!(p.query_level(0, 3, 2), 1);
        assert_eq!(p.children(2, 0), 0..2);
        assert_eq!(p.children(2, 1), 2..3);
    }

    #[test]
    fn test_record_size() {
        assert_eq!(std::mem::size_of::<LevelData>(), 280);
    }
}

//! Cell boundaries and the per-metric cost matrices between them
//!
//! A cell of level `l` has source and destination boundary nodes. Its costs
//! form a row-major `sources x destinations` matrix starting at the cell's
//! `value_offset` in each metric array.

use bytemuck::{Pod, Zeroable};
use std::iter::{Copied, StepBy};
use std::slice::Iter;

use crate::core::{CellId, EdgeDistance, EdgeDuration, EdgeWeight, FacadeError, LevelId, NodeId, Result};
use crate::storage::Region;

use super::ch::exclude_block_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CellData {
    pub value_offset: u64,
    pub source_boundary_offset: u32,
    pub destination_boundary_offset: u32,
    pub num_source_nodes: u32,
    pub num_destination_nodes: u32,
}

impl CellData {
    fn num_values(&self) -> u64 {
        self.num_source_nodes as u64 * self.num_destination_nodes as u64
    }
}

/// Cost arrays of one metric and exclude combination
#[derive(Debug, Clone, Copy)]
pub struct CellMetricView<'r> {
    pub weights: &'r [EdgeWeight],
    pub durations: &'r [EdgeDuration],
    pub distances: &'r [EdgeDistance],
}

impl<'r> CellMetricView<'r> {
    pub fn load(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self> {
        let weights = region.block::<EdgeWeight>(&exclude_block_name(region, metric, exclude_index, "weights")?)?;
        let durations = region.block::<EdgeDuration>(&exclude_block_name(region, metric, exclude_index, "durations")?)?;
        let distances = region.block::<EdgeDistance>(&exclude_block_name(region, metric, exclude_index, "distances")?)?;
        if weights.len() != durations.len() || weights.len() != distances.len() {
            return Err(FacadeError::invalid(metric, "cell metric arrays differ in length"));
        }
        Ok(Self {
            weights,
            durations,
            distances,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CellStorageView<'r> {
    source_boundary: &'r [NodeId],
    destination_boundary: &'r [NodeId],
    cells: &'r [CellData],
    /// First cell of each level (level 1 first), plus a sentinel
    level_to_cell_offset: &'r [u64],
}

impl<'r> CellStorageView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let view = Self {
            source_boundary: region.block(&format!("{name}/source_boundary"))?,
            destination_boundary: region.block(&format!("{name}/destination_boundary"))?,
            cells: region.block(&format!("{name}/cells"))?,
            level_to_cell_offset: region.block(&format!("{name}/level_to_cell_offset"))?,
        };
        let offsets_valid = view
            .level_to_cell_offset
            .last()
            .is_some_and(|&last| last as usize == view.cells.len())
            && view.level_to_cell_offset.windows(2).all(|w| w[0] <= w[1]);
        if !offsets_valid {
            return Err(FacadeError::invalid(name, "level offsets do not partition the cells"));
        }
        for (id, cell) in view.cells.iter().enumerate() {
            let sources = cell.source_boundary_offset as usize + cell.num_source_nodes as usize;
            let destinations = cell.destination_boundary_offset as usize + cell.num_destination_nodes as usize;
            if sources > view.source_boundary.len() || destinations > view.destination_boundary.len() {
                return Err(FacadeError::invalid(name, format!("cell {id} boundary out of bounds")));
            }
        }
        Ok(view)
    }

    /// Number of values a metric for this storage must provide
    pub fn number_of_values(&self) -> u64 {
        self.cells
            .iter()
            .map(|cell| cell.value_offset + cell.num_values())
            .max()
            .unwrap_or(0)
    }

    pub fn cell<'m>(&self, metric: &CellMetricView<'m>, level: LevelId, id: CellId) -> CellView<'r, 'm> {
        debug_assert!(level > 0);
        let index = self.level_to_cell_offset[level as usize - 1] as usize + id as usize;
        debug_assert!((index as u64) < self.level_to_cell_offset[level as usize]);
        let data = self.cells[index];
        CellView {
            data,
            sources: &self.source_boundary[data.source_boundary_offset as usize..][..data.num_source_nodes as usize],
            destinations: &self.destination_boundary[data.destination_boundary_offset as usize..]
                [..data.num_destination_nodes as usize],
            metric: *metric,
        }
    }
}

/// Column of a cost matrix
pub type ColumnIter<'m, T> = StepBy<Copied<Iter<'m, T>>>;

/// One cell joined with one metric
#[derive(Debug, Clone, Copy)]
pub struct CellView<'r, 'm> {
    data: CellData,
    sources: &'r [NodeId],
    destinations: &'r [NodeId],
    metric: CellMetricView<'m>,
}

impl<'r, 'm> CellView<'r, 'm> {
    pub fn source_nodes(&self) -> &'r [NodeId] {
        self.sources
    }

    pub fn destination_nodes(&self) -> &'r [NodeId] {
        self.destinations
    }

    fn values<T>(&self, all: &'m [T]) -> &'m [T] {
        let start = self.data.value_offset as usize;
        &all[start..start + self.data.num_values() as usize]
    }

    fn row<T>(&self, all: &'m [T], node: NodeId) -> Option<&'m [T]> {
        let row = self.sources.iter().position(|&n| n == node)?;
        let width = self.destinations.len();
        Some(&self.values(all)[row * width..(row + 1) * width])
    }

    fn column<T: Copy>(&self, all: &'m [T], node: NodeId) -> Option<ColumnIter<'m, T>> {
        let column = self.destinations.iter().position(|&n| n == node)?;
        let width = self.destinations.len();
        Some(self.values(all)[column..].iter().copied().step_by(width))
    }

    /// Costs from source `node` to every destination
    pub fn out_weights(&self, node: NodeId) -> Option<&'m [EdgeWeight]> {
        self.row(self.metric.weights, node)
    }

    /// Costs from every source to destination `node`
    pub fn in_weights(&self, node: NodeId) -> Option<ColumnIter<'m, EdgeWeight>> {
        self.column(self.metric.weights, node)
    }

    pub fn out_durations(&self, node: NodeId) -> Option<&'m [EdgeDuration]> {
        self.row(self.metric.durations, node)
    }

    pub fn in_durations(&self, node: NodeId) -> Option<ColumnIter<'m, EdgeDuration>> {
        self.column(self.metric.durations, node)
    }

    pub fn out_distances(&self, node: NodeId) -> Option<&'m [EdgeDistance]> {
        self.row(self.metric.distances, node)
    }

    pub fn in_distances(&self, node: NodeId) -> Option<ColumnIter<'m, EdgeDistance>> {
        self.column(self.metric.distances, node)
    }
}

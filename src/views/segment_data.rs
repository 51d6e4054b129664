//! Compressed segment geometry
//!
//! Geometry `g` owns the node span `nodes[index[g]..index[g + 1]]`. The
//! per-segment arrays are stored once, aligned with `nodes`: forward values live
//! at the segment's target position, reverse values at its source position.
//! Reverse traversal walks the same span backwards, so nothing is duplicated.

use std::iter::{Copied, Rev};
use std::ops::Range;
use std::slice::Iter;

use crate::core::{DatasourceId, FacadeError, NodeId, PackedGeometryId, Result, SegmentDuration, SegmentWeight};
use crate::storage::Region;

pub type ForwardRange<'r, T> = Copied<Iter<'r, T>>;
pub type ReverseRange<'r, T> = Rev<Copied<Iter<'r, T>>>;

#[derive(Debug, Clone, Copy)]
pub struct SegmentDataView<'r> {
    index: &'r [u32],
    nodes: &'r [NodeId],
    forward_weights: &'r [SegmentWeight],
    reverse_weights: &'r [SegmentWeight],
    forward_durations: &'r [SegmentDuration],
    reverse_durations: &'r [SegmentDuration],
    forward_data_sources: &'r [DatasourceId],
    reverse_data_sources: &'r [DatasourceId],
}

impl<'r> SegmentDataView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let view = Self {
            index: region.block(&format!("{name}/index"))?,
            nodes: region.block(&format!("{name}/nodes"))?,
            forward_weights: region.block(&format!("{name}/forward_weights"))?,
            reverse_weights: region.block(&format!("{name}/reverse_weights"))?,
            forward_durations: region.block(&format!("{name}/forward_durations"))?,
            reverse_durations: region.block(&format!("{name}/reverse_durations"))?,
            forward_data_sources: region.block(&format!("{name}/forward_data_sources"))?,
            reverse_data_sources: region.block(&format!("{name}/reverse_data_sources"))?,
        };

        let n = view.nodes.len();
        let lengths = [
            view.forward_weights.len(),
            view.reverse_weights.len(),
            view.forward_durations.len(),
            view.reverse_durations.len(),
            view.forward_data_sources.len(),
            view.reverse_data_sources.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(FacadeError::invalid(
                name,
                format!("per-segment arrays {lengths:?} disagree with {n} nodes"),
            ));
        }
        if view.index.is_empty() {
            return Err(FacadeError::invalid(name, "index has no sentinel entry"));
        }
        if view.index.windows(2).any(|w| w[0] > w[1]) || view.index[view.index.len() - 1] as usize > n {
            return Err(FacadeError::invalid(name, "geometry index is not a monotone range table"));
        }
        Ok(view)
    }

    /// Number of stored geometries
    pub fn len(&self) -> usize {
        self.index.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node ids of every stored geometry, back to back
    pub fn nodes(&self) -> &'r [NodeId] {
        self.nodes
    }

    fn span(&self, id: PackedGeometryId) -> Range<usize> {
        let id = id as usize;
        self.index[id] as usize..self.index[id + 1] as usize
    }

    /// Per-segment span: forward values skip the first node
    fn forward_span(&self, id: PackedGeometryId) -> Range<usize> {
        let span = self.span(id);
        if span.is_empty() {
            return span;
        }
        span.start + 1..span.end
    }

    /// Per-segment span: reverse values skip the last node
    fn reverse_span(&self, id: PackedGeometryId) -> Range<usize> {
        let span = self.span(id);
        if span.is_empty() {
            return span;
        }
        span.start..span.end - 1
    }

    pub fn forward_geometry(&self, id: PackedGeometryId) -> ForwardRange<'r, NodeId> {
        self.nodes[self.span(id)].iter().copied()
    }

    pub fn reverse_geometry(&self, id: PackedGeometryId) -> ReverseRange<'r, NodeId> {
        self.nodes[self.span(id)].iter().copied().rev()
    }

    pub fn forward_weights(&self, id: PackedGeometryId) -> ForwardRange<'r, SegmentWeight> {
        self.forward_weights[self.forward_span(id)].iter().copied()
    }

    pub fn reverse_weights(&self, id: PackedGeometryId) -> ReverseRange<'r, SegmentWeight> {
        self.reverse_weights[self.reverse_span(id)].iter().copied().rev()
    }

    pub fn forward_durations(&self, id: PackedGeometryId) -> ForwardRange<'r, SegmentDuration> {
        self.forward_durations[self.forward_span(id)].iter().copied()
    }

    pub fn reverse_durations(&self, id: PackedGeometryId) -> ReverseRange<'r, SegmentDuration> {
        self.reverse_durations[self.reverse_span(id)].iter().copied().rev()
    }

    pub fn forward_data_sources(&self, id: PackedGeometryId) -> ForwardRange<'r, DatasourceId> {
        self.forward_data_sources[self.forward_span(id)].iter().copied()
    }

    pub fn reverse_data_sources(&self, id: PackedGeometryId) -> ReverseRange<'r, DatasourceId> {
        self.reverse_data_sources[self.reverse_span(id)].iter().copied().rev()
    }
}

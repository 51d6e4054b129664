//! Edge-based query graphs
//!
//! Both routing algorithms read the same record layout: a node array of first
//! edge offsets (`n + 1` entries) and a flat edge array. They differ in what
//! they layer on top: an exclude filter for CH, levels, border edges and cells
//! for MLD.

pub mod cell_storage;
pub mod ch;
pub mod mld;
pub mod partition;
pub mod static_graph;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use std::ops::Range;

use crate::core::{EdgeDistance, EdgeDuration, EdgeId, EdgeWeight, NodeId};

pub use cell_storage::{CellMetricView, CellStorageView, CellView};
pub use ch::FilteredGraphView;
pub use mld::MultiLevelGraphView;
pub use partition::{LevelData, MultiLevelPartitionView};
pub use static_graph::StaticGraphView;

/// Contiguous out-edges of a node
pub type EdgeRange = Range<EdgeId>;

const SHORTCUT_BIT: u32 = 1 << 31;
const FORWARD_BIT: u32 = 1 << 31;
const BACKWARD_BIT: u32 = 1 << 30;
const DURATION_MASK: u32 = BACKWARD_BIT - 1;

/// Payload of a query graph edge
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct EdgeData {
    /// Turn id, or middle node for shortcuts; bit 31 marks a shortcut
    turn_id: u32,
    pub weight: EdgeWeight,
    /// Duration in the low 30 bits, direction flags above
    duration: u32,
    pub distance: EdgeDistance,
}

impl EdgeData {
    pub fn new(
        turn_id: u32,
        weight: EdgeWeight,
        duration: EdgeDuration,
        distance: EdgeDistance,
        forward: bool,
        backward: bool,
    ) -> Self {
        debug_assert!(turn_id < SHORTCUT_BIT);
        debug_assert!((0..=DURATION_MASK as i32).contains(&duration));
        let mut packed = duration as u32 & DURATION_MASK;
        if forward {
            packed |= FORWARD_BIT;
        }
        if backward {
            packed |= BACKWARD_BIT;
        }
        Self {
            turn_id,
            weight,
            duration: packed,
            distance,
        }
    }

    /// Marks the edge as a CH shortcut; `turn_id` then names the middle node
    pub fn into_shortcut(mut self) -> Self {
        self.turn_id |= SHORTCUT_BIT;
        self
    }

    pub fn turn_id(&self) -> u32 {
        self.turn_id & !SHORTCUT_BIT
    }

    pub fn is_shortcut(&self) -> bool {
        self.turn_id & SHORTCUT_BIT != 0
    }

    pub fn duration(&self) -> EdgeDuration {
        (self.duration & DURATION_MASK) as EdgeDuration
    }

    pub fn forward(&self) -> bool {
        self.duration & FORWARD_BIT != 0
    }

    pub fn backward(&self) -> bool {
        self.duration & BACKWARD_BIT != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct GraphEdge {
    pub target: NodeId,
    pub data: EdgeData,
}

/// Read contract shared by every query graph
pub trait GraphView {
    fn number_of_nodes(&self) -> usize;

    fn number_of_edges(&self) -> usize;

    fn out_degree(&self, node: NodeId) -> usize;

    fn adjacent_edge_range(&self, node: NodeId) -> EdgeRange;

    fn target(&self, edge: EdgeId) -> NodeId;

    fn edge_data(&self, edge: EdgeId) -> &EdgeData;

    /// Cheapest edge `from -> to`, `None` if the nodes are not adjacent
    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId>;
}

/// Serializable summary of one edge, for tooling output
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EdgeSummary {
    pub edge: EdgeId,
    pub target: NodeId,
    pub weight: EdgeWeight,
    pub duration: EdgeDuration,
    pub distance: EdgeDistance,
    pub forward: bool,
    pub backward: bool,
    pub shortcut: bool,
}

impl EdgeSummary {
    pub fn of(graph: &dyn GraphView, edge: EdgeId) -> Self {
        let data = graph.edge_data(edge);
        Self {
            edge,
            target: graph.target(edge),
            weight: data.weight,
            duration: data.duration(),
            distance: data.distance,
            forward: data.forward(),
            backward: data.backward(),
            shortcut: data.is_shortcut(),
        }
    }
}

//! Multi-level edge-based graph
//!
//! Out-edges of each node are sorted so that the edges leaving the node's cell
//! at level `l` form a suffix of its range. `node_to_edge_offset` stores, per
//! node and level, where that suffix begins relative to the node's first edge.

use crate::core::{EdgeDistance, EdgeDuration, EdgeId, EdgeWeight, FacadeError, LevelId, NodeId, Result};
use crate::storage::Region;

use super::{EdgeData, EdgeRange, GraphView, StaticGraphView};
use crate::views::BitsetView;

#[derive(Debug, Clone, Copy)]
pub struct MultiLevelGraphView<'r> {
    graph: StaticGraphView<'r>,
    node_to_edge_offset: &'r [u8],
    num_levels: usize,
    node_weights: &'r [EdgeWeight],
    node_durations: &'r [EdgeDuration],
    node_distances: &'r [EdgeDistance],
    is_forward_edge: BitsetView<'r>,
    is_backward_edge: BitsetView<'r>,
    max_border_node_id: NodeId,
}

impl<'r> MultiLevelGraphView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let graph = StaticGraphView::load(region, name)?;
        let nodes = graph.number_of_nodes();
        let edges = graph.number_of_edges();

        let node_to_edge_offset = region.block::<u8>(&format!("{name}/node_to_edge_offset"))?;
        let num_levels = match nodes {
            0 => 0,
            n if node_to_edge_offset.len() % n == 0 => node_to_edge_offset.len() / n,
            _ => {
                return Err(FacadeError::invalid(
                    name,
                    format!("{} level offsets for {nodes} nodes", node_to_edge_offset.len()),
                ))
            }
        };

        let view = Self {
            graph,
            node_to_edge_offset,
            num_levels,
            node_weights: region.block(&format!("{name}/node_weights"))?,
            node_durations: region.block(&format!("{name}/node_durations"))?,
            node_distances: region.block(&format!("{name}/node_distances"))?,
            is_forward_edge: BitsetView::load(region, &format!("{name}/is_forward_edge"), edges)?,
            is_backward_edge: BitsetView::load(region, &format!("{name}/is_backward_edge"), edges)?,
            max_border_node_id: *region.value::<NodeId>(&format!("{name}/max_border_node_id"))?,
        };

        if [view.node_weights.len(), view.node_durations.len(), view.node_distances.len()]
            .iter()
            .any(|&len| len != nodes)
        {
            return Err(FacadeError::invalid(name, "node cost arrays disagree with node count"));
        }
        for node in 0..nodes as NodeId {
            let degree = view.graph.out_degree(node);
            let offsets = view.level_offsets(node);
            if offsets.windows(2).any(|w| w[0] > w[1]) || offsets.iter().any(|&o| o as usize > degree) {
                return Err(FacadeError::invalid(
                    name,
                    format!("border offsets of node {node} are not a nested suffix chain"),
                ));
            }
        }
        Ok(view)
    }

    fn level_offsets(&self, node: NodeId) -> &'r [u8] {
        let start = node as usize * self.num_levels;
        &self.node_to_edge_offset[start..start + self.num_levels]
    }

    /// Out-edges of `node` that leave its cell at `level`
    pub fn border_edge_range(&self, level: LevelId, node: NodeId) -> EdgeRange {
        let range = self.graph.adjacent_edge_range(node);
        let offset = self.level_offsets(node)[level as usize] as EdgeId;
        range.start + offset..range.end
    }

    pub fn number_of_levels(&self) -> usize {
        self.num_levels
    }

    pub fn max_border_node_id(&self) -> NodeId {
        self.max_border_node_id
    }

    /// Border nodes are numbered first
    pub fn is_border_node(&self, node: NodeId) -> bool {
        node <= self.max_border_node_id
    }

    /// Highest level at which `node` still has border edges
    pub fn node_level(&self, node: NodeId) -> LevelId {
        (0..self.num_levels)
            .rev()
            .find(|&level| !self.border_edge_range(level as LevelId, node).is_empty())
            .unwrap_or(0) as LevelId
    }

    pub fn node_weight(&self, node: NodeId) -> EdgeWeight {
        self.node_weights[node as usize]
    }

    pub fn node_duration(&self, node: NodeId) -> EdgeDuration {
        self.node_durations[node as usize]
    }

    pub fn node_distance(&self, node: NodeId) -> EdgeDistance {
        self.node_distances[node as usize]
    }

    pub fn is_forward_edge(&self, edge: EdgeId) -> bool {
        self.is_forward_edge.get(edge as usize)
    }

    pub fn is_backward_edge(&self, edge: EdgeId) -> bool {
        self.is_backward_edge.get(edge as usize)
    }
}

impl GraphView for MultiLevelGraphView<'_> {
    fn number_of_nodes(&self) -> usize {
        self.graph.number_of_nodes()
    }

    fn number_of_edges(&self) -> usize {
        self.graph.number_of_edges()
    }

    fn out_degree(&self, node: NodeId) -> usize {
        self.graph.out_degree(node)
    }

    fn adjacent_edge_range(&self, node: NodeId) -> EdgeRange {
        self.graph.adjacent_edge_range(node)
    }

    fn target(&self, edge: EdgeId) -> NodeId {
        self.graph.target(edge)
    }

    fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        self.graph.edge_data(edge)
    }

    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graph.find_edge(from, to)
    }
}

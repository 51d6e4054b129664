//! Plain adjacency-array graph over region blocks

use crate::core::{EdgeId, FacadeError, NodeId, Result, INVALID_EDGE_WEIGHT};
use crate::storage::Region;

use super::{EdgeData, EdgeRange, GraphEdge, GraphView};

#[derive(Debug, Clone, Copy)]
pub struct StaticGraphView<'r> {
    /// First edge of each node, plus a sentinel equal to the edge count
    node_array: &'r [u32],
    edge_array: &'r [GraphEdge],
}

impl<'r> StaticGraphView<'r> {
    /// Views `{prefix}/node_array` and `{prefix}/edge_array`
    pub fn load(region: &'r Region, prefix: &str) -> Result<Self> {
        let node_array = region.block::<u32>(&format!("{prefix}/node_array"))?;
        let edge_array = region.block::<GraphEdge>(&format!("{prefix}/edge_array"))?;

        let Some((&first, &last)) = node_array.first().zip(node_array.last()) else {
            return Err(FacadeError::invalid(prefix, "node array has no sentinel entry"));
        };
        if first != 0 || last as usize != edge_array.len() || node_array.windows(2).any(|w| w[0] > w[1]) {
            return Err(FacadeError::invalid(
                prefix,
                "node array does not partition the edge array",
            ));
        }
        let nodes = node_array.len() - 1;
        if let Some(edge) = edge_array.iter().position(|e| e.target as usize >= nodes) {
            return Err(FacadeError::invalid(
                prefix,
                format!("edge {edge} targets node {} of {nodes}", edge_array[edge].target),
            ));
        }
        Ok(Self {
            node_array,
            edge_array,
        })
    }

    /// Node whose out-edge range contains `edge`
    pub fn edge_source(&self, edge: EdgeId) -> NodeId {
        debug_assert!((edge as usize) < self.edge_array.len());
        (self.node_array.partition_point(|&first| first <= edge) - 1) as NodeId
    }

    /// Cheapest edge `from -> to` accepted by `filter`
    pub fn find_smallest_edge_by(
        &self,
        from: NodeId,
        to: NodeId,
        mut filter: impl FnMut(EdgeId, &EdgeData) -> bool,
    ) -> Option<EdgeId> {
        let mut smallest = None;
        let mut smallest_weight = INVALID_EDGE_WEIGHT;
        for edge in self.adjacent_edge_range(from) {
            let entry = &self.edge_array[edge as usize];
            if entry.target == to && entry.data.weight < smallest_weight && filter(edge, &entry.data) {
                smallest = Some(edge);
                smallest_weight = entry.data.weight;
            }
        }
        smallest
    }
}

impl GraphView for StaticGraphView<'_> {
    fn number_of_nodes(&self) -> usize {
        self.node_array.len() - 1
    }

    fn number_of_edges(&self) -> usize {
        self.edge_array.len()
    }

    fn out_degree(&self, node: NodeId) -> usize {
        self.adjacent_edge_range(node).len()
    }

    fn adjacent_edge_range(&self, node: NodeId) -> EdgeRange {
        let node = node as usize;
        self.node_array[node]..self.node_array[node + 1]
    }

    fn target(&self, edge: EdgeId) -> NodeId {
        self.edge_array[edge as usize].target
    }

    fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        &self.edge_array[edge as usize].data
    }

    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.find_smallest_edge_by(from, to, |_, _| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    fn edge(target: NodeId, weight: i32) -> GraphEdge {
        GraphEdge {
            target,
            data: EdgeData::new(0, weight, weight, 0.0, true, false),
        }
    }

    fn region() -> Region {
        // 0 -> 1 (w 5), 0 -> 1 (w 3), 0 -> 2, node 1 has no edges, 2 -> 0
        let mut builder = RegionBuilder::new();
        builder.add("/g/node_array", &[0u32, 3, 3, 4]).unwrap();
        builder
            .add("/g/edge_array", &[edge(1, 5), edge(1, 3), edge(2, 1), edge(0, 2)])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_adjacency() {
        let region = region();
        let graph = StaticGraphView::load(&region, "/g").unwrap();
        assert_eq!(graph.number_of_nodes(), 3);
        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(graph.adjacent_edge_range(0), 0..3);
        assert_eq!(graph.out_degree(1), 0);
        assert_eq!(graph.target(3), 0);
        assert_eq!(graph.edge_source(2), 0);
        assert_eq!(graph.edge_source(3), 2);
    }

    #[test]
    fn test_find_edge_prefers_cheapest_parallel_edge() {
        let region = region();
        let graph = StaticGraphView::load(&region, "/g").unwrap();
        assert_eq!(graph.find_edge(0, 1), Some(1));
        assert_eq!(graph.find_edge(1, 0), None);
        assert_eq!(graph.find_smallest_edge_by(0, 1, |e, _| e != 1), Some(0));
    }

    #[test]
    fn test_dangling_target_rejected() {
        let mut builder = RegionBuilder::new();
        builder.add("/g/node_array", &[0u32, 1]).unwrap();
        builder.add("/g/edge_array", &[edge(4, 1)]).unwrap();
        let region = builder.build().unwrap();
        assert!(matches!(
            StaticGraphView::load(&region, "/g"),
            Err(FacadeError::InvalidDataset { .. })
        ));
    }
}

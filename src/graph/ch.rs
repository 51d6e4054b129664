//! Contracted graph with a per-profile exclude filter
//!
//! Topology accessors return the stored graph unaltered. Edge lookups only
//! consider edges the selected exclude filter keeps.

use crate::core::{EdgeId, FacadeError, NodeId, Result};
use crate::storage::Region;

use super::{EdgeData, EdgeRange, GraphView, StaticGraphView};
use crate::views::BitsetView;

/// Number of `{metric}/exclude/<i>/{leaf}` blocks
pub(crate) fn exclude_count(region: &Region, metric: &str, leaf: &str) -> usize {
    let prefix = format!("{metric}/exclude/");
    let suffix = format!("/{leaf}");
    region
        .index()
        .list(&prefix)
        .filter(|(name, _)| name.ends_with(&suffix))
        .count()
}

/// Resolves `{metric}/exclude/{index}/{leaf}`, distinguishing an unknown
/// metric from an exclude index the metric does not provide
pub(crate) fn exclude_block_name(region: &Region, metric: &str, exclude_index: usize, leaf: &str) -> Result<String> {
    let name = format!("{metric}/exclude/{exclude_index}/{leaf}");
    if region.exists(&name) {
        return Ok(name);
    }
    if !region.exists(metric) {
        return Err(FacadeError::DatasetNotFound(metric.to_string()));
    }
    Err(FacadeError::ExcludeIndexOutOfRange {
        index: exclude_index,
        available: exclude_count(region, metric, leaf),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct FilteredGraphView<'r> {
    graph: StaticGraphView<'r>,
    edge_filter: BitsetView<'r>,
}

impl<'r> FilteredGraphView<'r> {
    /// Views `{metric}/contracted_graph` filtered by exclude combination `exclude_index`
    pub fn load(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self> {
        let filter_name = exclude_block_name(region, metric, exclude_index, "edge_filter")?;
        let graph = StaticGraphView::load(region, &format!("{metric}/contracted_graph"))?;
        let edge_filter = BitsetView::load(region, &filter_name, graph.number_of_edges())?;
        Ok(Self { graph, edge_filter })
    }

    pub fn is_edge_enabled(&self, edge: EdgeId) -> bool {
        self.edge_filter.get(edge as usize)
    }

    /// Out-edges of `node` the exclude filter keeps
    pub fn enabled_adjacent_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph
            .adjacent_edge_range(node)
            .filter(move |&edge| self.is_edge_enabled(edge))
    }

    pub fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.graph.edge_source(edge)
    }

    pub fn find_edge_in_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.find_edge(from, to).or_else(|| self.find_edge(to, from))
    }

    /// Like [`Self::find_edge_in_either_direction`]; the flag is set when the
    /// edge found runs `to -> from`
    pub fn find_edge_indicate_if_reverse(&self, from: NodeId, to: NodeId) -> Option<(EdgeId, bool)> {
        if let Some(edge) = self.find_edge(from, to) {
            return Some((edge, false));
        }
        self.find_edge(to, from).map(|edge| (edge, true))
    }

    /// Cheapest enabled edge `from -> to` whose data satisfies `filter`
    pub fn find_smallest_edge(
        &self,
        from: NodeId,
        to: NodeId,
        filter: impl Fn(&EdgeData) -> bool,
    ) -> Option<EdgeId> {
        self.graph
            .find_smallest_edge_by(from, to, |edge, data| self.is_edge_enabled(edge) && filter(data))
    }
}

impl GraphView for FilteredGraphView<'_> {
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
        self.graph
            .find_smallest_edge_by(from, to, |edge, _| self.is_edge_enabled(edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEdge;
    use crate::storage::RegionBuilder;
    use crate::views::pack_bits;

    fn edge(target: NodeId, weight: i32, forward: bool) -> GraphEdge {
        GraphEdge {
            target,
            data: EdgeData::new(0, weight, weight, 0.0, forward, !forward),
        }
    }

    fn region() -> Region {
        // 0 -> 1 twice (w 4 and w 2), 1 -> 2, 2 -> 0
        let edges = [edge(1, 4, true), edge(1, 2, false), edge(2, 1, true), edge(0, 6, true)];
        let mut builder = RegionBuilder::new();
        builder.add("/ch/metrics/duration/contracted_graph/node_array", &[0u32, 2, 3, 4]).unwrap();
        builder.add("/ch/metrics/duration/contracted_graph/edge_array", &edges).unwrap();
        builder
            .add("/ch/metrics/duration/exclude/0/edge_filter", &pack_bits([true; 4]))
            .unwrap();
        builder
            .add("/ch/metrics/duration/exclude/1/edge_filter", &pack_bits([true, false, true, false]))
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_find_edge_respects_filter() {
        let region = region();
        let all = FilteredGraphView::load(&region, "/ch/metrics/duration", 0).unwrap();
        let filtered = FilteredGraphView::load(&region, "/ch/metrics/duration", 1).unwrap();

        assert_eq!(all.find_edge(0, 1), Some(1));
        assert_eq!(filtered.find_edge(0, 1), Some(0));
        assert_eq!(filtered.find_edge(2, 0), None);

        // Topology is unaltered
        assert_eq!(filtered.out_degree(0), 2);
        assert_eq!(filtered.enabled_adjacent_edges(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_either_direction() {
        let region = region();
        let graph = FilteredGraphView::load(&region, "/ch/metrics/duration", 0).unwrap();
        assert_eq!(graph.find_edge_in_either_direction(0, 2), Some(3));
        assert_eq!(graph.find_edge_indicate_if_reverse(0, 2), Some((3, true)));
        assert_eq!(graph.find_edge_indicate_if_reverse(2, 0), Some((3, false)));
        assert_eq!(graph.find_edge_indicate_if_reverse(1, 1), None);
        assert_eq!(graph.find_smallest_edge(0, 1, |data| data.forward()), Some(0));
        assert_eq!(graph.edge_source(2), 1);
    }

    #[test]
    fn test_unknown_exclude_index() {
        let region = region();
        let err = FilteredGraphView::load(&region, "/ch/metrics/duration", 5).unwrap_err();
        assert!(matches!(err, FacadeError::ExcludeIndexOutOfRange { index: 5, available: 2 }));
        let err = FilteredGraphView::load(&region, "/ch/metrics/distance", 0).unwrap_err();
        assert!(matches!(err, FacadeError::DatasetNotFound(_)));
    }
}

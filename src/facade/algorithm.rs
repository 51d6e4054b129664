//! Algorithm-specific halves of a facade
//!
//! CH sees one contracted graph filtered per exclude combination. MLD sees the
//! partitioned graph plus cell storage and the cell costs of one metric.

use tracing::debug;

use crate::core::{Algorithm, CellId, EdgeId, FacadeError, LevelId, NodeId, Result};
use crate::graph::{
    CellMetricView, CellStorageView, CellView, EdgeData, EdgeRange, FilteredGraphView, GraphView,
    MultiLevelGraphView, MultiLevelPartitionView,
};
use crate::storage::Region;

use super::datasets;

/// Graph half of a facade, loaded for one metric and exclude combination
pub trait AlgorithmFacade<'r>: GraphView + Sized {
    const ALGORITHM: Algorithm;

    fn load(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self>;
}

/// Forwards the [`GraphView`] contract to a wrapped graph field
macro_rules! delegate_graph_view {
    ($facade:ident, $field:ident) => {
        impl GraphView for $facade<'_> {
            fn number_of_nodes(&self) -> usize {
                self.$field.number_of_nodes()
            }

            fn number_of_edges(&self) -> usize {
                self.$field.number_of_edges()
            }

            fn out_degree(&self, node: NodeId) -> usize {
                self.$field.out_degree(node)
            }

            fn adjacent_edge_range(&self, node: NodeId) -> EdgeRange {
                self.$field.adjacent_edge_range(node)
            }

            fn target(&self, edge: EdgeId) -> NodeId {
                self.$field.target(edge)
            }

            fn edge_data(&self, edge: EdgeId) -> &EdgeData {
                self.$field.edge_data(edge)
            }

            fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
                self.$field.find_edge(from, to)
            }
        }
    };
}

#[derive(Debug, Clone, Copy)]
pub struct ChFacade<'r> {
    graph: FilteredGraphView<'r>,
}

impl<'r> ChFacade<'r> {
    pub fn graph(&self) -> &FilteredGraphView<'r> {
        &self.graph
    }

    pub fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.graph.edge_source(edge)
    }

    pub fn is_edge_enabled(&self, edge: EdgeId) -> bool {
        self.graph.is_edge_enabled(edge)
    }

    pub fn find_edge_in_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.graph.find_edge_in_either_direction(from, to)
    }

    pub fn find_edge_indicate_if_reverse(&self, from: NodeId, to: NodeId) -> Option<(EdgeId, bool)> {
        self.graph.find_edge_indicate_if_reverse(from, to)
    }

    pub fn find_smallest_edge(&self, from: NodeId, to: NodeId, filter: impl Fn(&EdgeData) -> bool) -> Option<EdgeId> {
        self.graph.find_smallest_edge(from, to, filter)
    }
}

impl<'r> AlgorithmFacade<'r> for ChFacade<'r> {
    const ALGORITHM: Algorithm = Algorithm::Ch;

    fn load(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self> {
        let prefix = datasets::ch_metric(metric);
        let graph = FilteredGraphView::load(region, &prefix, exclude_index)?;
        debug!(dataset = %prefix, nodes = graph.number_of_nodes(), edges = graph.number_of_edges(), "resolved");
        Ok(Self { graph })
    }
}

delegate_graph_view!(ChFacade, graph);

#[derive(Debug, Clone, Copy)]
pub struct MldFacade<'r> {
    partition: MultiLevelPartitionView<'r>,
    cell_storage: CellStorageView<'r>,
    cell_metric: CellMetricView<'r>,
    graph: MultiLevelGraphView<'r>,
}

impl<'r> MldFacade<'r> {
    pub fn graph(&self) -> &MultiLevelGraphView<'r> {
        &self.graph
    }

    pub fn partition(&self) -> &MultiLevelPartitionView<'r> {
        &self.partition
    }

    pub fn cell_storage(&self) -> &CellStorageView<'r> {
        &self.cell_storage
    }

    pub fn cell_metric(&self) -> &CellMetricView<'r> {
        &self.cell_metric
    }

    /// Cell `id` of `level` with this facade's metric costs
    pub fn cell(&self, level: LevelId, id: CellId) -> CellView<'r, 'r> {
        self.cell_storage.cell(&self.cell_metric, level, id)
    }

    pub fn border_edge_range(&self, level: LevelId, node: NodeId) -> EdgeRange {
        self.graph.border_edge_range(level, node)
    }
}

impl<'r> AlgorithmFacade<'r> for MldFacade<'r> {
    const ALGORITHM: Algorithm = Algorithm::Mld;

    fn load(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self> {
        let partition = MultiLevelPartitionView::load(region, datasets::MLD_PARTITION)?;
        debug!(dataset = datasets::MLD_PARTITION, levels = partition.number_of_levels(), "resolved");
        let cell_storage = CellStorageView::load(region, datasets::MLD_CELL_STORAGE)?;
        debug!(dataset = datasets::MLD_CELL_STORAGE, "resolved");
        let prefix = datasets::mld_metric(metric);
        let cell_metric = CellMetricView::load(region, &prefix, exclude_index)?;
        debug!(dataset = %prefix, values = cell_metric.weights.len(), "resolved");
        let graph = MultiLevelGraphView::load(region, datasets::MLD_GRAPH)?;
        debug!(dataset = datasets::MLD_GRAPH, nodes = graph.number_of_nodes(), "resolved");

        if (cell_metric.weights.len() as u64) < cell_storage.number_of_values() {
            return Err(FacadeError::invalid(
                prefix,
                format!(
                    "{} cell values, storage needs {}",
                    cell_metric.weights.len(),
                    cell_storage.number_of_values()
                ),
            ));
        }
        if partition.number_of_nodes() != graph.number_of_nodes() {
            return Err(FacadeError::invalid(
                datasets::MLD_PARTITION,
                format!(
                    "partition covers {} nodes, graph has {}",
                    partition.number_of_nodes(),
                    graph.number_of_nodes()
                ),
            ));
        }

        Ok(Self {
            partition,
            cell_storage,
            cell_metric,
            graph,
        })
    }
}

delegate_graph_view!(MldFacade, graph);

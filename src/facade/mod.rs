//! The routing data facade
//!
//! A facade joins the attribute facade with one algorithm's graph as two
//! sibling fields. It is built all at once from a validated region, holds
//! nothing but borrowed views, and is therefore `Send + Sync` and safe to
//! share between query threads for as long as the region lives.

pub mod algorithm;
pub mod base;
pub mod datasets;

use tracing::info;

use crate::core::{Algorithm, EdgeId, NodeId, Result};
use crate::graph::{EdgeData, EdgeRange, GraphView};
use crate::storage::Region;

pub use algorithm::{AlgorithmFacade, ChFacade, MldFacade};
pub use base::BaseFacade;

#[derive(Debug, Clone, Copy)]
pub struct RoutingDataFacade<'r, A> {
    base: BaseFacade<'r>,
    algorithm: A,
    exclude_index: usize,
}

pub type ChDataFacade<'r> = RoutingDataFacade<'r, ChFacade<'r>>;
pub type MldDataFacade<'r> = RoutingDataFacade<'r, MldFacade<'r>>;

impl<'r, A: AlgorithmFacade<'r>> RoutingDataFacade<'r, A> {
    /// Builds a facade over `region` for `metric` and profile exclude combination `exclude_index`
    pub fn new(region: &'r Region, metric: &str, exclude_index: usize) -> Result<Self> {
        let base = BaseFacade::load(region, exclude_index)?;
        let algorithm = A::load(region, metric, exclude_index)?;
        info!(
            algorithm = %A::ALGORITHM,
            metric,
            exclude_index,
            nodes = algorithm.number_of_nodes(),
            edges = algorithm.number_of_edges(),
            checksum = base.checksum(),
            "data facade ready"
        );
        Ok(Self {
            base,
            algorithm,
            exclude_index,
        })
    }

    pub fn attributes(&self) -> &BaseFacade<'r> {
        &self.base
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn exclude_index(&self) -> usize {
        self.exclude_index
    }
}

impl<A: GraphView> GraphView for RoutingDataFacade<'_, A> {
    fn number_of_nodes(&self) -> usize {
        self.algorithm.number_of_nodes()
    }

    fn number_of_edges(&self) -> usize {
        self.algorithm.number_of_edges()
    }

    fn out_degree(&self, node: NodeId) -> usize {
        self.algorithm.out_degree(node)
    }

    fn adjacent_edge_range(&self, node: NodeId) -> EdgeRange {
        self.algorithm.adjacent_edge_range(node)
    }

    fn target(&self, edge: EdgeId) -> NodeId {
        self.algorithm.target(edge)
    }

    fn edge_data(&self, edge: EdgeId) -> &EdgeData {
        self.algorithm.edge_data(edge)
    }

    fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.algorithm.find_edge(from, to)
    }
}

/// A facade whose algorithm is chosen at runtime
#[derive(Debug, Clone, Copy)]
pub enum AnyFacade<'r> {
    Ch(ChDataFacade<'r>),
    Mld(MldDataFacade<'r>),
}

impl<'r> AnyFacade<'r> {
    pub fn new(region: &'r Region, algorithm: Algorithm, metric: &str, exclude_index: usize) -> Result<Self> {
        Ok(match algorithm {
            Algorithm::Ch => AnyFacade::Ch(RoutingDataFacade::new(region, metric, exclude_index)?),
            Algorithm::Mld => AnyFacade::Mld(RoutingDataFacade::new(region, metric, exclude_index)?),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            AnyFacade::Ch(_) => Algorithm::Ch,
            AnyFacade::Mld(_) => Algorithm::Mld,
        }
    }

    pub fn attributes(&self) -> &BaseFacade<'r> {
        match self {
            AnyFacade::Ch(facade) => facade.attributes(),
            AnyFacade::Mld(facade) => facade.attributes(),
        }
    }

    pub fn graph(&self) -> &dyn GraphView {
        match self {
            AnyFacade::Ch(facade) => facade,
            AnyFacade::Mld(facade) => facade,
        }
    }
}

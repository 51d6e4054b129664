//! JSON reports printed by the subcommands

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use butterfly_facade::graph::EdgeSummary;
use butterfly_facade::{BaseFacade, GraphView, Region};

#[derive(Debug, Serialize)]
pub struct DatasetRow {
    pub name: String,
    pub count: u64,
    pub elem_size: u32,
    pub bytes: u64,
}

/// What `inspect` prints about a region
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub mapped: bool,
    pub body_bytes: usize,
    pub checksum: u32,
    pub timestamp: String,
    pub optional_datasets: BTreeMap<&'static str, bool>,
    pub datasets: Vec<DatasetRow>,
}

impl InspectReport {
    pub fn new(region: &Region, attributes: &BaseFacade<'_>) -> Self {
        let datasets = region
            .index()
            .iter()
            .map(|(name, entry)| DatasetRow {
                name: name.to_string(),
                count: entry.count,
                elem_size: entry.elem_size,
                bytes: entry.byte_len(),
            })
            .collect();
        Self {
            mapped: region.is_mapped(),
            body_bytes: region.body_len(),
            checksum: attributes.checksum(),
            timestamp: attributes.timestamp().to_string(),
            optional_datasets: attributes.optional_datasets().into_iter().collect(),
            datasets,
        }
    }
}

/// Out-edges of one node, as `edges` prints them
#[derive(Debug, Serialize)]
pub struct NodeEdges {
    pub node: u32,
    pub out_degree: usize,
    pub edges: Vec<EdgeSummary>,
}

impl NodeEdges {
    pub fn new(graph: &dyn GraphView, node: u32) -> Self {
        Self {
            node,
            out_degree: graph.out_degree(node),
            edges: graph
                .adjacent_edge_range(node)
                .map(|edge| EdgeSummary::of(graph, edge))
                .collect(),
        }
    }
}

/// Pretty-prints `value` as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

//! Synthetic network shared by the integration tests
//!
//! Node-based nodes (lon, lat):
//!
//! ```text
//! n1 (0,1) ---- n4 (0.2,1) ---- n5 (0.4,1)      n3 (1,1)
//!  |                                              ^
//!  |  geometry 0 (two-way)                        | geometry 1 (one-way, toll)
//!  |                                              |
//! n0 (0,0)                                      n2 (1,0)
//! ```
//!
//! Geometry 2 runs n1 -> n4 -> n5 (two-way, ferry). Edge-based nodes: 0/1 are
//! geometry 0 forward/reverse, 2 is geometry 1, 3/4 are geometry 2
//! forward/reverse. Turns: 0 = 0 -> 3, 1 = 4 -> 1, 2 and 3 are u-turns.

#![allow(dead_code)]

use butterfly_facade::core::{
    ComponentId, GeometryId, SegmentId, INVALID_LANE_DATAID, INVALID_LANE_DESCRIPTIONID, INVALID_NAMEID,
};
use butterfly_facade::graph::cell_storage::CellData;
use butterfly_facade::graph::{EdgeData, GraphEdge, LevelData};
use butterfly_facade::spatial::{EdgeBasedNodeSegment, PackedRTree};
use butterfly_facade::views::{
    pack_bits, pack_names, pack_overrides, Datasources, EdgeBasedNode, EntryClass, LaneTupleIdPair,
    ManeuverOverride, NodeBasedEdgeAnnotation, ProfileProperties, TurnBearing, TurnInstruction,
};
use butterfly_facade::{Coordinate, Region, RegionBuilder};

pub const CH_CHECKSUM: u32 = 0x00C0_FFEE;
pub const MLD_CHECKSUM: u32 = 0xBEEF;
pub const TIMESTAMP: &str = "2024-06-01T00:00:00Z";

/// A cross-table id written one past the end of the table it points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dangling {
    GeometryNode,
    LaneDataId,
    LaneDescriptionId,
    EntryClassId,
}

/// Which parts of the network to write
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub optional_datasets: bool,
    pub ch: bool,
    pub mld: bool,
    pub dangling: Option<Dangling>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            optional_datasets: true,
            ch: true,
            mld: true,
            dangling: None,
        }
    }
}

pub fn coordinates() -> Vec<Coordinate> {
    [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0), (0.2, 1.0), (0.4, 1.0)]
        .into_iter()
        .map(|(lon, lat)| Coordinate::from_degrees(lon, lat))
        .collect()
}

fn segment(id: u32) -> SegmentId {
    SegmentId { id, enabled: true }
}

fn add_common(builder: &mut RegionBuilder, options: Options) {
    let dangling = |what: Dangling| options.dangling == Some(what);
    let mut properties = ProfileProperties::new("routability", 1);
    properties.excludable_classes[1] = 0b01;
    properties.excludable_classes[2] = 0b11;
    properties.set_class_name(0, "toll");
    properties.set_class_name(1, "ferry");
    builder.add_value("/common/properties", &properties).unwrap();
    builder.add_str("/common/timestamp", TIMESTAMP).unwrap();
    builder
        .add_value(
            "/common/data_sources_names",
            &Datasources::new(["lua profile", "traffic.csv"]),
        )
        .unwrap();

    let coordinates = coordinates();
    builder.add("/common/nbn_data/coordinates", &coordinates).unwrap();
    builder
        .add("/common/nbn_data/osm_node_ids", &[1001u64, 1002, 1003, 1004, 1005, 1006])
        .unwrap();

    let big = ComponentId { id: 0, is_tiny: false };
    let tiny = ComponentId { id: 1, is_tiny: true };
    let forward = |id| GeometryId { id, forward: true };
    let reverse = |id| GeometryId { id, forward: false };
    let nodes = [
        EdgeBasedNode::new(forward(0), big, 0),
        EdgeBasedNode::new(reverse(0), big, 0),
        EdgeBasedNode::new(forward(1), tiny, 2),
        EdgeBasedNode::new(forward(2), big, 1),
        EdgeBasedNode::new(reverse(2), big, 1),
    ];
    let annotations = [
        NodeBasedEdgeAnnotation {
            name_id: 0,
            ..NodeBasedEdgeAnnotation::default()
        },
        NodeBasedEdgeAnnotation {
            name_id: 1,
            lane_description_id: 0,
            classes: 0b10,
            travel_mode: 2,
            ..NodeBasedEdgeAnnotation::default()
        },
        NodeBasedEdgeAnnotation {
            name_id: INVALID_NAMEID,
            lane_description_id: INVALID_LANE_DESCRIPTIONID,
            classes: 0b01,
            ..NodeBasedEdgeAnnotation::default()
        },
    ];
    builder.add("/common/ebg_node_data/nodes", &nodes).unwrap();
    builder.add("/common/ebg_node_data/annotations", &annotations).unwrap();

    // Forward values sit at the target node of a segment, reverse values at its source
    builder.add("/common/segment_data/index", &[0u32, 2, 4, 7]).unwrap();
    let last_node = if dangling(Dangling::GeometryNode) { 6u32 } else { 5 };
    builder
        .add("/common/segment_data/nodes", &[0u32, 1, 2, 3, 1, 4, last_node])
        .unwrap();
    builder
        .add("/common/segment_data/forward_weights", &[0u32, 100, 0, 150, 0, 20, 30])
        .unwrap();
    builder
        .add("/common/segment_data/reverse_weights", &[101u32, 0, 0, 0, 21, 31, 0])
        .unwrap();
    builder
        .add("/common/segment_data/forward_durations", &[0u32, 1000, 0, 1500, 0, 200, 300])
        .unwrap();
    builder
        .add("/common/segment_data/reverse_durations", &[1010u32, 0, 0, 0, 210, 310, 0])
        .unwrap();
    builder
        .add("/common/segment_data/forward_data_sources", &[0u8, 0, 0, 1, 0, 1, 1])
        .unwrap();
    builder
        .add("/common/segment_data/reverse_data_sources", &[1u8, 0, 0, 0, 0, 1, 0])
        .unwrap();

    let segments = [
        EdgeBasedNodeSegment::new(segment(0), segment(1), 0, 1, 0),
        EdgeBasedNodeSegment::new(segment(2), SegmentId::INVALID, 2, 3, 0),
        EdgeBasedNodeSegment::new(segment(3), segment(4), 1, 4, 0),
        EdgeBasedNodeSegment::new(segment(3), segment(4), 4, 5, 1),
    ];
    PackedRTree::build(&segments, &coordinates)
        .unwrap()
        .add_to(builder, "/common/rtree")
        .unwrap();

    builder.add("/common/turn_penalty/weight", &[5i16, 7, 200, 200]).unwrap();
    builder.add("/common/turn_penalty/duration", &[50i16, 70, 2000, 2000]).unwrap();

    let (overrides, sequences) = pack_overrides(vec![
        (3, maneuver_override(vec![3, 4], 3, 1)),
        (0, maneuver_override(vec![0, 3], 3, 2)),
        (0, maneuver_override(vec![0, 3, 4], 4, 3)),
    ]);
    builder.add("/common/maneuver_overrides/overrides", &overrides).unwrap();
    builder
        .add("/common/maneuver_overrides/node_sequences", &sequences)
        .unwrap();

    if options.optional_datasets {
        add_optional(builder, options);
    }
}

pub fn maneuver_override(node_sequence: Vec<u32>, instruction_node: u32, override_type: u8) -> ManeuverOverride {
    ManeuverOverride {
        node_sequence,
        instruction_node,
        override_type,
        direction: 0,
    }
}

fn add_optional(builder: &mut RegionBuilder, options: Options) {
    let dangling = |what: Dangling| options.dangling == Some(what);
    let instruction = |turn_type, direction_modifier| TurnInstruction {
        turn_type,
        direction_modifier,
    };
    builder
        .add(
            "/common/turn_data/turn_instructions",
            &[instruction(1, 2), instruction(3, 4), instruction(5, 0), instruction(5, 0)],
        )
        .unwrap();
    builder
        .add(
            "/common/turn_data/lane_data_ids",
            &[
                if dangling(Dangling::LaneDataId) { 1u16 } else { 0 },
                INVALID_LANE_DATAID,
                INVALID_LANE_DATAID,
                INVALID_LANE_DATAID,
            ],
        )
        .unwrap();
    let entry_class = if dangling(Dangling::EntryClassId) { 2u16 } else { 1 };
    builder
        .add("/common/turn_data/entry_class_ids", &[0u16, entry_class, 0, 0])
        .unwrap();
    let bearings = |degrees: [f64; 4]| degrees.map(TurnBearing::from_degrees);
    builder
        .add("/common/turn_data/pre_turn_bearings", &bearings([0.0, 270.0, 90.0, 180.0]))
        .unwrap();
    builder
        .add("/common/turn_data/post_turn_bearings", &bearings([90.0, 180.0, 270.0, 0.0]))
        .unwrap();

    let (offsets, values) = pack_names([
        ["Main Street", "Brussels", "meyn street", "N1", "1"],
        ["Ferry Lane", "", "", "F2", ""],
    ]);
    builder.add("/common/names/offsets", &offsets).unwrap();
    builder.add_str("/common/names/values", &values).unwrap();

    builder.add("/common/turn_lanes/offsets", &[0u32, 2, 5]).unwrap();
    builder.add("/common/turn_lanes/masks", &[1u16, 2, 4, 4, 8]).unwrap();
    builder
        .add(
            "/common/turn_lanes/data",
            &[LaneTupleIdPair {
                lanes_in_turn: 1,
                first_lane_from_the_right: 0,
                lane_description_id: if dangling(Dangling::LaneDescriptionId) { 2 } else { 0 },
            }],
        )
        .unwrap();

    builder
        .add("/common/intersection_bearings/node_to_class_id", &[0u32, 1, 0, 0, 1, 0])
        .unwrap();
    builder
        .add("/common/intersection_bearings/class_offsets", &[0u32, 1, 3])
        .unwrap();
    builder
        .add("/common/intersection_bearings/values", &[0u16, 90, 270])
        .unwrap();
    builder
        .add("/common/entry_classes", &[EntryClass(0b1), EntryClass(0b11)])
        .unwrap();
}

fn graph_edge(target: u32, data: EdgeData) -> GraphEdge {
    GraphEdge { target, data }
}

/// Contracted graph: nodes 3 and 4 are joined twice, the cheaper edge is a
/// toll edge that exclude combination 1 filters out
fn add_ch(builder: &mut RegionBuilder) {
    let prefix = "/ch/metrics/routability";
    builder
        .add(format!("{prefix}/contracted_graph/node_array"), &[0u32, 1, 2, 2, 4, 4])
        .unwrap();
    builder
        .add(
            format!("{prefix}/contracted_graph/edge_array"),
            &[
                graph_edge(3, EdgeData::new(0, 105, 1050, 111.2, true, false)),
                graph_edge(4, EdgeData::new(1, 28, 280, 44.5, false, true)),
                graph_edge(4, EdgeData::new(1, 50, 500, 22.2, true, false).into_shortcut()),
                graph_edge(4, EdgeData::new(2, 30, 300, 22.2, true, false)),
            ],
        )
        .unwrap();
    builder
        .add(format!("{prefix}/exclude/0/edge_filter"), &pack_bits([true; 4]))
        .unwrap();
    builder
        .add(
            format!("{prefix}/exclude/1/edge_filter"),
            &pack_bits([true, true, true, false]),
        )
        .unwrap();
    builder.add_value("/ch/connectivity_checksum", &CH_CHECKSUM).unwrap();
}

/// One partition level: cell 0 holds nodes 0 and 1, cell 1 holds nodes 2 to 4
fn add_mld(builder: &mut RegionBuilder) {
    let level_data = LevelData::new(&[2]);
    let partition: Vec<u64> = [0, 0, 1, 1, 1].iter().map(|&cell| level_data.pack(&[cell])).collect();
    builder
        .add_value("/mld/multilevelpartition/level_data", &level_data)
        .unwrap();
    builder.add("/mld/multilevelpartition/partition", &partition).unwrap();
    builder
        .add::<u32>("/mld/multilevelpartition/cell_to_children", &[])
        .unwrap();

    // Edges leaving a node's level-1 cell come last in its range
    let graph = "/mld/multilevelgraph";
    builder.add(format!("{graph}/node_array"), &[0u32, 1, 2, 2, 4, 6]).unwrap();
    builder
        .add(
            format!("{graph}/edge_array"),
            &[
                graph_edge(3, EdgeData::new(0, 105, 1050, 111.2, true, false)),
                graph_edge(4, EdgeData::new(1, 28, 280, 44.5, false, true)),
                graph_edge(4, EdgeData::new(2, 30, 300, 22.2, true, false)),
                graph_edge(0, EdgeData::new(0, 105, 1050, 111.2, false, true)),
                graph_edge(3, EdgeData::new(2, 30, 300, 22.2, false, true)),
                graph_edge(1, EdgeData::new(1, 28, 280, 44.5, true, false)),
            ],
        )
        .unwrap();
    builder
        .add(format!("{graph}/node_to_edge_offset"), &[0u8, 0, 0, 0, 0, 0, 0, 1, 0, 1])
        .unwrap();
    builder
        .add(format!("{graph}/node_weights"), &[100i32, 101, 150, 50, 51])
        .unwrap();
    builder
        .add(format!("{graph}/node_durations"), &[1000i32, 1010, 1500, 500, 510])
        .unwrap();
    builder
        .add(format!("{graph}/node_distances"), &[111.2f32, 111.2, 111.2, 44.5, 44.5])
        .unwrap();
    builder
        .add(
            format!("{graph}/is_forward_edge"),
            &pack_bits([true, false, true, false, false, true]),
        )
        .unwrap();
    builder
        .add(
            format!("{graph}/is_backward_edge"),
            &pack_bits([false, true, false, true, true, false]),
        )
        .unwrap();
    builder.add_value(format!("{graph}/max_border_node_id"), &4u32).unwrap();

    let storage = "/mld/cellstorage";
    builder.add(format!("{storage}/source_boundary"), &[0u32, 1, 3, 4]).unwrap();
    builder
        .add(format!("{storage}/destination_boundary"), &[0u32, 1, 3, 4])
        .unwrap();
    builder
        .add(
            format!("{storage}/cells"),
            &[
                CellData {
                    value_offset: 0,
                    source_boundary_offset: 0,
                    destination_boundary_offset: 0,
                    num_source_nodes: 2,
                    num_destination_nodes: 2,
                },
                CellData {
                    value_offset: 4,
                    source_boundary_offset: 2,
                    destination_boundary_offset: 2,
                    num_source_nodes: 2,
                    num_destination_nodes: 2,
                },
            ],
        )
        .unwrap();
    builder
        .add(format!("{storage}/level_to_cell_offset"), &[0u64, 2])
        .unwrap();

    let metric = "/mld/metrics/routability";
    for (exclude, toll) in [(0, 0), (1, 1000)] {
        builder
            .add(
                format!("{metric}/exclude/{exclude}/weights"),
                &[0i32, 7, 9, 0, 0, 50 + toll, 51, 0],
            )
            .unwrap();
        builder
            .add(
                format!("{metric}/exclude/{exclude}/durations"),
                &[0i32, 70, 90, 0, 0, 500 + toll, 510, 0],
            )
            .unwrap();
        builder
            .add(
                format!("{metric}/exclude/{exclude}/distances"),
                &[0.0f32, 7.0, 9.0, 0.0, 0.0, 50.0, 51.0, 0.0],
            )
            .unwrap();
    }
    builder.add_value("/mld/connectivity_checksum", &MLD_CHECKSUM).unwrap();
}

pub fn builder(options: Options) -> RegionBuilder {
    let mut builder = RegionBuilder::new();
    add_common(&mut builder, options);
    if options.ch {
        add_ch(&mut builder);
    }
    if options.mld {
        add_mld(&mut builder);
    }
    builder
}

/// The full network, held in process memory
pub fn region() -> Region {
    region_with(Options::default())
}

pub fn region_with(options: Options) -> Region {
    builder(options).build().unwrap()
}

//! Dataset names shared with the producers of a region

pub const PROPERTIES: &str = "/common/properties";
pub const TIMESTAMP: &str = "/common/timestamp";
pub const NBN_DATA: &str = "/common/nbn_data";
pub const RTREE: &str = "/common/rtree";
pub const EBG_NODE_DATA: &str = "/common/ebg_node_data";
pub const TURN_DATA: &str = "/common/turn_data";
pub const NAMES: &str = "/common/names";
pub const TURN_LANES: &str = "/common/turn_lanes";
pub const TURN_PENALTY: &str = "/common/turn_penalty";
pub const SEGMENT_DATA: &str = "/common/segment_data";
pub const DATA_SOURCES_NAMES: &str = "/common/data_sources_names";
pub const INTERSECTION_BEARINGS: &str = "/common/intersection_bearings";
pub const ENTRY_CLASSES: &str = "/common/entry_classes";
pub const MANEUVER_OVERRIDES: &str = "/common/maneuver_overrides";

pub const CH_CHECKSUM: &str = "/ch/connectivity_checksum";
pub const MLD_CHECKSUM: &str = "/mld/connectivity_checksum";

pub const MLD_PARTITION: &str = "/mld/multilevelpartition";
pub const MLD_CELL_STORAGE: &str = "/mld/cellstorage";
pub const MLD_GRAPH: &str = "/mld/multilevelgraph";

/// Prefix of a CH metric's contracted graph and exclude filters
pub fn ch_metric(metric: &str) -> String {
    format!("/ch/metrics/{metric}")
}

/// Prefix of an MLD metric's cell costs
pub fn mld_metric(metric: &str) -> String {
    format!("/mld/metrics/{metric}")
}

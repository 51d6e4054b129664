//! Identifier types and sentinels shared by every view

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dense node id (edge-based or node-based depending on context)
pub type NodeId = u32;
/// Dense edge id into a flat edge array
pub type EdgeId = u32;
pub type NameId = u32;
/// Compact geometry id into the segment data table
pub type PackedGeometryId = u32;
pub type LaneDescriptionId = u16;
pub type LaneDataId = u16;
pub type EntryClassId = u16;
pub type DatasourceId = u8;
pub type LevelId = u8;
pub type CellId = u32;
pub type OsmNodeId = u64;

pub type EdgeWeight = i32;
pub type EdgeDuration = i32;
pub type EdgeDistance = f32;
pub type SegmentWeight = u32;
pub type SegmentDuration = u32;
pub type TurnPenalty = i16;

/// Bitmask of restricted-use classes (toll, ferry, ...)
pub type ClassData = u8;
pub type TravelMode = u8;

pub const SPECIAL_NODEID: NodeId = u32::MAX;
pub const SPECIAL_EDGEID: EdgeId = u32::MAX;
pub const INVALID_NAMEID: NameId = u32::MAX;
pub const INVALID_LANE_DESCRIPTIONID: LaneDescriptionId = u16::MAX;
pub const INVALID_LANE_DATAID: LaneDataId = u16::MAX;
pub const INVALID_EDGE_WEIGHT: EdgeWeight = i32::MAX;

/// Number of distinct classes a profile may declare
pub const MAX_CLASS_INDEX: usize = 8;
/// Number of exclude combinations a profile may declare
pub const MAX_EXCLUDABLE_CLASSES: usize = 8;

const HIGH_BIT: u32 = 1 << 31;

/// Geometry reference of an edge-based node; `forward` tells which direction of
/// the stored geometry the node traverses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeometryId {
    pub id: PackedGeometryId,
    pub forward: bool,
}

impl GeometryId {
    pub fn pack(self) -> u32 {
        debug_assert!(self.id < HIGH_BIT);
        self.id | if self.forward { HIGH_BIT } else { 0 }
    }

    pub fn unpack(raw: u32) -> Self {
        Self {
            id: raw & !HIGH_BIT,
            forward: raw & HIGH_BIT != 0,
        }
    }
}

/// Connected component of an edge-based node; tiny components are islands
/// disconnected from the dominant part of the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentId {
    pub id: u32,
    pub is_tiny: bool,
}

impl ComponentId {
    pub fn pack(self) -> u32 {
        debug_assert!(self.id < HIGH_BIT);
        self.id | if self.is_tiny { HIGH_BIT } else { 0 }
    }

    pub fn unpack(raw: u32) -> Self {
        Self {
            id: raw & !HIGH_BIT,
            is_tiny: raw & HIGH_BIT != 0,
        }
    }
}

/// Segment reference carried by phantom nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentId {
    pub id: NodeId,
    pub enabled: bool,
}

impl SegmentId {
    pub const INVALID: SegmentId = SegmentId {
        id: SPECIAL_NODEID,
        enabled: false,
    };
}

/// Routing algorithm a facade is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Contraction hierarchies over a single-level graph
    #[default]
    Ch,
    /// Multi-level Dijkstra over a partitioned graph
    Mld,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Ch => write!(f, "ch"),
            Algorithm::Mld => write!(f, "mld"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ch" => Ok(Algorithm::Ch),
            "mld" => Ok(Algorithm::Mld),
            other => Err(format!("unknown algorithm '{other}' (expected ch or mld)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_id_packing() {
        let id = GeometryId { id: 42, forward: true };
        assert_eq!(GeometryId::unpack(id.pack()), id);

        let id = GeometryId { id: 7, forward: false };
        assert_eq!(id.pack(), 7);
    }

    #[test]
    fn test_component_id_packing() {
        let tiny = ComponentId { id: 3, is_tiny: true };
        assert_eq!(ComponentId::unpack(tiny.pack()), tiny);
        assert!(!ComponentId::unpack(3).is_tiny);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("CH".parse::<Algorithm>().unwrap(), Algorithm::Ch);
        assert_eq!("mld".parse::<Algorithm>().unwrap(), Algorithm::Mld);
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Mld.to_string(), "mld");
    }
}

//! Node-based node data: coordinates and OSM ids

use crate::core::{Coordinate, FacadeError, NodeId, OsmNodeId, Result};
use crate::storage::Region;

#[derive(Debug, Clone, Copy)]
pub struct NodeBasedNodesView<'r> {
    coordinates: &'r [Coordinate],
    osm_node_ids: &'r [OsmNodeId],
}

impl<'r> NodeBasedNodesView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let coordinates = region.block::<Coordinate>(&format!("{name}/coordinates"))?;
        let osm_node_ids = region.block::<OsmNodeId>(&format!("{name}/osm_node_ids"))?;
        if coordinates.len() != osm_node_ids.len() {
            return Err(FacadeError::invalid(
                name,
                format!(
                    "{} coordinates but {} OSM ids",
                    coordinates.len(),
                    osm_node_ids.len()
                ),
            ));
        }
        Ok(Self {
            coordinates,
            osm_node_ids,
        })
    }

    pub fn coordinate(&self, node: NodeId) -> Coordinate {
        self.coordinates[node as usize]
    }

    pub fn osm_node_id(&self, node: NodeId) -> OsmNodeId {
        self.osm_node_ids[node as usize]
    }

    pub fn coordinates(&self) -> &'r [Coordinate] {
        self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

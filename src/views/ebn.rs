//! Edge-based node data and the annotations they share

use bytemuck::{Pod, Zeroable};

use crate::core::{
    ClassData, ComponentId, FacadeError, GeometryId, LaneDescriptionId, NameId, NodeId, Result,
    TravelMode, INVALID_LANE_DESCRIPTIONID, INVALID_NAMEID,
};
use crate::storage::Region;

/// One edge-based node (a directed road segment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct EdgeBasedNode {
    /// Packed [`GeometryId`]
    pub geometry_id: u32,
    /// Packed [`ComponentId`]
    pub component_id: u32,
    pub annotation_id: u32,
    pub segregated: u8,
    pub _padding: [u8; 3],
}

impl EdgeBasedNode {
    pub fn new(geometry: GeometryId, component: ComponentId, annotation_id: u32) -> Self {
        Self {
            geometry_id: geometry.pack(),
            component_id: component.pack(),
            annotation_id,
            segregated: 0,
            _padding: [0; 3],
        }
    }
}

/// Attributes shared by every edge-based node of one way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct NodeBasedEdgeAnnotation {
    pub name_id: NameId,
    pub lane_description_id: LaneDescriptionId,
    pub classes: ClassData,
    pub travel_mode: TravelMode,
    pub is_left_hand_driving: u8,
    pub _padding: [u8; 3],
}

impl Default for NodeBasedEdgeAnnotation {
    fn default() -> Self {
        Self {
            name_id: INVALID_NAMEID,
            lane_description_id: INVALID_LANE_DESCRIPTIONID,
            classes: 0,
            travel_mode: 1,
            is_left_hand_driving: 0,
            _padding: [0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeBasedNodeDataView<'r> {
    nodes: &'r [EdgeBasedNode],
    annotations: &'r [NodeBasedEdgeAnnotation],
}

impl<'r> EdgeBasedNodeDataView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let nodes = region.block::<EdgeBasedNode>(&format!("{name}/nodes"))?;
        let annotations = region.block::<NodeBasedEdgeAnnotation>(&format!("{name}/annotations"))?;
        if let Some(node) = nodes
            .iter()
            .position(|n| n.annotation_id as usize >= annotations.len())
        {
            return Err(FacadeError::invalid(
                name,
                format!(
                    "node {node} references annotation {} of {}",
                    nodes[node].annotation_id,
                    annotations.len()
                ),
            ));
        }
        Ok(Self { nodes, annotations })
    }

    fn annotation(&self, node: NodeId) -> &'r NodeBasedEdgeAnnotation {
        &self.annotations[self.nodes[node as usize].annotation_id as usize]
    }

    pub fn geometry_id(&self, node: NodeId) -> GeometryId {
        GeometryId::unpack(self.nodes[node as usize].geometry_id)
    }

    pub fn component_id(&self, node: NodeId) -> ComponentId {
        ComponentId::unpack(self.nodes[node as usize].component_id)
    }

    pub fn is_segregated(&self, node: NodeId) -> bool {
        self.nodes[node as usize].segregated != 0
    }

    pub fn name_id(&self, node: NodeId) -> NameId {
        self.annotation(node).name_id
    }

    pub fn lane_description_id(&self, node: NodeId) -> LaneDescriptionId {
        self.annotation(node).lane_description_id
    }

    pub fn class_data(&self, node: NodeId) -> ClassData {
        self.annotation(node).classes
    }

    pub fn travel_mode(&self, node: NodeId) -> TravelMode {
        self.annotation(node).travel_mode
    }

    pub fn is_left_hand_driving(&self, node: NodeId) -> bool {
        self.annotation(node).is_left_hand_driving != 0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RegionBuilder;

    #[test]
    fn test_annotations_are_shared() {
        let nodes = [
            EdgeBasedNode::new(
                GeometryId { id: 0, forward: true },
                ComponentId { id: 1, is_tiny: false },
                0,
            ),
            EdgeBasedNode {
                segregated: 1,
                ..EdgeBasedNode::new(
                    GeometryId { id: 0, forward: false },
                    ComponentId { id: 2, is_tiny: true },
                    1,
                )
            },
        ];
        let annotations = [
            NodeBasedEdgeAnnotation {
                name_id: 3,
                classes: 0b10,
                ..Default::default()
            },
            NodeBasedEdgeAnnotation {
                is_left_hand_driving: 1,
                ..Default::default()
            },
        ];
        let mut builder = RegionBuilder::new();
        builder.add("/ebn/nodes", &nodes).unwrap();
        builder.add("/ebn/annotations", &annotations).unwrap();
        let region = builder.build().unwrap();

        let view = EdgeBasedNodeDataView::load(&region, "/ebn").unwrap();
        assert_eq!(view.geometry_id(1), GeometryId { id: 0, forward: false });
        assert!(view.component_id(1).is_tiny);
        assert_eq!(view.name_id(0), 3);
        assert_eq!(view.class_data(0), 0b10);
        assert!(view.is_left_hand_driving(1));
        assert!(view.is_segregated(1));
        assert!(!view.is_segregated(0));
    }

    #[test]
    fn test_dangling_annotation_rejected() {
        let nodes = [EdgeBasedNode::new(
            GeometryId { id: 0, forward: true },
            ComponentId { id: 0, is_tiny: false },
            4,
        )];
        let mut builder = RegionBuilder::new();
        builder.add("/ebn/nodes", &nodes).unwrap();
        builder
            .add("/ebn/annotations", &[NodeBasedEdgeAnnotation::default()])
            .unwrap();
        let region = builder.build().unwrap();
        assert!(matches!(
            EdgeBasedNodeDataView::load(&region, "/ebn"),
            Err(FacadeError::InvalidDataset { .. })
        ));
    }
}

//! Packed R-tree over road segments
//!
//! The tree is stored breadth first. Children are addressed by index into the
//! node array (or into the leaf array for the bottom nodes), so the structure
//! stays valid wherever the region is mapped.

use bytemuck::{Pod, Zeroable};
use rstar::{ParentNode, RTree, RTreeNode, RTreeObject, AABB};
use serde::Serialize;

use crate::core::{Coordinate, FacadeError, NodeId, Rectangle, Result, SegmentId};
use crate::storage::{Region, RegionBuilder};

const FORWARD_ENABLED: u16 = 1;
const REVERSE_ENABLED: u16 = 1 << 1;
const IS_STARTPOINT: u16 = 1 << 2;

/// Leaf of the search tree: one segment `u -> v` of a compressed geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize)]
#[repr(C)]
pub struct EdgeBasedNodeSegment {
    pub forward_segment_id: NodeId,
    pub reverse_segment_id: NodeId,
    /// Node-based source node
    pub u: NodeId,
    /// Node-based target node
    pub v: NodeId,
    /// Index of the segment within its geometry
    pub fwd_segment_position: u16,
    pub flags: u16,
}

impl EdgeBasedNodeSegment {
    pub fn new(forward: SegmentId, reverse: SegmentId, u: NodeId, v: NodeId, fwd_segment_position: u16) -> Self {
        let mut flags = IS_STARTPOINT;
        if forward.enabled {
            flags |= FORWARD_ENABLED;
        }
        if reverse.enabled {
            flags |= REVERSE_ENABLED;
        }
        Self {
            forward_segment_id: forward.id,
            reverse_segment_id: reverse.id,
            u,
            v,
            fwd_segment_position,
            flags,
        }
    }

    /// Marks a segment a route may pass but not start on
    pub fn not_startpoint(mut self) -> Self {
        self.flags &= !IS_STARTPOINT;
        self
    }

    pub fn forward_segment(&self) -> SegmentId {
        SegmentId {
            id: self.forward_segment_id,
            enabled: self.flags & FORWARD_ENABLED != 0,
        }
    }

    pub fn reverse_segment(&self) -> SegmentId {
        SegmentId {
            id: self.reverse_segment_id,
            enabled: self.flags & REVERSE_ENABLED != 0,
        }
    }

    pub fn is_startpoint(&self) -> bool {
        self.flags & IS_STARTPOINT != 0
    }
}

/// Inner node of the search tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct TreeNode {
    pub mbr: Rectangle,
    pub first_child: u32,
    pub child_count: u32,
    /// Non-zero if children index the leaf array
    pub leaf_children: u32,
    pub _padding: u32,
}

impl TreeNode {
    pub fn children(&self) -> std::ops::Range<usize> {
        let first = self.first_child as usize;
        first..first + self.child_count as usize
    }

    pub fn has_leaf_children(&self) -> bool {
        self.leaf_children != 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticRTreeView<'r> {
    nodes: &'r [TreeNode],
    level_starts: &'r [u64],
    leaves: &'r [EdgeBasedNodeSegment],
}

impl<'r> StaticRTreeView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let nodes = region.block::<TreeNode>(&format!("{name}/search_tree"))?;
        let level_starts = region.block::<u64>(&format!("{name}/search_tree_level_starts"))?;
        let leaves = region.block::<EdgeBasedNodeSegment>(&format!("{name}/leaves"))?;

        if nodes.is_empty() {
            return Err(FacadeError::invalid(name, "search tree has no root"));
        }
        let levels_valid = level_starts.first() == Some(&0)
            && level_starts.windows(2).all(|w| w[0] < w[1])
            && level_starts.last().is_some_and(|&last| (last as usize) < nodes.len());
        if !levels_valid {
            return Err(FacadeError::invalid(name, "level starts do not index the tree"));
        }
        for (index, node) in nodes.iter().enumerate() {
            let children = node.children();
            let in_bounds = if node.has_leaf_children() {
                children.end <= leaves.len()
            } else {
                children.start > index && children.end <= nodes.len()
            };
            if !in_bounds {
                return Err(FacadeError::invalid(
                    name,
                    format!("tree node {index} has children {children:?} out of bounds"),
                ));
            }
        }
        Ok(Self {
            nodes,
            level_starts,
            leaves,
        })
    }

    pub fn root(&self) -> &'r TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &'r TreeNode {
        &self.nodes[index]
    }

    pub fn leaf(&self, index: usize) -> &'r EdgeBasedNodeSegment {
        &self.leaves[index]
    }

    pub fn leaves(&self) -> &'r [EdgeBasedNodeSegment] {
        self.leaves
    }

    pub fn number_of_levels(&self) -> usize {
        self.level_starts.len()
    }

    /// Every leaf whose bounding box intersects `bbox`
    pub fn search(&self, bbox: &Rectangle, coordinates: &[Coordinate]) -> Vec<EdgeBasedNodeSegment> {
        let mut results = Vec::new();
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.mbr.intersects(bbox) {
                continue;
            }
            if node.has_leaf_children() {
                results.extend(self.leaves[node.children()].iter().filter(|segment| {
                    segment_bounds(segment, coordinates).intersects(bbox)
                }));
            } else {
                stack.extend(node.children());
            }
        }
        results
    }
}

pub fn segment_bounds(segment: &EdgeBasedNodeSegment, coordinates: &[Coordinate]) -> Rectangle {
    Rectangle::from_corners(coordinates[segment.u as usize], coordinates[segment.v as usize])
}

struct IndexedSegment {
    segment: EdgeBasedNodeSegment,
    bounds: Rectangle,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[i32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_lon, self.bounds.min_lat],
            [self.bounds.max_lon, self.bounds.max_lat],
        )
    }
}

fn envelope_rectangle(envelope: &AABB<[i32; 2]>) -> Rectangle {
    let [min_lon, min_lat] = envelope.lower();
    let [max_lon, max_lat] = envelope.upper();
    Rectangle {
        min_lon,
        max_lon,
        min_lat,
        max_lat,
    }
}

/// Producer side of the search tree, bulk loaded with `rstar`
#[derive(Debug, Clone, Default)]
pub struct PackedRTree {
    pub nodes: Vec<TreeNode>,
    pub level_starts: Vec<u64>,
    pub leaves: Vec<EdgeBasedNodeSegment>,
}

impl PackedRTree {
    pub fn build(segments: &[EdgeBasedNodeSegment], coordinates: &[Coordinate]) -> Result<Self> {
        let objects = segments
            .iter()
            .map(|&segment| IndexedSegment {
                segment,
                bounds: segment_bounds(&segment, coordinates),
            })
            .collect();
        let tree = RTree::bulk_load(objects);

        let mut packed = Self::default();
        let mut level: Vec<&ParentNode<IndexedSegment>> = vec![tree.root()];
        while !level.is_empty() {
            packed.level_starts.push(packed.nodes.len() as u64);
            let next_start = packed.nodes.len() + level.len();
            let mut next = Vec::new();
            for parent in level {
                let children = parent.children();
                let leaf_count = children.iter().filter(|c| matches!(c, RTreeNode::Leaf(_))).count();
                let mbr = if children.is_empty() {
                    Rectangle::EMPTY
                } else {
                    envelope_rectangle(&parent.envelope())
                };
                let node = if leaf_count == children.len() {
                    let first_child = packed.leaves.len() as u32;
                    packed.leaves.extend(children.iter().filter_map(|child| match child {
                        RTreeNode::Leaf(object) => Some(object.segment),
                        RTreeNode::Parent(_) => None,
                    }));
                    TreeNode {
                        mbr,
                        first_child,
                        child_count: children.len() as u32,
                        leaf_children: 1,
                        _padding: 0,
                    }
                } else if leaf_count == 0 {
                    let first_child = (next_start + next.len()) as u32;
                    next.extend(children.iter().filter_map(|child| match child {
                        RTreeNode::Parent(node) => Some(node),
                        RTreeNode::Leaf(_) => None,
                    }));
                    TreeNode {
                        mbr,
                        first_child,
                        child_count: children.len() as u32,
                        leaf_children: 0,
                        _padding: 0,
                    }
                } else {
                    return Err(FacadeError::invalid("rtree", "node mixes leaves and subtrees"));
                };
                packed.nodes.push(node);
            }
            level = next;
        }
        Ok(packed)
    }

    /// Writes the tree's three blocks under `name`
    pub fn add_to(&self, builder: &mut RegionBuilder, name: &str) -> Result<()> {
        builder.add(format!("{name}/search_tree"), &self.nodes)?;
        builder.add(format!("{name}/search_tree_level_starts"), &self.level_starts)?;
        builder.add(format!("{name}/leaves"), &self.leaves)?;
        Ok(())
    }
}

//! Spatial index over road segments and snapping of coordinates onto it

pub mod phantom;
pub mod query;
pub mod rtree;

pub use phantom::{Approach, Bearing, PhantomCandidateAlternatives, PhantomNode, PhantomNodeWithDistance};
pub use query::GeospatialQuery;
pub use rtree::{segment_bounds, EdgeBasedNodeSegment, PackedRTree, StaticRTreeView, TreeNode};

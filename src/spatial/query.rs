//! Best-first nearest-segment search and phantom node construction
//!
//! The tree is expanded in order of a lower bound on the distance to the query
//! point. Leaves are projected onto their segment on entry, so once a segment
//! is popped no unexplored subtree or segment can be closer. Each query
//! variant decides per candidate which directions it accepts and when to stop.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::core::coordinate::{bearing as segment_bearing, haversine_distance, is_ccw, project_point_on_segment};
use crate::core::{ClassData, Coordinate, EdgeDistance, EdgeDuration, EdgeWeight, NodeId, Rectangle, SegmentId};
use crate::views::{EdgeBasedNodeDataView, NodeBasedNodesView, SegmentDataView};

use super::phantom::{Approach, Bearing, PhantomCandidateAlternatives, PhantomNode, PhantomNodeWithDistance};
use super::rtree::{EdgeBasedNodeSegment, StaticRTreeView};

/// Candidates closer together than this count as equally near
const DISTANCE_EPSILON: f64 = 1e-3;

/// Accepted directions of a candidate, forward then reverse
type Directions = (bool, bool);

fn both(a: Directions, b: Directions) -> Directions {
    (a.0 && b.0, a.1 && b.1)
}

fn any(directions: Directions) -> bool {
    directions.0 || directions.1
}

/// A leaf segment with the query point projected onto it
#[derive(Debug, Clone, Copy)]
struct Candidate {
    segment: EdgeBasedNodeSegment,
    location: Coordinate,
    ratio: f64,
    distance: f64,
    /// Bearing of the segment from `u` to `v`, in degrees
    bearing: f64,
}

#[derive(Debug, Clone, Copy)]
enum Item {
    Node(usize),
    Segment(Candidate),
}

#[derive(Debug)]
struct QueueEntry {
    distance: f64,
    /// Insertion order, breaks ties so results do not depend on heap layout
    order: usize,
    item: Item,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // Reversed: BinaryHeap is a max-heap and we want the nearest first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Nearest-neighbour queries over the segment tree
#[derive(Debug, Clone, Copy)]
pub struct GeospatialQuery<'r> {
    rtree: StaticRTreeView<'r>,
    nodes: NodeBasedNodesView<'r>,
    node_data: EdgeBasedNodeDataView<'r>,
    segment_data: SegmentDataView<'r>,
    exclude_mask: ClassData,
}

impl<'r> GeospatialQuery<'r> {
    pub fn new(
        rtree: StaticRTreeView<'r>,
        nodes: NodeBasedNodesView<'r>,
        node_data: EdgeBasedNodeDataView<'r>,
        segment_data: SegmentDataView<'r>,
        exclude_mask: ClassData,
    ) -> Self {
        Self {
            rtree,
            nodes,
            node_data,
            segment_data,
            exclude_mask,
        }
    }

    /// Every segment whose bounding box intersects the box
    pub fn edges_in_box(&self, south_west: Coordinate, north_east: Coordinate) -> Vec<EdgeBasedNodeSegment> {
        self.rtree
            .search(&Rectangle::from_corners(south_west, north_east), self.nodes.coordinates())
    }

    /// Up to `max_results` nearest start points, optionally within `max_distance` meters
    pub fn nearest_phantom_nodes(
        &self,
        input: Coordinate,
        max_results: usize,
        max_distance: Option<f64>,
        bearing: Option<Bearing>,
        approach: Approach,
    ) -> Vec<PhantomNodeWithDistance> {
        let results = self.search(
            input,
            |candidate| self.accepted_directions(input, candidate, bearing, approach, false),
            |found, candidate| found >= max_results || max_distance.is_some_and(|max| candidate.distance > max),
        );
        self.make_phantom_nodes(input, &results)
    }

    /// Every accepted candidate within `max_distance` meters
    pub fn nearest_phantom_nodes_in_range(
        &self,
        input: Coordinate,
        max_distance: f64,
        bearing: Option<Bearing>,
        approach: Approach,
        use_all_edges: bool,
    ) -> Vec<PhantomNodeWithDistance> {
        let results = self.search(
            input,
            |candidate| self.accepted_directions(input, candidate, bearing, approach, use_all_edges),
            |_, candidate| candidate.distance > max_distance,
        );
        self.make_phantom_nodes(input, &results)
    }

    /// The nearest candidates, and the nearest ones outside tiny components.
    ///
    /// When the nearest candidate already lies on a big component both sets
    /// are the same.
    pub fn nearest_candidates_with_alternative_from_big_component(
        &self,
        input: Coordinate,
        max_distance: Option<f64>,
        bearing: Option<Bearing>,
        approach: Approach,
        use_all_edges: bool,
    ) -> PhantomCandidateAlternatives {
        let nearest_distance = Cell::new(None::<f64>);
        let big_component_distance = Cell::new(None::<f64>);

        let results = self.search(
            input,
            |candidate| {
                let tiny = self.is_tiny(candidate);
                if big_component_distance.get().is_some() && tiny {
                    return (false, false);
                }
                let directions = self.accepted_directions(input, candidate, bearing, approach, use_all_edges);
                if any(directions) {
                    if nearest_distance.get().is_none() {
                        nearest_distance.set(Some(candidate.distance));
                    }
                    if !tiny && big_component_distance.get().is_none() {
                        big_component_distance.set(Some(candidate.distance));
                    }
                }
                directions
            },
            |_, candidate| {
                let too_far = max_distance.is_some_and(|max| candidate.distance > max);
                let past_big_component = big_component_distance
                    .get()
                    .is_some_and(|big| candidate.distance > big + DISTANCE_EPSILON);
                too_far || past_big_component
            },
        );

        let mut alternatives = PhantomCandidateAlternatives::default();
        for &(candidate, directions) in &results {
            let within = |limit: Option<f64>| limit.is_some_and(|d| candidate.distance <= d + DISTANCE_EPSILON);
            let phantom = || PhantomNodeWithDistance {
                phantom_node: self.make_phantom_node(input, &candidate, directions),
                distance: candidate.distance,
            };
            if within(nearest_distance.get()) {
                alternatives.nearest.push(phantom());
            }
            if !self.is_tiny(&candidate) && within(big_component_distance.get()) {
                alternatives.big_component.push(phantom());
            }
        }
        alternatives
    }

    fn search(
        &self,
        input: Coordinate,
        mut filter: impl FnMut(&Candidate) -> Directions,
        mut terminate: impl FnMut(usize, &Candidate) -> bool,
    ) -> Vec<(Candidate, Directions)> {
        let coordinates = self.nodes.coordinates();
        let mut results = Vec::new();
        let mut queue = BinaryHeap::new();
        let mut order = 0usize;
        let mut push = |queue: &mut BinaryHeap<QueueEntry>, distance: f64, item: Item| {
            queue.push(QueueEntry { distance, order, item });
            order += 1;
        };

        let root = self.rtree.root();
        if root.child_count > 0 {
            push(&mut queue, root.mbr.min_distance(input), Item::Node(0));
        }

        while let Some(entry) = queue.pop() {
            match entry.item {
                Item::Node(index) => {
                    let node = self.rtree.node(index);
                    if node.has_leaf_children() {
                        for leaf in node.children() {
                            let segment = *self.rtree.leaf(leaf);
                            let u = coordinates[segment.u as usize];
                            let v = coordinates[segment.v as usize];
                            let (ratio, location) = project_point_on_segment(u, v, input);
                            let candidate = Candidate {
                                segment,
                                location,
                                ratio,
                                distance: haversine_distance(input, location),
                                bearing: segment_bearing(u, v),
                            };
                            push(&mut queue, candidate.distance, Item::Segment(candidate));
                        }
                    } else {
                        for child in node.children() {
                            let child_node = self.rtree.node(child);
                            if child_node.child_count > 0 {
                                push(&mut queue, child_node.mbr.min_distance(input), Item::Node(child));
                            }
                        }
                    }
                }
                Item::Segment(candidate) => {
                    if terminate(results.len(), &candidate) {
                        trace!(
                            found = results.len(),
                            distance = candidate.distance,
                            "nearest search terminated"
                        );
                        break;
                    }
                    let directions = filter(&candidate);
                    if any(directions) {
                        results.push((candidate, directions));
                    }
                }
            }
        }
        results
    }

    fn accepted_directions(
        &self,
        input: Coordinate,
        candidate: &Candidate,
        bearing: Option<Bearing>,
        approach: Approach,
        use_all_edges: bool,
    ) -> Directions {
        if !self.has_valid_edge(candidate, use_all_edges) {
            return (false, false);
        }
        let mut directions = self.check_segment_exclude(candidate);
        if let Some(bearing) = bearing {
            directions = both(directions, self.check_segment_bearing(candidate, bearing));
        }
        both(directions, self.check_approach(input, candidate, approach))
    }

    fn exclude_node(&self, node: NodeId) -> bool {
        self.node_data.class_data(node) & self.exclude_mask != 0
    }

    fn has_valid_edge(&self, candidate: &Candidate, use_all_edges: bool) -> bool {
        let segment = &candidate.segment;
        (segment.forward_segment().enabled || segment.reverse_segment().enabled)
            && (use_all_edges || segment.is_startpoint())
    }

    fn check_segment_exclude(&self, candidate: &Candidate) -> Directions {
        let forward = candidate.segment.forward_segment();
        let reverse = candidate.segment.reverse_segment();
        (
            forward.enabled && !self.exclude_node(forward.id),
            reverse.enabled && !self.exclude_node(reverse.id),
        )
    }

    fn check_segment_bearing(&self, candidate: &Candidate, bearing: Bearing) -> Directions {
        let forward_bearing = candidate.bearing;
        let reverse_bearing = (forward_bearing + 180.0) % 360.0;
        (
            candidate.segment.forward_segment().enabled && bearing.contains(forward_bearing.round()),
            candidate.segment.reverse_segment().enabled && bearing.contains(reverse_bearing.round()),
        )
    }

    fn check_approach(&self, input: Coordinate, candidate: &Candidate, approach: Approach) -> Directions {
        let forward = candidate.segment.forward_segment();
        let reverse = candidate.segment.reverse_segment();
        // Only two-way roads have a wrong side to arrive on
        if approach == Approach::Unrestricted || !(forward.enabled && reverse.enabled) {
            return (true, true);
        }
        let u = self.nodes.coordinate(candidate.segment.u);
        let v = self.nodes.coordinate(candidate.segment.v);
        let mut input_on_right = !is_ccw(u, v, input);
        if self.node_data.is_left_hand_driving(forward.id) {
            input_on_right = !input_on_right;
        }
        match approach {
            Approach::Curb => (input_on_right, !input_on_right),
            Approach::Opposite => (!input_on_right, input_on_right),
            Approach::Unrestricted => (true, true),
        }
    }

    fn is_tiny(&self, candidate: &Candidate) -> bool {
        let forward = candidate.segment.forward_segment();
        let node = if forward.enabled {
            forward.id
        } else {
            candidate.segment.reverse_segment().id
        };
        self.node_data.component_id(node).is_tiny
    }

    fn make_phantom_nodes(&self, input: Coordinate, results: &[(Candidate, Directions)]) -> Vec<PhantomNodeWithDistance> {
        results
            .iter()
            .map(|(candidate, directions)| PhantomNodeWithDistance {
                phantom_node: self.make_phantom_node(input, candidate, *directions),
                distance: candidate.distance,
            })
            .collect()
    }

    fn make_phantom_node(&self, input: Coordinate, candidate: &Candidate, directions: Directions) -> PhantomNode {
        let segment = &candidate.segment;
        let forward = SegmentId {
            enabled: segment.forward_segment().enabled && directions.0,
            ..segment.forward_segment()
        };
        let reverse = SegmentId {
            enabled: segment.reverse_segment().enabled && directions.1,
            ..segment.reverse_segment()
        };
        let anchor = if forward.enabled { forward.id } else { reverse.id };
        let geometry = self.node_data.geometry_id(anchor).id;
        let component = self.node_data.component_id(anchor);

        let position = segment.fwd_segment_position as usize;
        let segments = self.segment_data.forward_weights(geometry).len();
        let reverse_position = segments.saturating_sub(1 + position);

        // Offsets cover the whole segments before the snapped one in travel order
        let forward_weight_offset: u32 = self.segment_data.forward_weights(geometry).take(position).sum();
        let forward_weight = self.segment_data.forward_weights(geometry).nth(position).unwrap_or(0);
        let reverse_weight_offset: u32 = self.segment_data.reverse_weights(geometry).take(reverse_position).sum();
        let reverse_weight = self.segment_data.reverse_weights(geometry).nth(reverse_position).unwrap_or(0);

        let forward_duration_offset: u32 = self.segment_data.forward_durations(geometry).take(position).sum();
        let forward_duration = self.segment_data.forward_durations(geometry).nth(position).unwrap_or(0);
        let reverse_duration_offset: u32 = self.segment_data.reverse_durations(geometry).take(reverse_position).sum();
        let reverse_duration = self.segment_data.reverse_durations(geometry).nth(reverse_position).unwrap_or(0);

        let lengths: Vec<f64> = self
            .segment_data
            .forward_geometry(geometry)
            .map(|node| self.nodes.coordinate(node))
            .collect::<Vec<_>>()
            .windows(2)
            .map(|pair| haversine_distance(pair[0], pair[1]))
            .collect();
        let forward_distance_offset: f64 = lengths.iter().take(position).sum();
        let reverse_distance_offset: f64 = lengths.iter().skip(position + 1).sum();

        let u = self.nodes.coordinate(segment.u);
        let v = self.nodes.coordinate(segment.v);
        let forward_bearing = candidate.bearing.round() as u16 % 360;

        let ratio = candidate.ratio;
        let scale = |value: u32, factor: f64| (value as f64 * factor).round() as EdgeWeight;

        PhantomNode {
            forward_segment_id: forward,
            reverse_segment_id: reverse,
            forward_weight: scale(forward_weight, ratio),
            reverse_weight: scale(reverse_weight, 1.0 - ratio),
            forward_weight_offset: forward_weight_offset as EdgeWeight,
            reverse_weight_offset: reverse_weight_offset as EdgeWeight,
            forward_duration: scale(forward_duration, ratio) as EdgeDuration,
            reverse_duration: scale(reverse_duration, 1.0 - ratio) as EdgeDuration,
            forward_duration_offset: forward_duration_offset as EdgeDuration,
            reverse_duration_offset: reverse_duration_offset as EdgeDuration,
            forward_distance: haversine_distance(u, candidate.location) as EdgeDistance,
            reverse_distance: haversine_distance(candidate.location, v) as EdgeDistance,
            forward_distance_offset: forward_distance_offset as EdgeDistance,
            reverse_distance_offset: reverse_distance_offset as EdgeDistance,
            component,
            location: candidate.location,
            input_location: input,
            fwd_segment_position: segment.fwd_segment_position,
            is_valid_forward_source: forward.enabled,
            is_valid_forward_target: forward.enabled,
            is_valid_reverse_source: reverse.enabled,
            is_valid_reverse_target: reverse.enabled,
            bearing: forward_bearing,
            reverse_bearing: (forward_bearing + 180) % 360,
        }
    }
}

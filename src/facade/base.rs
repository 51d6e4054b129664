//! Algorithm-independent attribute facade
//!
//! Everything a query needs besides the graph: coordinates, segment geometry,
//! turn penalties, guidance data, names and the spatial index. Optional
//! datasets are probed once here; their accessors fail with
//! [`FacadeError::DatasetDisabled`] when the region was built without them.

use tracing::debug;

use crate::core::{
    ClassData, ComponentId, Coordinate, DatasourceId, EdgeId, FacadeError, GeometryId, LaneDescriptionId,
    NameId, NodeId, OsmNodeId, PackedGeometryId, Result, SegmentDuration, SegmentWeight, TravelMode,
    TurnPenalty, INVALID_LANE_DATAID, INVALID_LANE_DESCRIPTIONID,
};
use crate::spatial::{
    Approach, Bearing, EdgeBasedNodeSegment, GeospatialQuery, PhantomCandidateAlternatives,
    PhantomNodeWithDistance, StaticRTreeView,
};
use crate::storage::Region;
use crate::views::optional::{
    DATASET_ENTRY_CLASS, DATASET_INTERSECTION_BEARINGS, DATASET_NAME_DATA, DATASET_TURN_DATA,
    DATASET_TURN_LANE_DATA,
};
use crate::views::segment_data::{ForwardRange, ReverseRange};
use crate::views::{
    class_indexes, checksum_view, entry_classes_view, timestamp_view, BearingClass, Datasources,
    EdgeBasedNodeDataView, EntryClass, IntersectionBearingsView, LaneTupleIdPair, ManeuverOverride,
    ManeuverOverridesView, NameTableView, NodeBasedNodesView, OptionalDataset, ProfileProperties,
    SegmentDataView, TurnBearing, TurnDataView, TurnInstruction, TurnLaneMask, TurnLanesView,
};

use super::datasets;

/// Connectivity checksum, from whichever algorithm's copy is present
fn connectivity_checksum(region: &Region) -> Result<u32> {
    [datasets::MLD_CHECKSUM, datasets::CH_CHECKSUM]
        .into_iter()
        .find(|name| region.exists(name))
        .map(|name| checksum_view(region, name))
        .unwrap_or(Err(FacadeError::MissingChecksum))
}

fn turn_penalties(region: &Region) -> Result<(&[TurnPenalty], &[TurnPenalty])> {
    let name = datasets::TURN_PENALTY;
    let weights = region.block::<TurnPenalty>(&format!("{name}/weight"))?;
    let durations = region.block::<TurnPenalty>(&format!("{name}/duration"))?;
    if weights.len() != durations.len() {
        return Err(FacadeError::invalid(name, "weight and duration penalties differ in length"));
    }
    Ok((weights, durations))
}

/// Turn data ids into the lane and entry class tables, checked when both sides are present
fn check_turn_references(
    turn_data: &OptionalDataset<TurnDataView<'_>>,
    turn_lanes: &OptionalDataset<TurnLanesView<'_>>,
    entry_classes: &OptionalDataset<&[EntryClass]>,
) -> Result<()> {
    let Ok(turn_data) = turn_data.get() else {
        return Ok(());
    };
    if let Ok(lanes) = turn_lanes.get() {
        let tuples = lanes.number_of_lane_tuples();
        if let Some(&id) = turn_data
            .lane_data_ids()
            .iter()
            .find(|&&id| id != INVALID_LANE_DATAID && id as usize >= tuples)
        {
            return Err(FacadeError::invalid(
                datasets::TURN_DATA,
                format!("lane data id {id} is outside {tuples} lane tuples"),
            ));
        }
    }
    if let Ok(classes) = entry_classes.get() {
        if let Some(&id) = turn_data.entry_class_ids().iter().find(|&&id| id as usize >= classes.len()) {
            return Err(FacadeError::invalid(
                datasets::TURN_DATA,
                format!("entry class id {id} is outside {} entry classes", classes.len()),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct BaseFacade<'r> {
    properties: &'r ProfileProperties,
    timestamp: &'r str,
    checksum: u32,
    exclude_mask: ClassData,
    nodes: NodeBasedNodesView<'r>,
    node_data: EdgeBasedNodeDataView<'r>,
    segment_data: SegmentDataView<'r>,
    rtree: StaticRTreeView<'r>,
    turn_weight_penalties: &'r [TurnPenalty],
    turn_duration_penalties: &'r [TurnPenalty],
    datasources: &'r Datasources,
    maneuver_overrides: ManeuverOverridesView<'r>,
    turn_data: OptionalDataset<TurnDataView<'r>>,
    names: OptionalDataset<NameTableView<'r>>,
    turn_lanes: OptionalDataset<TurnLanesView<'r>>,
    intersection_bearings: OptionalDataset<IntersectionBearingsView<'r>>,
    entry_classes: OptionalDataset<&'r [EntryClass]>,
}

impl<'r> BaseFacade<'r> {
    /// Resolves every common dataset of `region` for profile exclude combination `exclude_index`
    pub fn load(region: &'r Region, exclude_index: usize) -> Result<Self> {
        let properties = ProfileProperties::load(region, datasets::PROPERTIES)?;
        let exclude_mask = properties.exclude_mask(exclude_index)?;
        let checksum = connectivity_checksum(region)?;

        let nodes = NodeBasedNodesView::load(region, datasets::NBN_DATA)?;
        debug!(dataset = datasets::NBN_DATA, count = nodes.len(), "resolved");
        let node_data = EdgeBasedNodeDataView::load(region, datasets::EBG_NODE_DATA)?;
        debug!(dataset = datasets::EBG_NODE_DATA, count = node_data.len(), "resolved");
        let segment_data = SegmentDataView::load(region, datasets::SEGMENT_DATA)?;
        debug!(dataset = datasets::SEGMENT_DATA, count = segment_data.len(), "resolved");
        let rtree = StaticRTreeView::load(region, datasets::RTREE)?;
        debug!(dataset = datasets::RTREE, count = rtree.leaves().len(), "resolved");
        let (turn_weight_penalties, turn_duration_penalties) = turn_penalties(region)?;
        let maneuver_overrides = ManeuverOverridesView::load(region, datasets::MANEUVER_OVERRIDES)?;

        if let Some(&segment) = rtree.leaves().iter().find(|segment| {
            segment.u as usize >= nodes.len()
                || segment.v as usize >= nodes.len()
                || (segment.forward_segment().enabled && segment.forward_segment_id as usize >= node_data.len())
                || (segment.reverse_segment().enabled && segment.reverse_segment_id as usize >= node_data.len())
        }) {
            return Err(FacadeError::invalid(
                datasets::RTREE,
                format!("leaf {segment:?} references nodes outside the graph"),
            ));
        }
        if let Some(node) =
            (0..node_data.len() as NodeId).find(|&node| node_data.geometry_id(node).id as usize >= segment_data.len())
        {
            return Err(FacadeError::invalid(
                datasets::EBG_NODE_DATA,
                format!("node {node} references a geometry outside the segment data"),
            ));
        }
        if let Some(&node) = segment_data.nodes().iter().find(|&&node| node as usize >= nodes.len()) {
            return Err(FacadeError::invalid(
                datasets::SEGMENT_DATA,
                format!("geometry node {node} is outside {} coordinates", nodes.len()),
            ));
        }

        let turn_data = OptionalDataset::probe(region, DATASET_TURN_DATA, datasets::TURN_DATA, TurnDataView::load)?;
        let turn_lanes = OptionalDataset::probe(
            region,
            DATASET_TURN_LANE_DATA,
            datasets::TURN_LANES,
            TurnLanesView::load,
        )?;

        let intersection_bearings = OptionalDataset::probe(
            region,
            DATASET_INTERSECTION_BEARINGS,
            datasets::INTERSECTION_BEARINGS,
            IntersectionBearingsView::load,
        )?;
        // Entry classes ship with the bearings or not at all
        let entry_classes = if intersection_bearings.is_present() {
            OptionalDataset::present(
                DATASET_ENTRY_CLASS,
                entry_classes_view(region, datasets::ENTRY_CLASSES)?,
            )
        } else {
            OptionalDataset::disabled(DATASET_ENTRY_CLASS)
        };
        check_turn_references(&turn_data, &turn_lanes, &entry_classes)?;

        Ok(Self {
            properties,
            timestamp: timestamp_view(region, datasets::TIMESTAMP)?,
            checksum,
            exclude_mask,
            nodes,
            node_data,
            segment_data,
            rtree,
            turn_weight_penalties,
            turn_duration_penalties,
            datasources: Datasources::load(region, datasets::DATA_SOURCES_NAMES)?,
            maneuver_overrides,
            turn_data,
            names: OptionalDataset::probe(region, DATASET_NAME_DATA, datasets::NAMES, NameTableView::load)?,
            turn_lanes,
            intersection_bearings,
            entry_classes,
        })
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn timestamp(&self) -> &'r str {
        self.timestamp
    }

    /// Optional datasets by feature name, and whether this region carries them
    pub fn optional_datasets(&self) -> [(&'static str, bool); 5] {
        [
            (self.turn_data.feature(), self.turn_data.is_present()),
            (self.names.feature(), self.names.is_present()),
            (self.turn_lanes.feature(), self.turn_lanes.is_present()),
            (self.intersection_bearings.feature(), self.intersection_bearings.is_present()),
            (self.entry_classes.feature(), self.entry_classes.is_present()),
        ]
    }

    // Node-based nodes

    pub fn number_of_coordinates(&self) -> usize {
        self.nodes.len()
    }

    pub fn coordinate_of_node(&self, node: NodeId) -> Coordinate {
        self.nodes.coordinate(node)
    }

    pub fn osm_node_id_of_node(&self, node: NodeId) -> OsmNodeId {
        self.nodes.osm_node_id(node)
    }

    // Edge-based nodes

    pub fn geometry_index(&self, node: NodeId) -> GeometryId {
        self.node_data.geometry_id(node)
    }

    pub fn component_id(&self, node: NodeId) -> ComponentId {
        self.node_data.component_id(node)
    }

    pub fn travel_mode(&self, node: NodeId) -> TravelMode {
        self.node_data.travel_mode(node)
    }

    pub fn class_data(&self, node: NodeId) -> ClassData {
        self.node_data.class_data(node)
    }

    /// True if `node` carries a class the active exclude combination avoids
    pub fn exclude_node(&self, node: NodeId) -> bool {
        self.class_data(node) & self.exclude_mask != 0
    }

    pub fn exclude_mask(&self) -> ClassData {
        self.exclude_mask
    }

    /// Profile class names of the bits set in `class_data`
    pub fn classes(&self, class_data: ClassData) -> Vec<&'r str> {
        class_indexes(class_data)
            .map(|index| self.properties.class_name(index))
            .collect()
    }

    pub fn name_index(&self, node: NodeId) -> NameId {
        self.node_data.name_id(node)
    }

    pub fn is_left_hand_driving(&self, node: NodeId) -> bool {
        self.node_data.is_left_hand_driving(node)
    }

    pub fn is_segregated(&self, node: NodeId) -> bool {
        self.node_data.is_segregated(node)
    }

    pub fn lane_description_id(&self, node: NodeId) -> LaneDescriptionId {
        self.node_data.lane_description_id(node)
    }

    // Segment geometry

    pub fn uncompressed_forward_geometry(&self, id: PackedGeometryId) -> ForwardRange<'r, NodeId> {
        self.segment_data.forward_geometry(id)
    }

    pub fn uncompressed_reverse_geometry(&self, id: PackedGeometryId) -> ReverseRange<'r, NodeId> {
        self.segment_data.reverse_geometry(id)
    }

    pub fn uncompressed_forward_weights(&self, id: PackedGeometryId) -> ForwardRange<'r, SegmentWeight> {
        self.segment_data.forward_weights(id)
    }

    pub fn uncompressed_reverse_weights(&self, id: PackedGeometryId) -> ReverseRange<'r, SegmentWeight> {
        self.segment_data.reverse_weights(id)
    }

    pub fn uncompressed_forward_durations(&self, id: PackedGeometryId) -> ForwardRange<'r, SegmentDuration> {
        self.segment_data.forward_durations(id)
    }

    pub fn uncompressed_reverse_durations(&self, id: PackedGeometryId) -> ReverseRange<'r, SegmentDuration> {
        self.segment_data.reverse_durations(id)
    }

    pub fn uncompressed_forward_datasources(&self, id: PackedGeometryId) -> ForwardRange<'r, DatasourceId> {
        self.segment_data.forward_data_sources(id)
    }

    pub fn uncompressed_reverse_datasources(&self, id: PackedGeometryId) -> ReverseRange<'r, DatasourceId> {
        self.segment_data.reverse_data_sources(id)
    }

    pub fn datasource_name(&self, id: DatasourceId) -> &'r str {
        self.datasources.source_name(id)
    }

    // Turn penalties

    pub fn weight_penalty_for_edge_id(&self, edge: EdgeId) -> TurnPenalty {
        self.turn_weight_penalties[edge as usize]
    }

    pub fn duration_penalty_for_edge_id(&self, edge: EdgeId) -> TurnPenalty {
        self.turn_duration_penalties[edge as usize]
    }

    // Profile properties

    pub fn continue_straight_default(&self) -> bool {
        self.properties.continue_straight_default()
    }

    /// Meters per second
    pub fn map_matching_max_speed(&self) -> f64 {
        self.properties.max_speed_for_map_matching
    }

    pub fn weight_name(&self) -> &'r str {
        self.properties.weight_name()
    }

    pub fn weight_precision(&self) -> u32 {
        self.properties.weight_precision
    }

    pub fn weight_multiplier(&self) -> f64 {
        self.properties.weight_multiplier()
    }

    // Names

    pub fn name_for_id(&self, id: NameId) -> Result<&'r str> {
        Ok(self.names.get()?.name(id))
    }

    pub fn ref_for_id(&self, id: NameId) -> Result<&'r str> {
        Ok(self.names.get()?.reference(id))
    }

    pub fn pronunciation_for_id(&self, id: NameId) -> Result<&'r str> {
        Ok(self.names.get()?.pronunciation(id))
    }

    pub fn destinations_for_id(&self, id: NameId) -> Result<&'r str> {
        Ok(self.names.get()?.destinations(id))
    }

    pub fn exits_for_id(&self, id: NameId) -> Result<&'r str> {
        Ok(self.names.get()?.exits(id))
    }

    // Turn data

    pub fn turn_instruction_for_edge_id(&self, edge: EdgeId) -> Result<TurnInstruction> {
        Ok(self.turn_data.get()?.turn_instruction(edge))
    }

    pub fn pre_turn_bearing(&self, edge: EdgeId) -> Result<TurnBearing> {
        Ok(self.turn_data.get()?.pre_turn_bearing(edge))
    }

    pub fn post_turn_bearing(&self, edge: EdgeId) -> Result<TurnBearing> {
        Ok(self.turn_data.get()?.post_turn_bearing(edge))
    }

    pub fn has_lane_data(&self, edge: EdgeId) -> Result<bool> {
        Ok(self.turn_data.get()?.has_lane_data(edge))
    }

    /// Lane tuple of a turn; only meaningful when [`Self::has_lane_data`] holds
    pub fn lane_data(&self, edge: EdgeId) -> Result<LaneTupleIdPair> {
        let turn_data = self.turn_data.get()?;
        let lanes = self.turn_lanes.get()?;
        debug_assert!(turn_data.has_lane_data(edge));
        Ok(lanes.lane_tuple(turn_data.lane_data_id(edge)))
    }

    /// Lane masks of a description, empty for the invalid id
    pub fn turn_description(&self, id: LaneDescriptionId) -> Result<&'r [TurnLaneMask]> {
        let lanes = self.turn_lanes.get()?;
        if id == INVALID_LANE_DESCRIPTIONID {
            return Ok(&[]);
        }
        Ok(lanes.description(id))
    }

    pub fn entry_class(&self, edge: EdgeId) -> Result<EntryClass> {
        let classes = self.entry_classes.get()?;
        let id = self.turn_data.get()?.entry_class_id(edge);
        Ok(classes[id as usize])
    }

    pub fn bearing_class(&self, node: NodeId) -> Result<BearingClass<'r>> {
        Ok(self.intersection_bearings.get()?.bearing_class(node))
    }

    // Maneuver overrides

    pub fn overrides_that_start_at(&self, node: NodeId) -> Vec<ManeuverOverride> {
        self.maneuver_overrides.starting_at(node)
    }

    // Spatial queries

    /// Snapping queries bound to this facade's exclude combination
    pub fn geospatial_query(&self) -> GeospatialQuery<'r> {
        GeospatialQuery::new(
            self.rtree,
            self.nodes,
            self.node_data,
            self.segment_data,
            self.exclude_mask,
        )
    }

    pub fn edges_in_box(&self, south_west: Coordinate, north_east: Coordinate) -> Vec<EdgeBasedNodeSegment> {
        self.geospatial_query().edges_in_box(south_west, north_east)
    }

    pub fn nearest_phantom_nodes(
        &self,
        input: Coordinate,
        max_results: usize,
        max_distance: Option<f64>,
        bearing: Option<Bearing>,
        approach: Approach,
    ) -> Vec<PhantomNodeWithDistance> {
        self.geospatial_query()
            .nearest_phantom_nodes(input, max_results, max_distance, bearing, approach)
    }

    pub fn nearest_phantom_nodes_in_range(
        &self,
        input: Coordinate,
        max_distance: f64,
        bearing: Option<Bearing>,
        approach: Approach,
        use_all_edges: bool,
    ) -> Vec<PhantomNodeWithDistance> {
        self.geospatial_query()
            .nearest_phantom_nodes_in_range(input, max_distance, bearing, approach, use_all_edges)
    }

    pub fn nearest_candidates_with_alternative_from_big_component(
        &self,
        input: Coordinate,
        max_distance: Option<f64>,
        bearing: Option<Bearing>,
        approach: Approach,
        use_all_edges: bool,
    ) -> PhantomCandidateAlternatives {
        self.geospatial_query().nearest_candidates_with_alternative_from_big_component(
            input,
            max_distance,
            bearing,
            approach,
            use_all_edges,
        )
    }
}

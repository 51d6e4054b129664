//! Per-turn guidance data, indexed by edge-based edge id

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::core::{EdgeId, EntryClassId, FacadeError, LaneDataId, Result, INVALID_LANE_DATAID};
use crate::storage::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize)]
#[repr(C)]
pub struct TurnInstruction {
    pub turn_type: u8,
    pub direction_modifier: u8,
}

/// Bearing discretized to 256 steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct TurnBearing(pub u8);

impl TurnBearing {
    pub fn from_degrees(degrees: f64) -> Self {
        TurnBearing(((degrees.rem_euclid(360.0) * 256.0 / 360.0).round() as u32 % 256) as u8)
    }

    pub fn degrees(self) -> f64 {
        self.0 as f64 * 360.0 / 256.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TurnDataView<'r> {
    turn_instructions: &'r [TurnInstruction],
    lane_data_ids: &'r [LaneDataId],
    entry_class_ids: &'r [EntryClassId],
    pre_turn_bearings: &'r [TurnBearing],
    post_turn_bearings: &'r [TurnBearing],
}

impl<'r> TurnDataView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let view = Self {
            turn_instructions: region.block(&format!("{name}/turn_instructions"))?,
            lane_data_ids: region.block(&format!("{name}/lane_data_ids"))?,
            entry_class_ids: region.block(&format!("{name}/entry_class_ids"))?,
            pre_turn_bearings: region.block(&format!("{name}/pre_turn_bearings"))?,
            post_turn_bearings: region.block(&format!("{name}/post_turn_bearings"))?,
        };
        let n = view.turn_instructions.len();
        if [
            view.lane_data_ids.len(),
            view.entry_class_ids.len(),
            view.pre_turn_bearings.len(),
            view.post_turn_bearings.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(FacadeError::invalid(name, "turn arrays differ in length"));
        }
        Ok(view)
    }

    pub fn turn_instruction(&self, edge: EdgeId) -> TurnInstruction {
        self.turn_instructions[edge as usize]
    }

    pub fn lane_data_id(&self, edge: EdgeId) -> LaneDataId {
        self.lane_data_ids[edge as usize]
    }

    pub fn has_lane_data(&self, edge: EdgeId) -> bool {
        self.lane_data_id(edge) != INVALID_LANE_DATAID
    }

    pub fn entry_class_id(&self, edge: EdgeId) -> EntryClassId {
        self.entry_class_ids[edge as usize]
    }

    pub fn pre_turn_bearing(&self, edge: EdgeId) -> TurnBearing {
        self.pre_turn_bearings[edge as usize]
    }

    pub fn post_turn_bearing(&self, edge: EdgeId) -> TurnBearing {
        self.post_turn_bearings[edge as usize]
    }

    pub fn lane_data_ids(&self) -> &'r [LaneDataId] {
        self.lane_data_ids
    }

    pub fn entry_class_ids(&self) -> &'r [EntryClassId] {
        self.entry_class_ids
    }

    pub fn len(&self) -> usize {
        self.turn_instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turn_instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_bearing_discretization() {
        assert_eq!(TurnBearing::from_degrees(0.0), TurnBearing(0));
        assert_eq!(TurnBearing::from_degrees(90.0), TurnBearing(64));
        assert_eq!(TurnBearing::from_degrees(-90.0), TurnBearing(192));
        assert_eq!(TurnBearing::from_degrees(359.9), TurnBearing(0));
        assert_eq!(TurnBearing(128).degrees(), 180.0);
    }
}

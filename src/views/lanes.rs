//! Turn lane descriptions and lane tuples (`/common/turn_lanes`)

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::core::{FacadeError, LaneDataId, LaneDescriptionId, Result, INVALID_LANE_DESCRIPTIONID};
use crate::storage::Region;

/// Bitmask of lane markings (left, through, right, ...)
pub type TurnLaneMask = u16;

/// Which lanes of a description a turn may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize)]
#[repr(C)]
pub struct LaneTupleIdPair {
    pub lanes_in_turn: u8,
    pub first_lane_from_the_right: u8,
    pub lane_description_id: LaneDescriptionId,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnLanesView<'r> {
    offsets: &'r [u32],
    masks: &'r [TurnLaneMask],
    lane_tuples: &'r [LaneTupleIdPair],
}

impl<'r> TurnLanesView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let offsets = region.block::<u32>(&format!("{name}/offsets"))?;
        let masks = region.block::<TurnLaneMask>(&format!("{name}/masks"))?;
        let lane_tuples = region.block::<LaneTupleIdPair>(&format!("{name}/data"))?;
        let valid = offsets.last().is_some_and(|&last| last as usize == masks.len())
            && offsets.windows(2).all(|w| w[0] <= w[1]);
        if !valid {
            return Err(FacadeError::invalid(name, "lane offsets do not partition the masks"));
        }
        let descriptions = offsets.len() - 1;
        if let Some(tuple) = lane_tuples.iter().find(|tuple| {
            tuple.lane_description_id != INVALID_LANE_DESCRIPTIONID
                && tuple.lane_description_id as usize >= descriptions
        }) {
            return Err(FacadeError::invalid(
                name,
                format!(
                    "lane tuple references description {} of {descriptions}",
                    tuple.lane_description_id
                ),
            ));
        }
        Ok(Self {
            offsets,
            masks,
            lane_tuples,
        })
    }

    /// Lane masks of one description, leftmost lane first
    pub fn description(&self, id: LaneDescriptionId) -> &'r [TurnLaneMask] {
        let id = id as usize;
        &self.masks[self.offsets[id] as usize..self.offsets[id + 1] as usize]
    }

    pub fn lane_tuple(&self, id: LaneDataId) -> LaneTupleIdPair {
        self.lane_tuples[id as usize]
    }

    pub fn number_of_lane_tuples(&self) -> usize {
        self.lane_tuples.len()
    }

    pub fn number_of_descriptions(&self) -> usize {
        self.offsets.len() - 1
    }
}

//! Intersection bearing classes and entry classes

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::core::{FacadeError, NodeId, Result};
use crate::storage::Region;

/// Bearings (whole degrees) of the roads meeting at one intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BearingClass<'r> {
    bearings: &'r [u16],
}

impl<'r> BearingClass<'r> {
    pub fn bearings(&self) -> &'r [u16] {
        self.bearings
    }

    /// Position of `bearing` within the class
    pub fn find_index(&self, bearing: u16) -> Option<usize> {
        self.bearings.binary_search(&bearing).ok()
    }
}

/// Bit `i` tells whether road `i` of the intersection may be entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize)]
#[repr(transparent)]
pub struct EntryClass(pub u32);

impl EntryClass {
    pub fn allows_entry(self, index: usize) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntersectionBearingsView<'r> {
    node_to_class_id: &'r [u32],
    class_offsets: &'r [u32],
    values: &'r [u16],
}

impl<'r> IntersectionBearingsView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let node_to_class_id = region.block::<u32>(&format!("{name}/node_to_class_id"))?;
        let class_offsets = region.block::<u32>(&format!("{name}/class_offsets"))?;
        let values = region.block::<u16>(&format!("{name}/values"))?;

        let valid = class_offsets.last().is_some_and(|&last| last as usize == values.len())
            && class_offsets.windows(2).all(|w| w[0] <= w[1]);
        if !valid {
            return Err(FacadeError::invalid(name, "class offsets do not partition the bearings"));
        }
        let classes = class_offsets.len() - 1;
        if let Some(&id) = node_to_class_id.iter().find(|&&id| id as usize >= classes) {
            return Err(FacadeError::invalid(
                name,
                format!("bearing class {id} out of {classes}"),
            ));
        }
        Ok(Self {
            node_to_class_id,
            class_offsets,
            values,
        })
    }

    pub fn bearing_class(&self, node: NodeId) -> BearingClass<'r> {
        let class = self.node_to_class_id[node as usize] as usize;
        let span = self.class_offsets[class] as usize..self.class_offsets[class + 1] as usize;
        BearingClass {
            bearings: &self.values[span],
        }
    }
}

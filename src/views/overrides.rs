//! Maneuver overrides, sorted by the edge-based node they start at

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::core::{FacadeError, NodeId, Result};
use crate::storage::Region;

/// Stored override; the node sequence is a span of the shared sequence block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct StorageManeuverOverride {
    pub node_sequence_offset_begin: u32,
    pub node_sequence_offset_end: u32,
    pub start_node: NodeId,
    pub instruction_node: NodeId,
    pub override_type: u8,
    pub direction: u8,
    pub _padding: [u8; 2],
}

/// Override handed to guidance, owning its node sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManeuverOverride {
    pub node_sequence: Vec<NodeId>,
    pub instruction_node: NodeId,
    pub override_type: u8,
    pub direction: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct ManeuverOverridesView<'r> {
    overrides: &'r [StorageManeuverOverride],
    node_sequences: &'r [NodeId],
}

impl<'r> ManeuverOverridesView<'r> {
    pub fn load(region: &'r Region, name: &str) -> Result<Self> {
        let overrides = region.block::<StorageManeuverOverride>(&format!("{name}/overrides"))?;
        let node_sequences = region.block::<NodeId>(&format!("{name}/node_sequences"))?;

        if overrides.windows(2).any(|w| w[0].start_node > w[1].start_node) {
            return Err(FacadeError::invalid(name, "overrides are not sorted by start node"));
        }
        let out_of_bounds = overrides.iter().any(|o| {
            o.node_sequence_offset_begin > o.node_sequence_offset_end
                || o.node_sequence_offset_end as usize > node_sequences.len()
        });
        if out_of_bounds {
            return Err(FacadeError::invalid(name, "override node sequence out of bounds"));
        }
        Ok(Self {
            overrides,
            node_sequences,
        })
    }

    /// Every override starting at `node`, in stored order
    pub fn starting_at(&self, node: NodeId) -> Vec<ManeuverOverride> {
        let begin = self.overrides.partition_point(|o| o.start_node < node);
        let end = begin + self.overrides[begin..].partition_point(|o| o.start_node == node);
        self.overrides[begin..end]
            .iter()
            .map(|o| ManeuverOverride {
                node_sequence: self.node_sequences
                    [o.node_sequence_offset_begin as usize..o.node_sequence_offset_end as usize]
                    .to_vec(),
                instruction_node: o.instruction_node,
                override_type: o.override_type,
                direction: o.direction,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Packs overrides into `(overrides, node_sequences)` blocks, stable-sorted by start node
pub fn pack_overrides(mut overrides: Vec<(NodeId, ManeuverOverride)>) -> (Vec<StorageManeuverOverride>, Vec<NodeId>) {
    overrides.sort_by_key(|(start, _)| *start);
    let mut sequences = Vec::new();
    let stored = overrides
        .into_iter()
        .map(|(start_node, o)| {
            let begin = sequences.len() as u32;
            sequences.extend_from_slice(&o.node_sequence);
            StorageManeuverOverride {
                node_sequence_offset_begin: begin,
                node_sequence_offset_end: sequences.len() as u32,
                start_node,
                instruction_node: o.instruction_node,
                override_type: o.override_type,
                direction: o.direction,
                _padding: [0; 2],
            }
        })
        .collect();
    (stored, sequences)
}

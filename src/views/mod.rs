//! Typed, zero-copy views over region datasets
//!
//! Every view is built by a `load(region, name)` constructor that resolves the
//! dataset's sub-blocks, reinterprets them in place and checks that they agree
//! with each other. A view that loads is never re-validated per access.

pub mod bearings;
pub mod bitset;
pub mod ebn;
pub mod lanes;
pub mod names;
pub mod nbn;
pub mod optional;
pub mod overrides;
pub mod properties;
pub mod segment_data;
pub mod turn_data;

pub use bearings::{BearingClass, EntryClass, IntersectionBearingsView};
pub use bitset::{pack_bits, BitsetView};
pub use ebn::{EdgeBasedNode, EdgeBasedNodeDataView, NodeBasedEdgeAnnotation};
pub use lanes::{LaneTupleIdPair, TurnLaneMask, TurnLanesView};
pub use names::{pack_names, NameTableView};
pub use nbn::NodeBasedNodesView;
pub use optional::OptionalDataset;
pub use overrides::{pack_overrides, ManeuverOverride, ManeuverOverridesView, StorageManeuverOverride};
pub use properties::{class_indexes, Datasources, ProfileProperties};
pub use segment_data::SegmentDataView;
pub use turn_data::{TurnBearing, TurnDataView, TurnInstruction};

use crate::core::{EntryClassId, FacadeError, Result};
use crate::storage::Region;

/// Views a timestamp block as text
pub fn timestamp_view<'r>(region: &'r Region, name: &str) -> Result<&'r str> {
    std::str::from_utf8(region.raw_block(name)?).map_err(|e| FacadeError::invalid(name, e.to_string()))
}

/// Views the entry class table
pub fn entry_classes_view<'r>(region: &'r Region, name: &str) -> Result<&'r [EntryClass]> {
    let classes = region.block::<EntryClass>(name)?;
    if classes.len() > EntryClassId::MAX as usize + 1 {
        return Err(FacadeError::invalid(name, "more entry classes than ids"));
    }
    Ok(classes)
}

/// Reads a single `u32` record, such as a connectivity checksum
pub fn checksum_view(region: &Region, name: &str) -> Result<u32> {
    region.value::<u32>(name).copied()
}

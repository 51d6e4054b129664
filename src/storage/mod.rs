//! Region storage: container layout, dataset index and producer-side builder

pub mod builder;
pub mod crc;
pub mod index;
pub mod region;

pub use builder::RegionBuilder;
pub use index::{BlockEntry, DataIndex};
pub use region::{Region, BLOCK_ALIGNMENT};

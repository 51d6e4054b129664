//! # Butterfly-facade Library
//!
//! Zero-copy access to a precomputed road network packed into one contiguous
//! region, for many concurrent query threads.
//!
//! ## Features
//!
//! - **One region, no copies**: every table is a typed view aliasing the region bytes
//! - **Shareable**: regions can be memory-mapped read-only and shared across processes
//! - **Two algorithms**: CH and MLD graphs behind one [`graph::GraphView`] contract
//! - **Optional datasets**: guidance features a build lacks fail with `DatasetDisabled`
//! - **Snapping**: nearest-segment queries over a relocatable packed R-tree
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use butterfly_facade::{Algorithm, AnyFacade, Coordinate, GraphView, Region};
//! use butterfly_facade::spatial::Approach;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let region = Region::open("belgium.bfr")?;
//!     let facade = AnyFacade::new(&region, Algorithm::Mld, "routability", 0)?;
//!
//!     let input = Coordinate::from_degrees(4.3517, 50.8503);
//!     let candidates = facade
//!         .attributes()
//!         .nearest_phantom_nodes(input, 1, Some(100.0), None, Approach::Unrestricted);
//!     println!("{} candidates, graph has {} nodes", candidates.len(), facade.graph().number_of_nodes());
//!     Ok(())
//! }
//! ```
//!
//! ## Building Regions
//!
//! ```rust
//! use butterfly_facade::RegionBuilder;
//!
//! let mut builder = RegionBuilder::new();
//! builder.add("/common/nbn_data/osm_node_ids", &[1u64, 2, 3])?;
//! builder.add_str("/common/timestamp", "2024-01-01T00:00:00Z")?;
//! let region = builder.build()?;
//! assert!(region.exists("/common/nbn_data"));
//! # Ok::<(), butterfly_facade::FacadeError>(())
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod graph;
pub mod spatial;
pub mod storage;
pub mod views;

// Re-export the types most callers need
pub use crate::config::{FacadeConfig, MemoryMode};
pub use crate::core::{Algorithm, Coordinate, FacadeError, Result};
pub use crate::facade::{
    AlgorithmFacade, AnyFacade, BaseFacade, ChDataFacade, ChFacade, MldDataFacade, MldFacade, RoutingDataFacade,
};
pub use crate::graph::GraphView;
pub use crate::storage::{Region, RegionBuilder};

//! Core types shared by every layer of the facade
//!
//! Errors, identifiers and coordinate math. Nothing in here touches the region.

pub mod coordinate;
pub mod error;
pub mod types;

pub use coordinate::{Coordinate, Rectangle};
pub use error::{FacadeError, Result};
pub use types::*;

//! CLI-specific output for butterfly-facade
//!
//! Report types the binary prints, kept apart from the library so the
//! library never decides how anything is displayed.

pub mod report;

pub use report::{print_json, InspectReport, NodeEdges};

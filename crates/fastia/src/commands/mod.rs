//! CLI command implementations.

pub mod import;
pub mod predict;
pub mod runs;
pub mod train;

//! Southern Oscillation Index service.
//!
//! Fetches the Tahiti and Darwin monthly mean sea-level-pressure tables,
//! computes the Troup SOI against the 1941-1980 climatology, and writes the
//! index table plus a chart payload for the renderer.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod stations;
pub mod verify;

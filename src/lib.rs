//! Stager compiles application staging requests into execution-engine
//! task recipes, and task completions back into staging responses.
//!
//! The recipe is a tree of download, run and upload actions. Cache transfers
//! are best-effort; everything else must succeed.

pub mod cli;
pub mod core;
pub mod transport;

//! Library definition for swapwalk.
pub mod acceptance;
pub mod buffers;
pub mod chain;
pub mod config;
pub mod contiguity;
pub mod error;
pub mod graph;
pub mod init;
pub mod plan;
pub mod stats;
pub mod swaps;

//! Statistics for swap chains.

/// Accept/reject counts.
mod counts;
/// Seat-count histograms.
mod seats;
/// I/O for statistics.
mod writers;

pub use crate::stats::counts::ChainCounts;
pub use crate::stats::seats::WinStatistics;
pub use crate::stats::writers::{AssignmentsOnlyWriter, JSONLWriter, StatsWriter, TSVWriter};

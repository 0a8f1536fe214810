//! The condition-to-investment pipeline: six batch stages, each consuming the
//! previous stage's derived rows.

pub mod benefit;
pub mod costing;
pub mod mci;
pub mod ranking;
pub mod segment_rules;
pub mod structure_rules;
pub mod workplan;

use crate::domain::{RoadId, SegmentId};
use std::fmt;

/// Fatal-per-entity failures. In lenient mode these are collected on the
/// batch summary; in strict mode the first one fails the whole run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("no active maintenance rule matches MCI {mci_value:.1} for segment {segment_id}")]
    NoMaintenanceRule {
        segment_id: SegmentId,
        mci_value: f64,
    },
    #[error("no scale band matches value {value} for benefit criterion {criterion}")]
    NoScaleBand { criterion: String, value: f64 },
    #[error(
        "ADT missing for road {road_id} in FY {fiscal_year}: no aggregated traffic survey and no manual override"
    )]
    AdtMissing { road_id: RoadId, fiscal_year: i32 },
}

/// How a batch run treats fatal-per-entity errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Log the failing entity and continue with the next one.
    #[default]
    Lenient,
    /// Propagate the first fatal entity error as a hard run failure.
    Strict,
}

/// Aggregate counts reported by every batch trigger.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub created: usize,
    pub skipped: usize,
    /// Fatal entity errors encountered in lenient mode, with full context.
    pub failures: Vec<PipelineError>,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} created, {} skipped, {} failed",
            self.processed,
            self.created,
            self.skipped,
            self.failures.len()
        )
    }
}

/// Round half away from zero to two decimal places. Money values are rounded
/// exactly once, at the allocation boundary.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

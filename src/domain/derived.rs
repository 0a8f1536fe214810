use super::ids::{RoadId, SegmentId, StructureId, SurveyId};
use super::inventory::SurfaceGroup;
use super::lookups::StructureType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maintenance Condition Index result, keyed by (segment, inspection date).
///
/// Immutable once computed except by recomputation, which upserts on the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MciResult {
    pub segment_id: SegmentId,
    pub survey_id: SurveyId,
    pub inspection_date: NaiveDate,
    /// Weighted composite on a 0–100 scale.
    pub mci_value: f64,
    pub category: Option<String>,
}

/// One recommended work item for a segment. The set for a segment is fully
/// replaced on each recomputation; zero rows means "no intervention needed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecommendation {
    pub segment_id: SegmentId,
    pub mci_value: f64,
    pub work_code: String,
}

/// At most one recommendation per structure per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecommendation {
    pub structure_id: StructureId,
    pub structure_type: StructureType,
    pub condition_code: u8,
    pub work_code: String,
}

/// Weighted benefit composite per road and fiscal year; upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitFactor {
    pub road_id: RoadId,
    pub fiscal_year: i32,
    pub bf1_transport: f64,
    pub bf2_agriculture: f64,
    pub bf3_social: f64,
    pub total: f64,
}

/// Persisted ranking row; unique per (road, fiscal year, cohort), rank dense
/// and 1-based within the cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub road_id: RoadId,
    pub fiscal_year: i32,
    pub cohort: SurfaceGroup,
    pub population_served: f64,
    pub benefit_factor: f64,
    pub cost_of_improvement: f64,
    pub road_index: f64,
    pub rank: u32,
}

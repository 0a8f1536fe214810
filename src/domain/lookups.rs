use super::ids::{RoadId, SectionId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The five rated aspects of a segment condition survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatedAspect {
    Surface,
    DrainageLeft,
    DrainageRight,
    ShoulderLeft,
    ShoulderRight,
}

impl RatedAspect {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Surface,
            Self::DrainageLeft,
            Self::DrainageRight,
            Self::ShoulderLeft,
            Self::ShoulderRight,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::DrainageLeft => "drainage (left)",
            Self::DrainageRight => "drainage (right)",
            Self::ShoulderLeft => "shoulder (left)",
            Self::ShoulderRight => "shoulder (right)",
        }
    }
}

/// Maps a rating code (1–4) to a numeric factor in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionFactor {
    pub rating_code: u8,
    pub factor: f64,
}

/// Effective-dated weights applied to the rated aspects when computing MCI.
///
/// Left/right variants of an aspect share the aspect's weight. Multiple
/// configurations may coexist over time; the one effective on the survey's
/// inspection date applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MciWeightConfig {
    pub effective_from: NaiveDate,
    pub surface_weight: f64,
    pub drainage_weight: f64,
    pub shoulder_weight: f64,
}

impl MciWeightConfig {
    pub fn weight_for(&self, aspect: RatedAspect) -> f64 {
        match aspect {
            RatedAspect::Surface => self.surface_weight,
            RatedAspect::DrainageLeft | RatedAspect::DrainageRight => self.drainage_weight,
            RatedAspect::ShoulderLeft | RatedAspect::ShoulderRight => self.shoulder_weight,
        }
    }
}

/// Threshold band naming an MCI value ("Good", "Fair", "Poor", "Bad").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MciCategoryBand {
    pub name: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Maintenance rule band over MCI values.
///
/// Bands are inclusive and non-overlapping by construction; at most one
/// active band matches a given MCI value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MciMaintenanceRule {
    pub min_mci: f64,
    pub max_mci: f64,
    pub routine: bool,
    pub periodic: bool,
    pub rehabilitation: bool,
    pub active: bool,
}

impl MciMaintenanceRule {
    pub fn matches(&self, mci_value: f64) -> bool {
        self.active && mci_value >= self.min_mci && mci_value <= self.max_mci
    }
}

/// Catalog entry for a maintenance work item, referenced by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub work_code: String,
    pub name: String,
    /// Measurement unit of the unit cost ("km", "m", ...).
    pub unit: String,
    pub unit_cost: f64,
}

/// Structure families recognized by the structure rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    Bridge,
    Culvert,
    Drift,
    VentedDrift,
    Other,
}

impl StructureType {
    /// Fixed normalization of the inventory's free-form category names.
    ///
    /// Unrecognized categories land in the generic `Other` bucket.
    pub fn from_category(category: &str) -> Self {
        let normalized = category.replace('_', " ");
        match normalized.trim().to_ascii_lowercase().as_str() {
            "bridge" => Self::Bridge,
            "culvert" => Self::Culvert,
            "ford" | "drift" => Self::Drift,
            "vented drift" => Self::VentedDrift,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bridge => "bridge",
            Self::Culvert => "culvert",
            Self::Drift => "drift",
            Self::VentedDrift => "vented drift",
            Self::Other => "other",
        }
    }
}

/// Rule keyed by (structure type, condition code); unique per combination.
///
/// Condition code 1 ("Good") intentionally has no rule: good structures need
/// no work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConditionRule {
    pub structure_type: StructureType,
    pub condition_code: u8,
    pub work_code: String,
    pub active: bool,
}

/// Indicator within a benefit category (ADT, trading centres, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitCriterion {
    pub code: String,
    pub category_code: String,
    pub name: String,
    pub weight: f64,
}

/// Range row mapping an indicator value to a score.
///
/// A null bound is open: a missing `min_value` passes any value from below,
/// a missing `max_value` passes any value from above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitScale {
    pub criterion_code: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub score: f64,
}

impl BenefitScale {
    pub fn matches(&self, value: f64) -> bool {
        let min_ok = self.min_value.map_or(true, |min| value >= min);
        let max_ok = self.max_value.map_or(true, |max| value <= max);
        min_ok && max_ok
    }
}

/// Pre-computed score for a road link type; read directly, never through a
/// scale table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTypeScore {
    pub code: String,
    pub name: String,
    pub score: f64,
}

/// Manually maintained socio-economic inputs, one row per road.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSocioEconomic {
    pub road_id: RoadId,
    pub trading_centers: Option<f64>,
    pub villages_connected: Option<f64>,
    pub farmland_percentage: Option<f64>,
    pub cooperative_centers: Option<f64>,
    pub markets_connected: Option<f64>,
    pub health_centers: Option<f64>,
    pub education_centers: Option<f64>,
    pub development_projects: Option<f64>,
    /// Manual ADT, used only when no aggregated traffic survey exists.
    pub adt_override: Option<f64>,
    pub population_override: Option<u64>,
    pub link_type_override: Option<String>,
}

/// Aggregated average daily traffic from the traffic survey subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficAdt {
    pub road_id: RoadId,
    pub fiscal_year: i32,
    pub value: f64,
    pub prepared_at: NaiveDate,
}

/// Manually planned intervention for a section and fiscal year.
///
/// When any of these exist for a section they replace the rule-derived costs
/// for that section entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedIntervention {
    pub section_id: SectionId,
    pub fiscal_year: i32,
    pub intervention_code: String,
    pub category: String,
    pub estimated_cost: f64,
}

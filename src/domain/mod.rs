mod derived;
mod ids;
mod inventory;
mod lookups;
mod survey;

pub use derived::{
    BenefitFactor, MciResult, RankingRow, SegmentRecommendation, StructureRecommendation,
};
pub use ids::{RoadId, SectionId, SegmentId, StructureId, SurveyId};
pub use inventory::{Road, RoadSection, RoadSegment, Structure, SurfaceGroup};
pub use lookups::{
    BenefitCriterion, BenefitScale, ConditionFactor, LinkTypeScore,
    MciCategoryBand, MciMaintenanceRule, MciWeightConfig, PlannedIntervention, RatedAspect,
    RoadSocioEconomic, StructureConditionRule, StructureType, TrafficAdt, WorkItem,
};
pub use survey::{ConditionSurvey, StructureConditionSurvey};

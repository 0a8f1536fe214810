use super::ids::{SegmentId, StructureId, SurveyId};
use super::lookups::RatedAspect;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One condition inspection of a road segment.
///
/// Each rated aspect holds a rating code (1 = Good .. 4 = Bad) resolved
/// through the condition factor lookup. Aspects the segment does not
/// physically have (e.g. no left ditch) are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSurvey {
    pub id: SurveyId,
    pub segment_id: SegmentId,
    pub inspection_date: NaiveDate,
    pub surface: Option<u8>,
    pub drainage_left: Option<u8>,
    pub drainage_right: Option<u8>,
    pub shoulder_left: Option<u8>,
    pub shoulder_right: Option<u8>,
    #[serde(default)]
    pub has_bottleneck: bool,
}

impl ConditionSurvey {
    /// Rated aspects present on this survey, in the fixed aspect order.
    pub fn rated_aspects(&self) -> impl Iterator<Item = (RatedAspect, u8)> + '_ {
        RatedAspect::ordered()
            .into_iter()
            .filter_map(move |aspect| self.rating_for(aspect).map(|code| (aspect, code)))
    }

    pub fn rating_for(&self, aspect: RatedAspect) -> Option<u8> {
        match aspect {
            RatedAspect::Surface => self.surface,
            RatedAspect::DrainageLeft => self.drainage_left,
            RatedAspect::DrainageRight => self.drainage_right,
            RatedAspect::ShoulderLeft => self.shoulder_left,
            RatedAspect::ShoulderRight => self.shoulder_right,
        }
    }
}

/// One condition inspection of a structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConditionSurvey {
    pub id: SurveyId,
    pub structure_id: StructureId,
    pub inspection_date: NaiveDate,
    /// Primary condition code (1 = Good .. 4 = Bad).
    pub condition_code: Option<u8>,
    /// Secondary rating used when the primary code was not captured.
    pub condition_rating: Option<u8>,
}

impl StructureConditionSurvey {
    pub fn effective_condition_code(&self) -> Option<u8> {
        self.condition_code.or(self.condition_rating)
    }
}

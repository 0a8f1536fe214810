//! Maintenance Condition Index computation.
//!
//! Each rated aspect of the latest survey maps through the condition factor
//! lookup to a value in [0, 1]; the weighted arithmetic mean of the factors
//! that are present, scaled to 0–100, is the segment's MCI.

use super::BatchSummary;
use crate::domain::{ConditionSurvey, MciResult, MciWeightConfig};
use crate::store::PlanningStore;
use chrono::Datelike;
use tracing::{debug, info, warn};

/// Recompute MCI results for every segment whose latest survey falls in the
/// fiscal year. Segments without a survey are silently skipped; segments
/// whose survey date resolves no weight configuration are skipped with a
/// warning.
pub fn recompute_mci(store: &mut PlanningStore, fiscal_year: i32) -> BatchSummary {
    let mut summary = BatchSummary::default();

    let segment_ids: Vec<_> = store.segments().map(|segment| segment.id).collect();
    for segment_id in segment_ids {
        summary.processed += 1;

        let Some(survey) = store.latest_condition_survey(segment_id).cloned() else {
            summary.skipped += 1;
            continue;
        };
        if survey.inspection_date.year() != fiscal_year {
            summary.skipped += 1;
            continue;
        }

        let Some(config) = store.weight_config_for(survey.inspection_date).cloned() else {
            warn!(
                segment = %segment_id,
                date = %survey.inspection_date,
                "no MCI weight configuration effective on survey date; segment skipped"
            );
            summary.skipped += 1;
            continue;
        };

        let Some(mci_value) = weighted_index(store, &survey, &config) else {
            debug!(segment = %segment_id, "survey has no resolvable rated aspects");
            summary.skipped += 1;
            continue;
        };

        let category = store.classify_mci(mci_value).map(str::to_string);
        store.upsert_mci_result(MciResult {
            segment_id,
            survey_id: survey.id,
            inspection_date: survey.inspection_date,
            mci_value,
            category,
        });
        summary.created += 1;
    }

    info!(fiscal_year, %summary, "MCI recomputation finished");
    summary
}

/// Weighted mean of the present aspect factors on a 0–100 scale, rounded to
/// one decimal place. Absent aspects are omitted, not zeroed.
fn weighted_index(
    store: &PlanningStore,
    survey: &ConditionSurvey,
    config: &MciWeightConfig,
) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (aspect, rating_code) in survey.rated_aspects() {
        let Some(factor) = store.condition_factor(rating_code) else {
            warn!(
                segment = %survey.segment_id,
                aspect = aspect.label(),
                rating_code,
                "rating code has no condition factor lookup row; aspect omitted"
            );
            continue;
        };
        let weight = config.weight_for(aspect);
        weighted_sum += factor * weight;
        weight_total += weight;
    }

    if weight_total <= 0.0 {
        return None;
    }

    let index = weighted_sum / weight_total * 100.0;
    Some((index * 10.0).round() / 10.0)
}

//! Structure intervention rule engine.
//!
//! Unlike the segment engine, a missing rule here is not fatal: the structure
//! simply gets no recommendation and a warning is logged. That asymmetry is
//! intentional business policy.

use super::BatchSummary;
use crate::domain::{StructureRecommendation, StructureType};
use crate::store::PlanningStore;
use tracing::{info, warn};

/// Recompute the recommendation (at most one) for every structure.
pub fn recompute_structure_interventions(store: &mut PlanningStore) -> BatchSummary {
    let mut summary = BatchSummary::default();

    let structures: Vec<_> = store
        .structures()
        .map(|structure| (structure.id, StructureType::from_category(&structure.category)))
        .collect();

    for (structure_id, structure_type) in structures {
        summary.processed += 1;

        let condition_code = store.latest_structure_condition(structure_id);

        // Condition 1 ("Good") never needs work: clear and move on before any
        // rule lookup.
        let Some(condition_code) = condition_code.filter(|&code| code != 1) else {
            store.replace_structure_recommendations(structure_id, Vec::new());
            summary.skipped += 1;
            continue;
        };

        let Some(rule) = store.structure_rule(structure_type, condition_code) else {
            warn!(
                structure = %structure_id,
                structure_type = structure_type.label(),
                condition_code,
                "no active structure intervention rule; no recommendation emitted"
            );
            store.replace_structure_recommendations(structure_id, Vec::new());
            summary.skipped += 1;
            continue;
        };
        let work_code = rule.work_code.clone();

        // Same degrade as the segment engine: a rule pointing at a missing
        // catalog item yields nothing.
        let rows = if store.work_item(&work_code).is_some() {
            vec![StructureRecommendation {
                structure_id,
                structure_type,
                condition_code,
                work_code,
            }]
        } else {
            Vec::new()
        };

        summary.created += rows.len();
        store.replace_structure_recommendations(structure_id, rows);
    }

    info!(%summary, "structure intervention recomputation finished");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        RoadId, Structure, StructureConditionRule, StructureConditionSurvey, StructureId,
        SurveyId, WorkItem,
    };
    use chrono::NaiveDate;

    fn store_with_structure(category: &str) -> PlanningStore {
        let mut store = PlanningStore::new();
        store.insert_structure(Structure {
            id: StructureId(1),
            road_id: RoadId(1),
            section_id: None,
            category: category.to_string(),
            bridge_length_m: None,
            culvert_span_m: None,
            start_chainage_km: None,
            end_chainage_km: None,
            line_length_km: None,
        });
        store.insert_work_item(WorkItem {
            work_code: "103".to_string(),
            name: "bridge repair".to_string(),
            unit: "m".to_string(),
            unit_cost: 500.0,
        });
        store.insert_structure_rule(StructureConditionRule {
            structure_type: StructureType::Bridge,
            condition_code: 3,
            work_code: "103".to_string(),
            active: true,
        });
        store
    }

    fn with_condition(store: &mut PlanningStore, code: Option<u8>, rating: Option<u8>) {
        store.insert_structure_survey(StructureConditionSurvey {
            id: SurveyId(1),
            structure_id: StructureId(1),
            inspection_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            condition_code: code,
            condition_rating: rating,
        });
    }

    #[test]
    fn good_condition_short_circuits_regardless_of_rules() {
        let mut store = store_with_structure("bridge");
        // Even an active rule matching condition 1 must never fire.
        store.insert_structure_rule(StructureConditionRule {
            structure_type: StructureType::Bridge,
            condition_code: 1,
            work_code: "103".to_string(),
            active: true,
        });
        with_condition(&mut store, Some(1), None);

        let summary = recompute_structure_interventions(&mut store);
        assert_eq!(summary.created, 0);
        assert!(store.structure_recommendations().is_empty());
    }

    #[test]
    fn matching_rule_emits_exactly_one_recommendation() {
        let mut store = store_with_structure("bridge");
        with_condition(&mut store, Some(3), None);

        let summary = recompute_structure_interventions(&mut store);
        assert_eq!(summary.created, 1);

        let rec = &store.structure_recommendations()[0];
        assert_eq!(rec.work_code, "103");
        assert_eq!(rec.structure_type, StructureType::Bridge);
        assert_eq!(rec.condition_code, 3);
    }

    #[test]
    fn rating_field_is_used_when_primary_code_is_absent() {
        let mut store = store_with_structure("bridge");
        with_condition(&mut store, None, Some(3));

        let summary = recompute_structure_interventions(&mut store);
        assert_eq!(summary.created, 1);
    }

    #[test]
    fn missing_rule_is_non_fatal_and_clears_stale_rows() {
        let mut store = store_with_structure("gabion wall");
        with_condition(&mut store, Some(3), None);
        store.replace_structure_recommendations(
            StructureId(1),
            vec![StructureRecommendation {
                structure_id: StructureId(1),
                structure_type: StructureType::Other,
                condition_code: 4,
                work_code: "103".to_string(),
            }],
        );

        let summary = recompute_structure_interventions(&mut store);
        assert!(summary.is_clean());
        assert_eq!(summary.skipped, 1);
        assert!(store.structure_recommendations().is_empty());
    }

    #[test]
    fn structure_without_any_survey_is_skipped() {
        let mut store = store_with_structure("bridge");
        let summary = recompute_structure_interventions(&mut store);
        assert_eq!(summary.skipped, 1);
    }
}

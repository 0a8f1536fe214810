//! Segment intervention rule engine.
//!
//! Matches each segment's latest MCI against the maintenance rule bands and
//! fully replaces the segment's recommendation set. Rehabilitation supersedes
//! everything else; the bottleneck override only applies when rehabilitation
//! was not selected.

use super::{BatchSummary, PipelineError, RunMode};
use crate::domain::{SegmentId, SegmentRecommendation};
use crate::store::PlanningStore;
use tracing::{info, warn};

const ROUTINE_CODE: &str = "01";
const PERIODIC_CODE: &str = "02";
const REHABILITATION_CODE: &str = "05";
const BOTTLENECK_ROAD_CODES: [&str; 2] = ["101", "102"];

/// Recompute intervention recommendations for every segment.
///
/// A segment whose MCI matches no active rule band is a fatal condition for
/// that segment: its previous recommendation set is left untouched and the
/// error is collected (lenient) or propagated (strict).
pub fn recompute_segment_interventions(
    store: &mut PlanningStore,
    mode: RunMode,
) -> Result<BatchSummary, PipelineError> {
    let mut summary = BatchSummary::default();

    let segment_ids: Vec<_> = store.segments().map(|segment| segment.id).collect();
    for segment_id in segment_ids {
        summary.processed += 1;

        let Some(mci_value) = store
            .latest_mci_result(segment_id)
            .map(|result| result.mci_value)
        else {
            // No MCI yet: nothing to recommend, and any stale rows go away.
            store.replace_segment_recommendations(segment_id, Vec::new());
            summary.skipped += 1;
            continue;
        };

        let codes = match recommended_codes(store, segment_id, mci_value) {
            Ok(codes) => codes,
            Err(error) => match mode {
                RunMode::Strict => return Err(error),
                RunMode::Lenient => {
                    warn!(segment = %segment_id, %error, "segment intervention aborted");
                    summary.failures.push(error);
                    continue;
                }
            },
        };

        // Codes without a catalog entry are dropped, not reported.
        let rows: Vec<SegmentRecommendation> = codes
            .into_iter()
            .filter(|code| store.work_item(code).is_some())
            .map(|code| SegmentRecommendation {
                segment_id,
                mci_value,
                work_code: code,
            })
            .collect();

        summary.created += rows.len();
        store.replace_segment_recommendations(segment_id, rows);
    }

    info!(%summary, "segment intervention recomputation finished");
    Ok(summary)
}

/// Derive the ordered, deduplicated work codes for one segment.
fn recommended_codes(
    store: &PlanningStore,
    segment_id: SegmentId,
    mci_value: f64,
) -> Result<Vec<String>, PipelineError> {
    let rule = store
        .maintenance_rule_for(mci_value)
        .ok_or(PipelineError::NoMaintenanceRule {
            segment_id,
            mci_value,
        })?;

    // Rehabilitation supersedes routine, periodic, and the bottleneck
    // override alike.
    if rule.rehabilitation {
        return Ok(vec![REHABILITATION_CODE.to_string()]);
    }

    let mut codes = Vec::new();
    if rule.routine {
        codes.push(ROUTINE_CODE.to_string());
    }
    if rule.periodic {
        codes.push(PERIODIC_CODE.to_string());
    }

    if segment_has_bottleneck(store, segment_id) {
        for code in BOTTLENECK_ROAD_CODES {
            if !codes.iter().any(|existing| existing == code) {
                codes.push(code.to_string());
            }
        }
    }

    Ok(codes)
}

fn segment_has_bottleneck(store: &PlanningStore, segment_id: SegmentId) -> bool {
    store
        .latest_condition_survey(segment_id)
        .map(|survey| survey.has_bottleneck)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConditionSurvey, MciMaintenanceRule, MciResult, RoadSegment, SectionId, SurveyId, WorkItem,
    };
    use chrono::NaiveDate;

    fn seeded_store() -> PlanningStore {
        let mut store = PlanningStore::new();
        store.insert_segment(RoadSegment {
            id: SegmentId(1),
            section_id: SectionId(1),
            length_km: Some(1.0),
            station_from_km: None,
            station_to_km: None,
            geometry_length_km: None,
        });
        for code in ["01", "02", "05", "101", "102"] {
            store.insert_work_item(WorkItem {
                work_code: code.to_string(),
                name: format!("work {code}"),
                unit: "km".to_string(),
                unit_cost: 100.0,
            });
        }
        // Good roads need nothing, poor roads routine+periodic, bad roads
        // full rehabilitation.
        store.insert_maintenance_rule(MciMaintenanceRule {
            min_mci: 60.0,
            max_mci: 100.0,
            routine: false,
            periodic: false,
            rehabilitation: false,
            active: true,
        });
        store.insert_maintenance_rule(MciMaintenanceRule {
            min_mci: 30.0,
            max_mci: 59.9,
            routine: true,
            periodic: true,
            rehabilitation: false,
            active: true,
        });
        store.insert_maintenance_rule(MciMaintenanceRule {
            min_mci: 0.0,
            max_mci: 29.9,
            routine: true,
            periodic: true,
            rehabilitation: true,
            active: true,
        });
        store
    }

    fn with_mci(store: &mut PlanningStore, mci_value: f64, has_bottleneck: bool) {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        store.insert_condition_survey(ConditionSurvey {
            id: SurveyId(1),
            segment_id: SegmentId(1),
            inspection_date: date,
            surface: Some(2),
            drainage_left: None,
            drainage_right: None,
            shoulder_left: None,
            shoulder_right: None,
            has_bottleneck,
        });
        store.upsert_mci_result(MciResult {
            segment_id: SegmentId(1),
            survey_id: SurveyId(1),
            inspection_date: date,
            mci_value,
            category: None,
        });
    }

    fn codes(store: &PlanningStore) -> Vec<&str> {
        store
            .segment_recommendations()
            .iter()
            .map(|rec| rec.work_code.as_str())
            .collect()
    }

    #[test]
    fn rehabilitation_supersedes_bottleneck() {
        let mut store = seeded_store();
        with_mci(&mut store, 15.0, true);

        recompute_segment_interventions(&mut store, RunMode::Strict).unwrap();
        assert_eq!(codes(&store), vec!["05"]);
    }

    #[test]
    fn bottleneck_codes_are_appended_for_non_rehab_rules() {
        let mut store = seeded_store();
        with_mci(&mut store, 42.0, true);

        recompute_segment_interventions(&mut store, RunMode::Strict).unwrap();
        assert_eq!(codes(&store), vec!["01", "02", "101", "102"]);
    }

    #[test]
    fn zero_recommendations_is_a_valid_outcome() {
        let mut store = seeded_store();
        with_mci(&mut store, 85.0, false);
        // Seed a stale row that must be cleared by the rerun.
        store.replace_segment_recommendations(
            SegmentId(1),
            vec![SegmentRecommendation {
                segment_id: SegmentId(1),
                mci_value: 10.0,
                work_code: "05".to_string(),
            }],
        );

        let summary = recompute_segment_interventions(&mut store, RunMode::Strict).unwrap();
        assert_eq!(summary.created, 0);
        assert!(store.segment_recommendations().is_empty());
    }

    #[test]
    fn no_matching_rule_is_fatal_for_the_segment() {
        let mut store = seeded_store();
        with_mci(&mut store, 42.0, false);
        // Shadow the seeded bands with a gap around 42.
        let mut gapped = PlanningStore::new();
        gapped.insert_segment(RoadSegment {
            id: SegmentId(1),
            section_id: SectionId(1),
            length_km: Some(1.0),
            station_from_km: None,
            station_to_km: None,
            geometry_length_km: None,
        });
        gapped.insert_maintenance_rule(MciMaintenanceRule {
            min_mci: 60.0,
            max_mci: 100.0,
            routine: false,
            periodic: false,
            rehabilitation: false,
            active: true,
        });
        with_mci(&mut gapped, 42.0, false);

        let err = recompute_segment_interventions(&mut gapped, RunMode::Strict).unwrap_err();
        assert_eq!(
            err,
            PipelineError::NoMaintenanceRule {
                segment_id: SegmentId(1),
                mci_value: 42.0
            }
        );

        let summary = recompute_segment_interventions(&mut gapped, RunMode::Lenient).unwrap();
        assert_eq!(summary.failures.len(), 1);
    }

    #[test]
    fn codes_without_catalog_entries_are_dropped() {
        // A catalog that never had the bottleneck items.
        let mut store = PlanningStore::new();
        store.insert_segment(RoadSegment {
            id: SegmentId(1),
            section_id: SectionId(1),
            length_km: Some(1.0),
            station_from_km: None,
            station_to_km: None,
            geometry_length_km: None,
        });
        for code in ["01", "02"] {
            store.insert_work_item(WorkItem {
                work_code: code.to_string(),
                name: format!("work {code}"),
                unit: "km".to_string(),
                unit_cost: 100.0,
            });
        }
        store.insert_maintenance_rule(MciMaintenanceRule {
            min_mci: 30.0,
            max_mci: 59.9,
            routine: true,
            periodic: true,
            rehabilitation: false,
            active: true,
        });
        with_mci(&mut store, 42.0, true);

        recompute_segment_interventions(&mut store, RunMode::Strict).unwrap();
        assert_eq!(codes(&store), vec!["01", "02"]);
    }
}

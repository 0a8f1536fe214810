//! Workplan allocation.
//!
//! Walks a cohort's ranking in order and funds roads greedily against a
//! budget cap. The road that crosses the budget boundary may be funded
//! partially: every cost bucket is scaled by the same factor so the funded
//! amounts keep their original proportions.

use super::costing::{self, CostBuckets};
use super::round2;
use crate::domain::{RoadId, SurfaceGroup};
use crate::store::PlanningStore;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundingStatus {
    Full,
    Partial,
}

/// One funded road in the plan, in rank order.
#[derive(Debug, Clone, Serialize)]
pub struct WorkplanEntry {
    pub road_id: RoadId,
    pub identifier: String,
    pub rank: u32,
    pub road_cost: f64,
    pub funded: CostBuckets,
    pub funded_amount: f64,
    pub selection_factor: f64,
    pub status: FundingStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Workplan {
    pub fiscal_year: i32,
    pub cohort: Option<SurfaceGroup>,
    /// `None` means an unbounded budget: every costed road is funded in full.
    pub budget_cap: Option<f64>,
    pub allocated: f64,
    pub entries: Vec<WorkplanEntry>,
}

/// Allocate `budget_cap` over the ranked roads of `cohort` (or both cohorts
/// in rank order when `None`). `allow_partial` controls whether the boundary
/// road gets scaled funding or the walk stops before it.
pub fn compute_workplan(
    store: &PlanningStore,
    fiscal_year: i32,
    cohort: Option<SurfaceGroup>,
    budget_cap: Option<f64>,
    allow_partial: bool,
) -> Workplan {
    let costs = costing::road_cost_totals(store, fiscal_year);

    let mut remaining = budget_cap.unwrap_or(f64::INFINITY);
    let mut entries = Vec::new();

    for row in store.ranked_roads(fiscal_year, cohort) {
        let identifier = store
            .road(row.road_id)
            .map(|road| road.identifier.clone())
            .unwrap_or_default();
        let Some(buckets) = costs.get(&row.road_id) else {
            continue;
        };
        let road_cost = buckets.total();
        if road_cost <= 0.0 {
            continue;
        }

        if road_cost <= remaining {
            // The running budget is never rounded mid-walk; rounding happens
            // per bucket at the partial boundary only.
            remaining -= road_cost;
            entries.push(WorkplanEntry {
                road_id: row.road_id,
                identifier,
                rank: row.rank,
                road_cost,
                funded: *buckets,
                funded_amount: road_cost,
                selection_factor: 1.0,
                status: FundingStatus::Full,
            });
            if remaining <= 0.0 {
                break;
            }
            continue;
        }

        // Boundary road: costs more than what is left.
        if allow_partial && remaining > 0.0 {
            let factor = remaining / road_cost;
            let funded = buckets.scaled(factor);
            let funded_amount = funded.total();
            entries.push(WorkplanEntry {
                road_id: row.road_id,
                identifier,
                rank: row.rank,
                road_cost,
                funded,
                funded_amount,
                selection_factor: factor,
                status: FundingStatus::Partial,
            });
        } else {
            warn!(
                road = %identifier,
                rank = row.rank,
                remaining,
                road_cost,
                "budget exhausted; road not funded"
            );
        }
        break;
    }

    let allocated = round2(entries.iter().map(|entry| entry.funded_amount).sum());
    info!(
        fiscal_year,
        budget_cap = budget_cap.unwrap_or(f64::INFINITY),
        allocated,
        funded_roads = entries.len(),
        "workplan allocation finished"
    );

    Workplan {
        fiscal_year,
        cohort,
        budget_cap,
        allocated,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RankingRow;

    /// Store with one unpaved road per length, costed at 10.0/km through a
    /// single routine work item, ranked in insertion order.
    fn store_with_road_lengths(lengths: &[f64]) -> PlanningStore {
        use crate::domain::{
            MciResult, Road, RoadSection, RoadSegment, SectionId, SegmentId,
            SegmentRecommendation, SurveyId, WorkItem,
        };
        use chrono::NaiveDate;

        let mut store = PlanningStore::new();
        store.insert_work_item(WorkItem {
            work_code: "01".to_string(),
            name: "routine maintenance".to_string(),
            unit: "km".to_string(),
            unit_cost: 10.0,
        });

        for (offset, &length_km) in lengths.iter().enumerate() {
            let idx = offset as u64 + 1;
            store.insert_road(Road {
                id: RoadId(idx),
                identifier: format!("R-{idx:03}"),
                surface_type: "Earth".to_string(),
                population_served: Some(1000),
                link_type_code: None,
                total_length_km: Some(length_km),
            });
            store.insert_section(RoadSection {
                id: SectionId(idx),
                road_id: RoadId(idx),
                section_number: 1,
                start_chainage_km: Some(0.0),
                end_chainage_km: Some(length_km),
                length_km: Some(length_km),
            });
            store.insert_segment(RoadSegment {
                id: SegmentId(idx),
                section_id: SectionId(idx),
                length_km: Some(length_km),
                station_from_km: None,
                station_to_km: None,
                geometry_length_km: None,
            });
            store.upsert_mci_result(MciResult {
                segment_id: SegmentId(idx),
                survey_id: SurveyId(idx),
                inspection_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
                mci_value: 40.0,
                category: None,
            });
            store.replace_segment_recommendations(
                SegmentId(idx),
                vec![SegmentRecommendation {
                    segment_id: SegmentId(idx),
                    mci_value: 40.0,
                    work_code: "01".to_string(),
                }],
            );
        }

        store.replace_ranking_cohort(
            2025,
            SurfaceGroup::Unpaved,
            (1..=lengths.len() as u64)
                .map(|idx| RankingRow {
                    road_id: RoadId(idx),
                    fiscal_year: 2025,
                    cohort: SurfaceGroup::Unpaved,
                    population_served: 1000.0,
                    benefit_factor: 10.0,
                    cost_of_improvement: 0.0,
                    road_index: 100.0 - idx as f64,
                    rank: idx as u32,
                })
                .collect(),
        );
        store
    }

    /// Three unpaved roads costing 100, 80 and 60, ranked in that order.
    fn seeded_store() -> PlanningStore {
        store_with_road_lengths(&[10.0, 8.0, 6.0])
    }

    #[test]
    fn boundary_road_is_partially_funded_and_total_hits_the_cap() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(190.0), true);

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(plan.entries[0].status, FundingStatus::Full);
        assert_eq!(plan.entries[1].status, FundingStatus::Full);
        assert_eq!(plan.entries[2].status, FundingStatus::Partial);
        assert!((plan.entries[2].selection_factor - 10.0 / 60.0).abs() < 1e-9);
        assert_eq!(plan.entries[2].funded_amount, 10.0);
        assert_eq!(plan.allocated, 190.0);
    }

    #[test]
    fn partial_funding_can_be_disabled() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(190.0), false);

        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.allocated, 180.0);
        assert!(plan
            .entries
            .iter()
            .all(|entry| entry.status == FundingStatus::Full));
    }

    #[test]
    fn exact_fit_funds_fully_and_stops() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(180.0), true);

        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[1].status, FundingStatus::Full);
        assert_eq!(plan.allocated, 180.0);
    }

    #[test]
    fn budget_larger_than_every_road_funds_the_whole_cohort() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(1000.0), true);

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(plan.allocated, 240.0);
    }

    #[test]
    fn running_budget_keeps_sub_cent_precision_between_roads() {
        // First road costs 33.335, leaving a sub-cent fraction of a 40.0 cap
        // for the 10.0 boundary road.
        let store = store_with_road_lengths(&[3.3335, 1.0]);
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(40.0), true);

        assert_eq!(plan.entries.len(), 2);
        let partial = &plan.entries[1];
        assert_eq!(partial.status, FundingStatus::Partial);
        let expected = (40.0 - plan.entries[0].road_cost) / partial.road_cost;
        assert!((partial.selection_factor - expected).abs() < 1e-12);
        // A budget rounded to 6.67 after the first road would inflate this.
        assert!((partial.selection_factor - 0.6665).abs() < 1e-9);
    }

    #[test]
    fn no_cap_means_everything_is_funded_in_full() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), None, true);

        assert_eq!(plan.entries.len(), 3);
        assert_eq!(plan.allocated, 240.0);
        assert!(plan
            .entries
            .iter()
            .all(|entry| entry.status == FundingStatus::Full));
    }

    #[test]
    fn zero_budget_funds_nothing() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(0.0), true);
        assert!(plan.entries.is_empty());
        assert_eq!(plan.allocated, 0.0);
    }

    #[test]
    fn partial_buckets_keep_their_proportions_at_two_decimals() {
        let store = seeded_store();
        let plan = compute_workplan(&store, 2025, Some(SurfaceGroup::Unpaved), Some(190.0), true);

        let partial = &plan.entries[2];
        // All cost sits in the routine bucket, so the scaled bucket equals
        // the funded amount.
        assert_eq!(partial.funded.rm_cost, 10.0);
        assert_eq!(partial.funded.pm_cost, 0.0);
    }
}

//! Road ranking.
//!
//! `road_index = population x benefit / cost`, computed per road and ranked
//! within the two surface cohorts. Ranks are dense, 1-based, and fully
//! replaced per (fiscal year, cohort) on every run.

use super::costing;
use super::BatchSummary;
use crate::domain::{RankingRow, SurfaceGroup};
use crate::store::PlanningStore;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Compute and persist rankings for both cohorts of a fiscal year.
pub fn compute_road_ranking(store: &mut PlanningStore, fiscal_year: i32) -> BatchSummary {
    let mut summary = BatchSummary::default();

    let cost_totals = costing::road_cost_totals(store, fiscal_year);

    let mut cohorts: BTreeMap<SurfaceGroup, Vec<(String, RankingRow)>> = BTreeMap::new();
    cohorts.insert(SurfaceGroup::Paved, Vec::new());
    cohorts.insert(SurfaceGroup::Unpaved, Vec::new());

    for road in store.roads() {
        summary.processed += 1;

        let population = store
            .socio_economic(road.id)
            .and_then(|socio| socio.population_override)
            .or(road.population_served)
            .unwrap_or(0) as f64;
        let benefit = store
            .benefit_factor(road.id, fiscal_year)
            .map(|factor| factor.total)
            .unwrap_or(0.0);
        let cost = cost_totals
            .get(&road.id)
            .map(|buckets| buckets.total())
            .unwrap_or(0.0);

        let road_index = if cost > 0.0 {
            population * benefit / cost
        } else {
            warn!(
                road = %road.identifier,
                "cost of improvement missing or non-positive; road index set to 0"
            );
            0.0
        };

        let cohort = road.surface_group();
        cohorts.entry(cohort).or_default().push((
            road.identifier.clone(),
            RankingRow {
                road_id: road.id,
                fiscal_year,
                cohort,
                population_served: population,
                benefit_factor: benefit,
                cost_of_improvement: cost,
                road_index,
                rank: 0,
            },
        ));
    }

    for (cohort, mut rows) in cohorts {
        // Descending by index; ties go to the lexicographically smaller road
        // identifier so reruns are deterministic.
        rows.sort_by(|(id_a, row_a), (id_b, row_b)| {
            row_b
                .road_index
                .partial_cmp(&row_a.road_index)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });

        let ranked: Vec<RankingRow> = rows
            .into_iter()
            .enumerate()
            .map(|(idx, (_, mut row))| {
                row.rank = idx as u32 + 1;
                row
            })
            .collect();

        summary.created += ranked.len();
        store.replace_ranking_cohort(fiscal_year, cohort, ranked);
    }

    info!(fiscal_year, %summary, "road ranking finished");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BenefitFactor, Road, RoadId};

    fn road(id: u64, identifier: &str, surface: &str, population: u64) -> Road {
        Road {
            id: RoadId(id),
            identifier: identifier.to_string(),
            surface_type: surface.to_string(),
            population_served: Some(population),
            link_type_code: None,
            total_length_km: Some(10.0),
        }
    }

    fn benefit(road_id: u64, total: f64) -> BenefitFactor {
        BenefitFactor {
            road_id: RoadId(road_id),
            fiscal_year: 2025,
            bf1_transport: total,
            bf2_agriculture: 0.0,
            bf3_social: 0.0,
            total,
        }
    }

    #[test]
    fn zero_cost_roads_rank_with_index_zero() {
        let mut store = PlanningStore::new();
        store.insert_road(road(1, "R-001", "Earth", 5000));
        store.upsert_benefit_factor(benefit(1, 40.0));

        let summary = compute_road_ranking(&mut store, 2025);
        assert!(summary.is_clean());

        let rows = store.ranked_roads(2025, Some(SurfaceGroup::Unpaved));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].road_index, 0.0);
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn ties_break_by_lexicographic_identifier() {
        let mut store = PlanningStore::new();
        // Identical population/benefit and no cost means identical (zero)
        // indices for all three.
        store.insert_road(road(3, "R-030", "Earth", 1000));
        store.insert_road(road(1, "R-002", "Earth", 1000));
        store.insert_road(road(2, "R-010", "Earth", 1000));

        compute_road_ranking(&mut store, 2025);

        let rows = store.ranked_roads(2025, Some(SurfaceGroup::Unpaved));
        let order: Vec<&str> = rows
            .iter()
            .map(|row| {
                store
                    .road(row.road_id)
                    .map(|road| road.identifier.as_str())
                    .unwrap_or("")
            })
            .collect();
        assert_eq!(order, vec!["R-002", "R-010", "R-030"]);
        assert_eq!(
            rows.iter().map(|row| row.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn cohorts_are_ranked_independently_and_replaced_wholesale() {
        let mut store = PlanningStore::new();
        store.insert_road(road(1, "P-001", "Paved", 1000));
        store.insert_road(road(2, "U-001", "Gravel", 1000));

        compute_road_ranking(&mut store, 2025);
        compute_road_ranking(&mut store, 2025);

        assert_eq!(store.ranked_roads(2025, Some(SurfaceGroup::Paved)).len(), 1);
        assert_eq!(store.ranked_roads(2025, Some(SurfaceGroup::Unpaved)).len(), 1);
        assert_eq!(store.ranking_rows().len(), 2);
    }
}

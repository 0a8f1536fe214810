//! Costing and SRAD bucketing.
//!
//! Every recommendation (or manually planned intervention) lands in exactly
//! one of the five standard cost buckets per road section; section totals
//! roll up to the road totals consumed by ranking and the workplan.

use crate::domain::{RoadId, SectionId, Structure, WorkItem};
use crate::store::PlanningStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// The five SRAD cost buckets. The `CostBuckets` field names are the
/// canonical SRAD column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    RoutineMaintenance,
    PeriodicMaintenance,
    Rehabilitation,
    RoadBottleneck,
    StructureBottleneck,
}

/// Bucket totals for one section or one road.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CostBuckets {
    pub rm_cost: f64,
    pub pm_cost: f64,
    pub rehab_cost: f64,
    pub road_bneck_cost: f64,
    pub structure_bneck_cost: f64,
}

impl CostBuckets {
    pub fn add(&mut self, bucket: Bucket, amount: f64) {
        match bucket {
            Bucket::RoutineMaintenance => self.rm_cost += amount,
            Bucket::PeriodicMaintenance => self.pm_cost += amount,
            Bucket::Rehabilitation => self.rehab_cost += amount,
            Bucket::RoadBottleneck => self.road_bneck_cost += amount,
            Bucket::StructureBottleneck => self.structure_bneck_cost += amount,
        }
    }

    pub fn merge(&mut self, other: &CostBuckets) {
        self.rm_cost += other.rm_cost;
        self.pm_cost += other.pm_cost;
        self.rehab_cost += other.rehab_cost;
        self.road_bneck_cost += other.road_bneck_cost;
        self.structure_bneck_cost += other.structure_bneck_cost;
    }

    pub fn total(&self) -> f64 {
        self.rm_cost + self.pm_cost + self.rehab_cost + self.road_bneck_cost
            + self.structure_bneck_cost
    }

    /// Apply a funding factor to every bucket independently, rounding each
    /// bucket to two decimals (not the total once).
    pub fn scaled(&self, factor: f64) -> CostBuckets {
        CostBuckets {
            rm_cost: super::round2(self.rm_cost * factor),
            pm_cost: super::round2(self.pm_cost * factor),
            rehab_cost: super::round2(self.rehab_cost * factor),
            road_bneck_cost: super::round2(self.road_bneck_cost * factor),
            structure_bneck_cost: super::round2(self.structure_bneck_cost * factor),
        }
    }
}

/// Bucket for a catalog work code. "10"-prefixed codes other than the two
/// road-bottleneck codes are structure bottlenecks.
pub fn bucket_for_work_code(work_code: &str) -> Option<Bucket> {
    match work_code {
        "01" => Some(Bucket::RoutineMaintenance),
        "02" => Some(Bucket::PeriodicMaintenance),
        "05" => Some(Bucket::Rehabilitation),
        "101" | "102" => Some(Bucket::RoadBottleneck),
        code if code.starts_with("10") => Some(Bucket::StructureBottleneck),
        _ => None,
    }
}

/// Bucket for a manually planned intervention: code prefix first, category
/// fallback second.
fn bucket_for_planned(intervention_code: &str, category: &str) -> Option<Bucket> {
    let code = intervention_code.to_ascii_lowercase();
    for (prefix, bucket) in [
        ("rm", Bucket::RoutineMaintenance),
        ("pm", Bucket::PeriodicMaintenance),
        ("rehab", Bucket::Rehabilitation),
        ("rb", Bucket::RoadBottleneck),
        ("sb", Bucket::StructureBottleneck),
    ] {
        if code.starts_with(prefix) {
            return Some(bucket);
        }
    }

    match category.to_ascii_lowercase().as_str() {
        "structure" => Some(Bucket::StructureBottleneck),
        "bottleneck" => Some(Bucket::RoadBottleneck),
        _ => None,
    }
}

/// Quantity multiplier for a structure recommendation, in the catalog item's
/// declared unit. Defaults to 1 when no physical extent is resolvable.
fn structure_quantity(structure: &Structure, item: &WorkItem) -> f64 {
    let Some(length_m) = structure.length_m() else {
        return 1.0;
    };
    match item.unit.trim().to_ascii_lowercase().as_str() {
        "km" => length_m / 1000.0,
        _ => length_m,
    }
}

/// SRAD bucket totals per section for a fiscal year.
///
/// Rule-derived costs come from the current recommendation rows; a section
/// with explicit planned interventions for the year has those replace the
/// derived costs entirely.
pub fn section_cost_breakdown(
    store: &PlanningStore,
    fiscal_year: i32,
) -> BTreeMap<SectionId, CostBuckets> {
    let mut result: BTreeMap<SectionId, CostBuckets> = store
        .sections()
        .map(|section| (section.id, CostBuckets::default()))
        .collect();

    for rec in store.segment_recommendations() {
        let Some(segment) = store.segment(rec.segment_id) else {
            continue;
        };
        let Some(item) = store.work_item(&rec.work_code) else {
            continue;
        };
        let Some(bucket) = bucket_for_work_code(&rec.work_code) else {
            warn!(
                segment = %rec.segment_id,
                work_code = %rec.work_code,
                "segment recommendation maps to no SRAD bucket; excluded"
            );
            continue;
        };
        let cost = item.unit_cost * segment.chainage_length_km();
        result
            .entry(segment.section_id)
            .or_default()
            .add(bucket, cost);
    }

    for rec in store.structure_recommendations() {
        let Some(structure) = store
            .structures()
            .find(|structure| structure.id == rec.structure_id)
        else {
            continue;
        };
        let Some(section_id) = structure.section_id else {
            // Structures outside any section are costed at road level; see
            // road_cost_totals.
            continue;
        };
        let Some(item) = store.work_item(&rec.work_code) else {
            continue;
        };
        let bucket =
            bucket_for_work_code(&rec.work_code).unwrap_or(Bucket::StructureBottleneck);
        let cost = item.unit_cost * structure_quantity(structure, item);
        result.entry(section_id).or_default().add(bucket, cost);
    }

    // Explicit plan wins: the first mappable planned row for a section zeroes
    // the derived buckets before any planned cost is applied. Unmappable rows
    // are excluded without touching the derived costs.
    let mut planned_sections: Vec<SectionId> = Vec::new();
    let section_ids: Vec<SectionId> = result.keys().copied().collect();
    for section_id in section_ids {
        for planned in store.planned_interventions_for(section_id, fiscal_year) {
            let Some(bucket) =
                bucket_for_planned(&planned.intervention_code, &planned.category)
            else {
                warn!(
                    section = %section_id,
                    code = %planned.intervention_code,
                    category = %planned.category,
                    "planned intervention maps to no SRAD bucket; cost excluded"
                );
                continue;
            };
            if !planned_sections.contains(&section_id) {
                result.insert(section_id, CostBuckets::default());
                planned_sections.push(section_id);
            }
            result
                .entry(section_id)
                .or_default()
                .add(bucket, planned.estimated_cost);
        }
    }

    result
}

/// Per-road bucket totals: section totals rolled up, plus recommendations for
/// structures that sit outside any section.
pub fn road_cost_totals(store: &PlanningStore, fiscal_year: i32) -> BTreeMap<RoadId, CostBuckets> {
    let sections = section_cost_breakdown(store, fiscal_year);

    let mut totals: BTreeMap<RoadId, CostBuckets> =
        store.roads().map(|road| (road.id, CostBuckets::default())).collect();

    for (section_id, buckets) in &sections {
        if let Some(section) = store.section(*section_id) {
            totals.entry(section.road_id).or_default().merge(buckets);
        }
    }

    for rec in store.structure_recommendations() {
        let Some(structure) = store
            .structures()
            .find(|structure| structure.id == rec.structure_id)
        else {
            continue;
        };
        if structure.section_id.is_some() {
            continue; // already counted through its section
        }
        let Some(item) = store.work_item(&rec.work_code) else {
            continue;
        };
        let bucket =
            bucket_for_work_code(&rec.work_code).unwrap_or(Bucket::StructureBottleneck);
        let cost = item.unit_cost * structure_quantity(structure, item);
        totals.entry(structure.road_id).or_default().add(bucket, cost);
    }

    totals
}

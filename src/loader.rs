//! CSV snapshot loading and saving.
//!
//! A planning dataset lives in a directory of CSV files, one per table.
//! Missing files mean empty tables, so a minimal dataset only needs the
//! files it actually uses. Derived tables are written back after each stage
//! so later stages (and later invocations) can pick them up.

use crate::domain::{
    BenefitCriterion, BenefitFactor, BenefitScale, ConditionFactor,
    ConditionSurvey, LinkTypeScore, MciCategoryBand, MciMaintenanceRule, MciResult,
    MciWeightConfig, PlannedIntervention, RankingRow, Road, RoadSection, RoadSegment,
    RoadSocioEconomic, SegmentRecommendation, Structure, StructureConditionRule,
    StructureConditionSurvey, StructureRecommendation, TrafficAdt, WorkItem,
};
use crate::store::PlanningStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to prepare data directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load a full store (inventory, surveys, lookups, and any previously saved
/// derived tables) from a snapshot directory.
pub fn load_store(dir: &Path) -> Result<PlanningStore, LoadError> {
    let mut store = PlanningStore::new();

    for road in read_rows::<Road>(dir, "roads.csv")? {
        store.insert_road(road);
    }
    for section in read_rows::<RoadSection>(dir, "road_sections.csv")? {
        store.insert_section(section);
    }
    for segment in read_rows::<RoadSegment>(dir, "road_segments.csv")? {
        store.insert_segment(segment);
    }
    for structure in read_rows::<Structure>(dir, "structures.csv")? {
        store.insert_structure(structure);
    }
    for survey in read_rows::<ConditionSurvey>(dir, "condition_surveys.csv")? {
        store.insert_condition_survey(survey);
    }
    for survey in read_rows::<StructureConditionSurvey>(dir, "structure_surveys.csv")? {
        store.insert_structure_survey(survey);
    }
    for factor in read_rows::<ConditionFactor>(dir, "condition_factors.csv")? {
        store.insert_condition_factor(factor);
    }
    for config in read_rows::<MciWeightConfig>(dir, "mci_weight_configs.csv")? {
        store.insert_weight_config(config);
    }
    for band in read_rows::<MciCategoryBand>(dir, "mci_category_bands.csv")? {
        store.insert_category_band(band);
    }
    for rule in read_rows::<MciMaintenanceRule>(dir, "mci_maintenance_rules.csv")? {
        store.insert_maintenance_rule(rule);
    }
    for item in read_rows::<WorkItem>(dir, "work_items.csv")? {
        store.insert_work_item(item);
    }
    for rule in read_rows::<StructureConditionRule>(dir, "structure_rules.csv")? {
        store.insert_structure_rule(rule);
    }
    for criterion in read_rows::<BenefitCriterion>(dir, "benefit_criteria.csv")? {
        store.insert_benefit_criterion(criterion);
    }
    for scale in read_rows::<BenefitScale>(dir, "benefit_scales.csv")? {
        store.insert_benefit_scale(scale);
    }
    for entry in read_rows::<LinkTypeScore>(dir, "link_type_scores.csv")? {
        store.insert_link_type_score(entry);
    }
    for row in read_rows::<RoadSocioEconomic>(dir, "road_socio_economic.csv")? {
        store.insert_socio_economic(row);
    }
    for row in read_rows::<TrafficAdt>(dir, "traffic_adt.csv")? {
        store.insert_traffic_adt(row);
    }
    for row in read_rows::<PlannedIntervention>(dir, "planned_interventions.csv")? {
        store.insert_planned_intervention(row);
    }

    store.load_mci_results(read_rows(dir, "mci_results.csv")?);
    store.load_segment_recommendations(read_rows(dir, "segment_recommendations.csv")?);
    store.load_structure_recommendations(read_rows(dir, "structure_recommendations.csv")?);
    store.load_benefit_factors(read_rows(dir, "benefit_factors.csv")?);
    store.load_ranking_rows(read_rows(dir, "ranking_rows.csv")?);

    debug!(dir = %dir.display(), "snapshot loaded");
    Ok(store)
}

/// Write every derived table back to the snapshot directory.
pub fn save_derived(dir: &Path, store: &PlanningStore) -> Result<(), LoadError> {
    std::fs::create_dir_all(dir).map_err(|source| LoadError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    write_rows(dir, "mci_results.csv", store.mci_results())?;
    write_rows(
        dir,
        "segment_recommendations.csv",
        store.segment_recommendations(),
    )?;
    write_rows(
        dir,
        "structure_recommendations.csv",
        store.structure_recommendations(),
    )?;
    write_rows(dir, "benefit_factors.csv", store.benefit_factors())?;
    write_rows(dir, "ranking_rows.csv", store.ranking_rows())?;

    debug!(dir = %dir.display(), "derived tables saved");
    Ok(())
}

fn read_rows<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, LoadError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?);
    }
    Ok(rows)
}

fn write_rows<T: Serialize>(dir: &Path, file: &str, rows: &[T]) -> Result<(), LoadError> {
    let path = dir.join(file);
    let mut writer = csv::Writer::from_path(&path).map_err(|source| LoadError::Write {
        path: path.clone(),
        source,
    })?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|source| LoadError::Write {
                path: path.clone(),
                source,
            })?;
    }
    writer
        .flush()
        .map_err(|source| LoadError::Write {
            path: path.clone(),
            source: source.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoadId, SegmentId, SurveyId};
    use chrono::NaiveDate;

    #[test]
    fn missing_files_load_as_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(dir.path()).unwrap();
        assert_eq!(store.roads().count(), 0);
        assert!(store.mci_results().is_empty());
    }

    #[test]
    fn derived_tables_round_trip_through_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = PlanningStore::new();
        store.upsert_mci_result(MciResult {
            segment_id: SegmentId(7),
            survey_id: SurveyId(3),
            inspection_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            mci_value: 42.5,
            category: Some("Fair".to_string()),
        });
        store.upsert_benefit_factor(BenefitFactor {
            road_id: RoadId(1),
            fiscal_year: 2025,
            bf1_transport: 10.0,
            bf2_agriculture: 5.0,
            bf3_social: 2.0,
            total: 6.1,
        });
        save_derived(dir.path(), &store).unwrap();

        let reloaded = load_store(dir.path()).unwrap();
        assert_eq!(reloaded.mci_results().len(), 1);
        assert_eq!(reloaded.mci_results()[0].mci_value, 42.5);
        assert_eq!(
            reloaded.mci_results()[0].category.as_deref(),
            Some("Fair")
        );
        let factor = reloaded.benefit_factor(RoadId(1), 2025).unwrap();
        assert_eq!(factor.total, 6.1);
    }

    #[test]
    fn inventory_rows_survive_optional_columns_left_blank() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("roads.csv"),
            "id,identifier,surface_type,population_served,link_type_code,total_length_km\n\
             1,R-001,Earth,,,\n",
        )
        .unwrap();

        let store = load_store(dir.path()).unwrap();
        let road = store.road(RoadId(1)).unwrap();
        assert_eq!(road.identifier, "R-001");
        assert_eq!(road.population_served, None);
        assert_eq!(road.link_type_code, None);
    }
}

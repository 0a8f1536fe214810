//! In-memory snapshot of the relational collaborator plus the four derived
//! table families the pipeline owns.
//!
//! The only mutation discipline offered for derived rows is upsert-by-key or
//! delete-then-insert replacement scoped to one entity; there are no partial
//! in-place updates, which keeps every recomputation idempotent.

use crate::domain::{
    BenefitCriterion, BenefitFactor, BenefitScale, ConditionFactor,
    ConditionSurvey, LinkTypeScore, MciCategoryBand, MciMaintenanceRule, MciResult,
    MciWeightConfig, PlannedIntervention, RankingRow, Road, RoadId, RoadSection,
    RoadSegment, RoadSocioEconomic, SectionId, SegmentId, SegmentRecommendation, Structure,
    StructureConditionRule, StructureConditionSurvey, StructureId, StructureRecommendation,
    StructureType, SurfaceGroup, TrafficAdt, WorkItem,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct PlanningStore {
    // Read-only snapshot tables.
    roads: BTreeMap<RoadId, Road>,
    sections: BTreeMap<SectionId, RoadSection>,
    segments: BTreeMap<SegmentId, RoadSegment>,
    structures: BTreeMap<StructureId, Structure>,
    condition_surveys: Vec<ConditionSurvey>,
    structure_surveys: Vec<StructureConditionSurvey>,
    condition_factors: Vec<ConditionFactor>,
    weight_configs: Vec<MciWeightConfig>,
    category_bands: Vec<MciCategoryBand>,
    maintenance_rules: Vec<MciMaintenanceRule>,
    work_items: BTreeMap<String, WorkItem>,
    structure_rules: Vec<StructureConditionRule>,
    benefit_criteria: Vec<BenefitCriterion>,
    benefit_scales: Vec<BenefitScale>,
    link_type_scores: BTreeMap<String, LinkTypeScore>,
    socio_economic: BTreeMap<RoadId, RoadSocioEconomic>,
    traffic_adt: Vec<TrafficAdt>,
    planned_interventions: Vec<PlannedIntervention>,

    // Derived tables owned by the pipeline.
    mci_results: Vec<MciResult>,
    segment_recommendations: Vec<SegmentRecommendation>,
    structure_recommendations: Vec<StructureRecommendation>,
    benefit_factors: Vec<BenefitFactor>,
    ranking_rows: Vec<RankingRow>,
}

impl PlanningStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Snapshot population (loader / test fixtures).
    // ------------------------------------------------------------------

    pub fn insert_road(&mut self, road: Road) {
        self.roads.insert(road.id, road);
    }

    pub fn insert_section(&mut self, section: RoadSection) {
        self.sections.insert(section.id, section);
    }

    pub fn insert_segment(&mut self, segment: RoadSegment) {
        self.segments.insert(segment.id, segment);
    }

    pub fn insert_structure(&mut self, structure: Structure) {
        self.structures.insert(structure.id, structure);
    }

    pub fn insert_condition_survey(&mut self, survey: ConditionSurvey) {
        self.condition_surveys.push(survey);
    }

    pub fn insert_structure_survey(&mut self, survey: StructureConditionSurvey) {
        self.structure_surveys.push(survey);
    }

    pub fn insert_condition_factor(&mut self, factor: ConditionFactor) {
        self.condition_factors.push(factor);
    }

    pub fn insert_weight_config(&mut self, config: MciWeightConfig) {
        self.weight_configs.push(config);
    }

    pub fn insert_category_band(&mut self, band: MciCategoryBand) {
        self.category_bands.push(band);
    }

    pub fn insert_maintenance_rule(&mut self, rule: MciMaintenanceRule) {
        self.maintenance_rules.push(rule);
    }

    pub fn insert_work_item(&mut self, item: WorkItem) {
        self.work_items.insert(item.work_code.clone(), item);
    }

    pub fn insert_structure_rule(&mut self, rule: StructureConditionRule) {
        self.structure_rules.push(rule);
    }

    pub fn insert_benefit_criterion(&mut self, criterion: BenefitCriterion) {
        self.benefit_criteria.push(criterion);
    }

    pub fn insert_benefit_scale(&mut self, scale: BenefitScale) {
        self.benefit_scales.push(scale);
    }

    pub fn insert_link_type_score(&mut self, entry: LinkTypeScore) {
        self.link_type_scores.insert(entry.code.clone(), entry);
    }

    pub fn insert_socio_economic(&mut self, row: RoadSocioEconomic) {
        self.socio_economic.insert(row.road_id, row);
    }

    pub fn insert_traffic_adt(&mut self, row: TrafficAdt) {
        self.traffic_adt.push(row);
    }

    pub fn insert_planned_intervention(&mut self, row: PlannedIntervention) {
        self.planned_interventions.push(row);
    }

    // ------------------------------------------------------------------
    // Snapshot accessors.
    // ------------------------------------------------------------------

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(&id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &RoadSection> {
        self.sections.values()
    }

    pub fn section(&self, id: SectionId) -> Option<&RoadSection> {
        self.sections.get(&id)
    }

    pub fn segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.values()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&RoadSegment> {
        self.segments.get(&id)
    }

    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// Latest condition survey for a segment: most recent inspection date,
    /// tie-broken by highest survey id.
    pub fn latest_condition_survey(&self, segment_id: SegmentId) -> Option<&ConditionSurvey> {
        self.condition_surveys
            .iter()
            .filter(|survey| survey.segment_id == segment_id)
            .max_by_key(|survey| (survey.inspection_date, survey.id))
    }

    /// Latest condition code for a structure, primary code falling back to
    /// the secondary rating field.
    pub fn latest_structure_condition(&self, structure_id: StructureId) -> Option<u8> {
        self.structure_surveys
            .iter()
            .filter(|survey| survey.structure_id == structure_id)
            .max_by_key(|survey| (survey.inspection_date, survey.id))
            .and_then(|survey| survey.effective_condition_code())
    }

    pub fn condition_factor(&self, rating_code: u8) -> Option<f64> {
        self.condition_factors
            .iter()
            .find(|factor| factor.rating_code == rating_code)
            .map(|factor| factor.factor)
    }

    /// Weight configuration effective on a date: the most recent config whose
    /// `effective_from` is on or before the date.
    pub fn weight_config_for(&self, date: NaiveDate) -> Option<&MciWeightConfig> {
        self.weight_configs
            .iter()
            .filter(|config| config.effective_from <= date)
            .max_by_key(|config| config.effective_from)
    }

    pub fn classify_mci(&self, mci_value: f64) -> Option<&str> {
        self.category_bands
            .iter()
            .find(|band| {
                let min_ok = band.min_value.map_or(true, |min| mci_value >= min);
                let max_ok = band.max_value.map_or(true, |max| mci_value <= max);
                min_ok && max_ok
            })
            .map(|band| band.name.as_str())
    }

    /// The single active maintenance rule band covering an MCI value, if any.
    pub fn maintenance_rule_for(&self, mci_value: f64) -> Option<&MciMaintenanceRule> {
        self.maintenance_rules
            .iter()
            .find(|rule| rule.matches(mci_value))
    }

    pub fn work_item(&self, work_code: &str) -> Option<&WorkItem> {
        self.work_items.get(work_code)
    }

    pub fn structure_rule(
        &self,
        structure_type: StructureType,
        condition_code: u8,
    ) -> Option<&StructureConditionRule> {
        self.structure_rules.iter().find(|rule| {
            rule.active
                && rule.structure_type == structure_type
                && rule.condition_code == condition_code
        })
    }

    pub fn benefit_criteria(&self) -> impl Iterator<Item = &BenefitCriterion> {
        self.benefit_criteria.iter()
    }

    pub fn scales_for<'a>(
        &'a self,
        criterion_code: &'a str,
    ) -> impl Iterator<Item = &'a BenefitScale> + 'a {
        self.benefit_scales
            .iter()
            .filter(move |scale| scale.criterion_code == criterion_code)
    }

    pub fn link_type_score(&self, code: &str) -> Option<f64> {
        self.link_type_scores.get(code).map(|entry| entry.score)
    }

    pub fn socio_economic(&self, road_id: RoadId) -> Option<&RoadSocioEconomic> {
        self.socio_economic.get(&road_id)
    }

    /// Most recently prepared aggregated ADT for a road and fiscal year.
    pub fn latest_adt(&self, road_id: RoadId, fiscal_year: i32) -> Option<f64> {
        self.traffic_adt
            .iter()
            .filter(|row| row.road_id == road_id && row.fiscal_year == fiscal_year)
            .max_by_key(|row| row.prepared_at)
            .map(|row| row.value)
    }

    pub fn planned_interventions_for(
        &self,
        section_id: SectionId,
        fiscal_year: i32,
    ) -> impl Iterator<Item = &PlannedIntervention> {
        self.planned_interventions
            .iter()
            .filter(move |row| row.section_id == section_id && row.fiscal_year == fiscal_year)
    }

    // ------------------------------------------------------------------
    // Derived tables: MCI results.
    // ------------------------------------------------------------------

    /// Upsert keyed by (segment, inspection date).
    pub fn upsert_mci_result(&mut self, result: MciResult) {
        match self.mci_results.iter_mut().find(|existing| {
            existing.segment_id == result.segment_id
                && existing.inspection_date == result.inspection_date
        }) {
            Some(existing) => *existing = result,
            None => self.mci_results.push(result),
        }
    }

    pub fn mci_results(&self) -> &[MciResult] {
        &self.mci_results
    }

    pub fn latest_mci_result(&self, segment_id: SegmentId) -> Option<&MciResult> {
        self.mci_results
            .iter()
            .filter(|result| result.segment_id == segment_id)
            .max_by_key(|result| (result.inspection_date, result.survey_id))
    }

    // ------------------------------------------------------------------
    // Derived tables: intervention recommendations.
    // ------------------------------------------------------------------

    /// Delete all recommendations for the segment, then insert the new set.
    pub fn replace_segment_recommendations(
        &mut self,
        segment_id: SegmentId,
        rows: Vec<SegmentRecommendation>,
    ) {
        self.segment_recommendations
            .retain(|rec| rec.segment_id != segment_id);
        self.segment_recommendations.extend(rows);
    }

    pub fn segment_recommendations(&self) -> &[SegmentRecommendation] {
        &self.segment_recommendations
    }

    pub fn replace_structure_recommendations(
        &mut self,
        structure_id: StructureId,
        rows: Vec<StructureRecommendation>,
    ) {
        self.structure_recommendations
            .retain(|rec| rec.structure_id != structure_id);
        self.structure_recommendations.extend(rows);
    }

    pub fn structure_recommendations(&self) -> &[StructureRecommendation] {
        &self.structure_recommendations
    }

    // ------------------------------------------------------------------
    // Derived tables: benefit factors and rankings.
    // ------------------------------------------------------------------

    /// Upsert keyed by (road, fiscal year).
    pub fn upsert_benefit_factor(&mut self, factor: BenefitFactor) {
        match self.benefit_factors.iter_mut().find(|existing| {
            existing.road_id == factor.road_id && existing.fiscal_year == factor.fiscal_year
        }) {
            Some(existing) => *existing = factor,
            None => self.benefit_factors.push(factor),
        }
    }

    pub fn benefit_factors(&self) -> &[BenefitFactor] {
        &self.benefit_factors
    }

    pub fn benefit_factor(&self, road_id: RoadId, fiscal_year: i32) -> Option<&BenefitFactor> {
        self.benefit_factors
            .iter()
            .find(|factor| factor.road_id == road_id && factor.fiscal_year == fiscal_year)
    }

    /// Full cohort replacement: delete every ranking row for the
    /// (fiscal year, cohort) pair, then insert the fresh set.
    pub fn replace_ranking_cohort(
        &mut self,
        fiscal_year: i32,
        cohort: SurfaceGroup,
        rows: Vec<RankingRow>,
    ) {
        self.ranking_rows
            .retain(|row| !(row.fiscal_year == fiscal_year && row.cohort == cohort));
        self.ranking_rows.extend(rows);
    }

    pub fn ranking_rows(&self) -> &[RankingRow] {
        &self.ranking_rows
    }

    /// Ranking rows for a fiscal year, optionally one cohort, ordered by
    /// cohort then rank.
    pub fn ranked_roads(&self, fiscal_year: i32, cohort: Option<SurfaceGroup>) -> Vec<&RankingRow> {
        let mut rows: Vec<&RankingRow> = self
            .ranking_rows
            .iter()
            .filter(|row| {
                row.fiscal_year == fiscal_year && cohort.map_or(true, |group| row.cohort == group)
            })
            .collect();
        rows.sort_by_key(|row| (row.cohort, row.rank));
        rows
    }

    // ------------------------------------------------------------------
    // Derived-row rehydration (loader only).
    // ------------------------------------------------------------------

    pub fn load_mci_results(&mut self, rows: Vec<MciResult>) {
        self.mci_results = rows;
    }

    pub fn load_segment_recommendations(&mut self, rows: Vec<SegmentRecommendation>) {
        self.segment_recommendations = rows;
    }

    pub fn load_structure_recommendations(&mut self, rows: Vec<StructureRecommendation>) {
        self.structure_recommendations = rows;
    }

    pub fn load_benefit_factors(&mut self, rows: Vec<BenefitFactor>) {
        self.benefit_factors = rows;
    }

    pub fn load_ranking_rows(&mut self, rows: Vec<RankingRow>) {
        self.ranking_rows = rows;
    }
}

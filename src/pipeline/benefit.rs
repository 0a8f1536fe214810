//! Benefit factor scoring.
//!
//! Every configured criterion resolves a score from its scale rows, except
//! the link-type criterion which reads a pre-computed score straight from the
//! link-type lookup. Category subtotals are plain sums of criterion scores;
//! the top-level combination uses the fixed 0.40/0.30/0.30 business split, not
//! the stored category weights.

use super::{BatchSummary, PipelineError, RunMode};
use crate::domain::{BenefitFactor, Road, RoadSocioEconomic};
use crate::store::PlanningStore;
use tracing::{info, warn};

/// The link-type criterion is scored by direct lookup, never through scales.
const LINK_TYPE_CRITERION: &str = "BF1_LINKTYPE";

const BF1_WEIGHT: f64 = 0.40;
const BF2_WEIGHT: f64 = 0.30;
const BF3_WEIGHT: f64 = 0.30;

/// Compute and upsert one benefit factor per road with socio-economic inputs.
pub fn compute_benefit_factors(
    store: &mut PlanningStore,
    fiscal_year: i32,
    mode: RunMode,
) -> Result<BatchSummary, PipelineError> {
    let mut summary = BatchSummary::default();

    let roads: Vec<Road> = store.roads().cloned().collect();
    for road in roads {
        summary.processed += 1;

        let Some(socio) = store.socio_economic(road.id).cloned() else {
            summary.skipped += 1;
            continue;
        };

        match score_road(store, &road, &socio, fiscal_year) {
            Ok(factor) => {
                store.upsert_benefit_factor(factor);
                summary.created += 1;
            }
            Err(error) => match mode {
                RunMode::Strict => return Err(error),
                RunMode::Lenient => {
                    warn!(road = %road.id, %error, "benefit factor computation aborted");
                    summary.failures.push(error);
                }
            },
        }
    }

    info!(fiscal_year, %summary, "benefit factor computation finished");
    Ok(summary)
}

fn score_road(
    store: &PlanningStore,
    road: &Road,
    socio: &RoadSocioEconomic,
    fiscal_year: i32,
) -> Result<BenefitFactor, PipelineError> {
    let mut bf1 = 0.0;
    let mut bf2 = 0.0;
    let mut bf3 = 0.0;

    let criteria: Vec<_> = store.benefit_criteria().cloned().collect();
    for criterion in &criteria {
        let score = if criterion.code == LINK_TYPE_CRITERION {
            link_type_score(store, road, socio)
        } else {
            match criterion_value(store, road, socio, &criterion.code, fiscal_year)? {
                Some(value) => resolve_scale_score(store, &criterion.code, value)?,
                // Empty input scores zero; only a resolved value that matches
                // no band is a validation failure.
                None => 0.0,
            }
        };

        match criterion.category_code.as_str() {
            "BF1" => bf1 += score,
            "BF2" => bf2 += score,
            "BF3" => bf3 += score,
            other => {
                warn!(criterion = %criterion.code, category = other, "unknown benefit category");
            }
        }
    }

    Ok(BenefitFactor {
        road_id: road.id,
        fiscal_year,
        bf1_transport: bf1,
        bf2_agriculture: bf2,
        bf3_social: bf3,
        total: BF1_WEIGHT * bf1 + BF2_WEIGHT * bf2 + BF3_WEIGHT * bf3,
    })
}

/// First scale row whose (inclusive, possibly open) bounds contain the value.
fn resolve_scale_score(
    store: &PlanningStore,
    criterion_code: &str,
    value: f64,
) -> Result<f64, PipelineError> {
    store
        .scales_for(criterion_code)
        .find(|scale| scale.matches(value))
        .map(|scale| scale.score)
        .ok_or_else(|| PipelineError::NoScaleBand {
            criterion: criterion_code.to_string(),
            value,
        })
}

fn link_type_score(store: &PlanningStore, road: &Road, socio: &RoadSocioEconomic) -> f64 {
    let code = socio
        .link_type_override
        .as_deref()
        .or(road.link_type_code.as_deref());
    let Some(code) = code else {
        warn!(road = %road.id, "road has no link type; link-type criterion scores zero");
        return 0.0;
    };
    match store.link_type_score(code) {
        Some(score) => score,
        None => {
            warn!(road = %road.id, code, "unknown link type code; criterion scores zero");
            0.0
        }
    }
}

/// Raw indicator value for a criterion. ADT has a mandatory fallback chain:
/// aggregated traffic value, then the manual override, then a fatal error.
fn criterion_value(
    store: &PlanningStore,
    road: &Road,
    socio: &RoadSocioEconomic,
    criterion_code: &str,
    fiscal_year: i32,
) -> Result<Option<f64>, PipelineError> {
    let value = match criterion_code {
        "BF1_ADT" => {
            return store
                .latest_adt(road.id, fiscal_year)
                .or(socio.adt_override)
                .map(Some)
                .ok_or(PipelineError::AdtMissing {
                    road_id: road.id,
                    fiscal_year,
                });
        }
        "BF1_TRADING" => socio.trading_centers,
        "BF1_VILLAGES" => socio.villages_connected,
        "BF2_FARMLAND" => socio.farmland_percentage,
        "BF2_COOPS" => socio.cooperative_centers,
        "BF2_MARKETS" => socio.markets_connected,
        "BF3_HEALTH" => socio.health_centers,
        "BF3_EDU" => socio.education_centers,
        "BF3_DEVPROJ" => socio.development_projects,
        other => {
            warn!(criterion = other, "criterion has no configured input; scores zero");
            None
        }
    };
    Ok(value)
}

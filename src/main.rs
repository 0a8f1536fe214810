use clap::{Args, Parser, Subcommand};
use roadplan::config::AppConfig;
use roadplan::domain::SurfaceGroup;
use roadplan::error::AppError;
use roadplan::loader;
use roadplan::pipeline::workplan::{FundingStatus, Workplan, WorkplanEntry};
use roadplan::pipeline::{self, BatchSummary, RunMode};
use roadplan::store::PlanningStore;
use roadplan::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "roadplan",
    about = "Recompute road condition indices, intervention plans, and budget allocations",
    version
)]
struct Cli {
    /// Directory holding the CSV dataset (overrides ROADPLAN_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Abort a stage on the first validation failure instead of collecting it
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recompute the maintenance condition index for every surveyed segment
    RecomputeMci(YearArgs),
    /// Recompute segment intervention recommendations from stored MCI values
    RecomputeSegmentInterventions,
    /// Recompute structure intervention recommendations from structure surveys
    RecomputeStructureInterventions,
    /// Recompute benefit factors for every road with socio-economic data
    ComputeBenefitFactors(YearArgs),
    /// Recompute the paved and unpaved road rankings
    ComputeRoadRanking(YearArgs),
    /// Allocate a budget over a ranked cohort
    ComputeWorkplan(WorkplanArgs),
    /// Run every stage in order, optionally ending with a workplan
    RunAll(RunAllArgs),
}

#[derive(Args, Debug)]
struct YearArgs {
    /// Fiscal year the computation applies to
    #[arg(long)]
    fiscal_year: i32,
}

#[derive(Args, Debug)]
struct WorkplanArgs {
    /// Fiscal year the workplan applies to
    #[arg(long)]
    fiscal_year: i32,
    /// Restrict the allocation to one surface cohort
    #[arg(long, value_parser = parse_cohort)]
    cohort: Option<SurfaceGroup>,
    /// Budget available for the plan; omit for an unbounded budget
    #[arg(long)]
    budget_cap: Option<f64>,
    /// Stop at the budget boundary instead of partially funding the next road
    #[arg(long)]
    no_partial: bool,
    /// Write the workplan as JSON to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunAllArgs {
    /// Fiscal year the computations apply to
    #[arg(long)]
    fiscal_year: i32,
    /// When given, finish by allocating this budget over both cohorts
    #[arg(long)]
    budget_cap: Option<f64>,
    /// Stop at the budget boundary instead of partially funding the next road
    #[arg(long)]
    no_partial: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if cli.strict {
        config.strict = true;
    }

    telemetry::init(&config.telemetry)?;

    let mode = if config.strict {
        RunMode::Strict
    } else {
        RunMode::Lenient
    };
    let mut store = loader::load_store(&config.data_dir)?;

    match cli.command {
        Command::RecomputeMci(args) => {
            let summary = pipeline::mci::recompute_mci(&mut store, args.fiscal_year);
            loader::save_derived(&config.data_dir, &store)?;
            render_summary("MCI recomputation", &summary);
        }
        Command::RecomputeSegmentInterventions => {
            let summary = pipeline::segment_rules::recompute_segment_interventions(&mut store, mode)?;
            loader::save_derived(&config.data_dir, &store)?;
            render_summary("Segment interventions", &summary);
        }
        Command::RecomputeStructureInterventions => {
            let summary = pipeline::structure_rules::recompute_structure_interventions(&mut store);
            loader::save_derived(&config.data_dir, &store)?;
            render_summary("Structure interventions", &summary);
        }
        Command::ComputeBenefitFactors(args) => {
            let summary =
                pipeline::benefit::compute_benefit_factors(&mut store, args.fiscal_year, mode)?;
            loader::save_derived(&config.data_dir, &store)?;
            render_summary("Benefit factors", &summary);
        }
        Command::ComputeRoadRanking(args) => {
            let summary = pipeline::ranking::compute_road_ranking(&mut store, args.fiscal_year);
            loader::save_derived(&config.data_dir, &store)?;
            render_summary("Road ranking", &summary);
        }
        Command::ComputeWorkplan(args) => {
            let plan = pipeline::workplan::compute_workplan(
                &store,
                args.fiscal_year,
                args.cohort,
                args.budget_cap,
                !args.no_partial,
            );
            emit_workplan(&plan, args.out.as_deref())?;
        }
        Command::RunAll(args) => run_all(&config.data_dir, &mut store, mode, args)?,
    }

    Ok(())
}

fn run_all(
    data_dir: &std::path::Path,
    store: &mut PlanningStore,
    mode: RunMode,
    args: RunAllArgs,
) -> Result<(), AppError> {
    let fiscal_year = args.fiscal_year;
    info!(fiscal_year, "running the full planning pipeline");

    render_summary(
        "MCI recomputation",
        &pipeline::mci::recompute_mci(store, fiscal_year),
    );
    render_summary(
        "Segment interventions",
        &pipeline::segment_rules::recompute_segment_interventions(store, mode)?,
    );
    render_summary(
        "Structure interventions",
        &pipeline::structure_rules::recompute_structure_interventions(store),
    );
    render_summary(
        "Benefit factors",
        &pipeline::benefit::compute_benefit_factors(store, fiscal_year, mode)?,
    );
    render_summary(
        "Road ranking",
        &pipeline::ranking::compute_road_ranking(store, fiscal_year),
    );
    loader::save_derived(data_dir, store)?;

    if let Some(budget_cap) = args.budget_cap {
        for cohort in [SurfaceGroup::Paved, SurfaceGroup::Unpaved] {
            let plan = pipeline::workplan::compute_workplan(
                store,
                fiscal_year,
                Some(cohort),
                Some(budget_cap),
                !args.no_partial,
            );
            emit_workplan(&plan, None)?;
        }
    }

    Ok(())
}

fn parse_cohort(raw: &str) -> Result<SurfaceGroup, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "paved" => Ok(SurfaceGroup::Paved),
        "unpaved" => Ok(SurfaceGroup::Unpaved),
        other => Err(format!("unknown cohort '{other}', expected paved or unpaved")),
    }
}

fn render_summary(stage: &str, summary: &BatchSummary) {
    println!("{stage}: {summary}");
    for failure in &summary.failures {
        println!("  failed: {failure}");
    }
}

fn emit_workplan(plan: &Workplan, out: Option<&std::path::Path>) -> Result<(), AppError> {
    if let Some(path) = out {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, plan)?;
        println!("Workplan written to {}", path.display());
        return Ok(());
    }

    let cohort_label = plan
        .cohort
        .map(|cohort| cohort.label())
        .unwrap_or("all roads");
    let cap_label = match plan.budget_cap {
        Some(cap) => format!("{cap:.2}"),
        None => "unbounded".to_string(),
    };
    println!(
        "\nWorkplan FY{} ({cohort_label}): {:.2} of {cap_label} allocated over {} road(s)",
        plan.fiscal_year,
        plan.allocated,
        plan.entries.len()
    );
    for entry in &plan.entries {
        render_entry(entry);
    }
    Ok(())
}

fn render_entry(entry: &WorkplanEntry) {
    match entry.status {
        FundingStatus::Full => {
            println!(
                "- #{} {} | cost {:.2} | funded in full",
                entry.rank, entry.identifier, entry.road_cost
            );
        }
        FundingStatus::Partial => {
            println!(
                "- #{} {} | cost {:.2} | funded {:.2} ({:.1}%)",
                entry.rank,
                entry.identifier,
                entry.road_cost,
                entry.funded_amount,
                entry.selection_factor * 100.0
            );
        }
    }
}

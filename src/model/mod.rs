//! Scheduler / Solver Driver: wires the Calendar Decomposer, Block
//! Materializer, Variable Builder, Constraint Assembler, Objective
//! Assembler and Schedule Materializer into the single `generate` entry
//! point described in SPEC_FULL.md §4.4.

pub mod constraints;
pub mod objective;
pub mod variables;

use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};

use crate::blocks::{self, MaterializedBlocks};
use crate::calendar::Calendar;
use crate::domain::{DaysParameter, Registry};
use crate::error::{Result, SchedulerError};
use crate::schedule::{materialize_schedule, Schedule};
use crate::solver::{SolveStatus, SolverBackend};

/// Per-block candidate trace, captured at each filtering stage for offline
/// diagnosis of "why does this block have no eligible physician" (§6,
/// Debug artifacts).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CandidateTrace {
    pub task: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_candidates: usize,
    pub available_candidates: usize,
}

pub struct GenerateOptions {
    pub use_initial: bool,
    pub time_limit_seconds: f64,
    /// Workload/revenue balance terms need continuous auxiliary variables;
    /// disable when driving a boolean-only test double (`RecordingSolver`).
    pub include_balance_terms: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            use_initial: false,
            time_limit_seconds: 60.0,
            include_balance_terms: true,
        }
    }
}

pub struct GenerateOutcome {
    pub schedule: Schedule,
    pub candidate_trace: Vec<CandidateTrace>,
}

fn max_number_of_weeks(registry: &Registry) -> u32 {
    registry
        .categories()
        .iter()
        .filter(|c| c.days_parameter == DaysParameter::MultiWeek)
        .map(|c| c.number_of_weeks)
        .max()
        .unwrap_or(1)
}

pub fn generate(
    registry: &Registry,
    start_date: NaiveDate,
    end_date: NaiveDate,
    region: &str,
    extra_holidays: &[NaiveDate],
    initial_schedule: Option<&Schedule>,
    backend: &mut dyn SolverBackend,
    options: &GenerateOptions,
) -> Result<GenerateOutcome> {
    let extension_weeks = max_number_of_weeks(registry).saturating_sub(1);
    let horizon_end = end_date + Duration::days(7 * extension_weeks as i64);

    let mut calendar = Calendar::new(start_date, horizon_end, region.to_string());
    for &h in extra_holidays {
        calendar.add_holiday(h);
    }

    info!(
        "generating schedule for {start_date}..{end_date} (horizon extended to {horizon_end}, region {region})"
    );

    let MaterializedBlocks { blocks, multi_week_groups } = blocks::materialize(registry, &calendar);
    debug!("materialized {} scheduled blocks, {} multi-week groups", blocks.len(), multi_week_groups.len());

    let candidate_trace: Vec<CandidateTrace> = blocks
        .iter()
        .map(|b| CandidateTrace {
            task: registry.task(b.task).name.clone(),
            start_date: b.start_date(),
            end_date: b.end_date(),
            initial_candidates: b.candidates.len(),
            available_candidates: b
                .candidates
                .iter()
                .filter(|&&p| !b.days.iter().any(|&d| registry.physician(p).is_unavailable(d)))
                .count(),
        })
        .collect();

    for trace in &candidate_trace {
        if trace.available_candidates == 0 {
            warn!(
                "block {} {}..{} has zero available candidates ({} excluded upfront)",
                trace.task, trace.start_date, trace.end_date, trace.initial_candidates
            );
        }
    }

    let vars = variables::build_variables(registry, &blocks, backend);

    constraints::assemble_coverage(&blocks, &vars, backend);
    constraints::assemble_non_simultaneous(&blocks, &vars, backend);
    constraints::assemble_multi_week_coherence(&multi_week_groups, registry, &vars, backend);
    constraints::assemble_linkage(&blocks, registry, &vars, backend);

    objective::assemble_preference_bonus(&blocks, registry, &vars, backend);
    objective::assemble_sequencing_penalties(&blocks, registry, &vars, backend);
    if options.include_balance_terms {
        objective::assemble_balance_terms(&blocks, registry, &vars, backend);
    }
    objective::assemble_slack_penalty(vars.slack.values().copied(), backend);

    if options.use_initial {
        if let Some(prior) = initial_schedule {
            apply_hints(registry, &blocks, &vars, prior, backend);
        }
    }

    backend.set_time_limit_seconds(options.time_limit_seconds);
    let status = backend.solve();

    match status {
        SolveStatus::Optimal | SolveStatus::Feasible => {
            let schedule = materialize_schedule(registry, &blocks, &vars, backend);
            if !schedule.uncovered_mandatory_blocks.is_empty() {
                warn!(
                    "{} mandatory blocks went uncovered (slack): {:?}",
                    schedule.uncovered_mandatory_blocks.len(),
                    schedule.uncovered_mandatory_blocks
                );
            }
            Ok(GenerateOutcome { schedule, candidate_trace })
        }
        SolveStatus::Infeasible | SolveStatus::Unknown => {
            warn!("solver reported {status:?}; dumping model for offline inspection");
            Err(SchedulerError::InfeasibleError {
                reason: format!("{status:?}: {}", backend.export_model()),
            })
        }
    }
}

fn apply_hints(
    registry: &Registry,
    blocks: &[crate::blocks::ScheduledBlock],
    vars: &variables::VariableSet,
    prior: &Schedule,
    backend: &mut dyn SolverBackend,
) {
    for (physician_name, assignments) in &prior.assignments {
        let Some(physician) = registry.physicians().iter().find(|p| &p.full_name == physician_name) else {
            continue;
        };
        for a in assignments {
            for (idx, block) in blocks.iter().enumerate() {
                if block.start_date() == a.start_date
                    && block.end_date() == a.end_date
                    && registry.task(block.task).name == a.task
                {
                    if let Some(y) = vars.y(idx, physician.id) {
                        backend.hint(y, true);
                    }
                }
            }
        }
    }
}

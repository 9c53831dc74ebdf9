//! Objective Assembler: weighted preference/penalty terms plus a slack
//! penalty, per SPEC_FULL.md §4.6.
//!
//! Scoring constants match the original CP-SAT implementation this spec was
//! distilled from (`original_source/models/math_schedule.py`):
//! `PREFERENCE_SCORE=10`, `DESIRED_WEEKS_SCORE=100`, `REVENUE_BALANCE_SCORE=5`,
//! `CONSECUTIVE_CATEGORY_PENALTY=-10`, `CALL_DISTRIBUTION_PENALTY=-10`,
//! `HEAVY_TASK_PENALTY=-10`.

use chrono::Duration;

use crate::blocks::ScheduledBlock;
use crate::domain::{DaysParameter, Registry, TaskType};
use crate::solver::{Sense, SolverBackend};

use super::variables::VariableSet;

pub const PREFERENCE_SCORE: f64 = 10.0;
pub const DESIRED_WEEKS_SCORE: f64 = 100.0;
pub const REVENUE_BALANCE_SCORE: f64 = 5.0;
pub const CONSECUTIVE_CATEGORY_PENALTY: f64 = -10.0;
pub const CALL_DISTRIBUTION_PENALTY: f64 = -10.0;
pub const HEAVY_TASK_PENALTY: f64 = -10.0;
pub const SLACK_PENALTY: f64 = 1_000_000.0;
pub(crate) const CALL_SPACING_DAYS: i64 = 28;

/// Preference bonus: `PREF * (|preferred| - rank)` added directly to each
/// candidate `y` variable's objective weight. No auxiliary variables
/// needed - this term is a function of a single decision variable.
pub fn assemble_preference_bonus(
    blocks: &[ScheduledBlock],
    registry: &Registry,
    vars: &VariableSet,
    backend: &mut dyn SolverBackend,
) {
    for (idx, block) in blocks.iter().enumerate() {
        let category_name = &registry.category(block.category).name;
        for (physician, y) in vars.candidates_for_block(idx) {
            let p = registry.physician(physician);
            if let Some(rank) = p.preference_rank(category_name) {
                let bonus = PREFERENCE_SCORE * (p.preferred_tasks.len() - rank) as f64;
                backend.add_objective_term(y, bonus);
            }
        }
    }
}

/// Resolves SPEC_FULL.md's "previous chronological task of p" ambiguity
/// (see DESIGN.md, Open Questions): rather than replicating the original
/// implementation's apparently-inert penalty (computed against a solution
/// map populated only after solving), each physician's candidate blocks are
/// sorted chronologically and every chronologically-adjacent pair gets a
/// linearized AND indicator `both = y_i AND y_{i+1}`; the applicable
/// penalties for that pair are summed onto `both`'s objective weight.
pub fn assemble_sequencing_penalties(
    blocks: &[ScheduledBlock],
    registry: &Registry,
    vars: &VariableSet,
    backend: &mut dyn SolverBackend,
) {
    for physician in registry.physicians() {
        let mut candidate_blocks: Vec<usize> = (0..blocks.len())
            .filter(|&idx| vars.y(idx, physician.id).is_some())
            .collect();
        candidate_blocks.sort_by_key(|&idx| blocks[idx].start_date());

        for pair in candidate_blocks.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            let (block_i, block_j) = (&blocks[i], &blocks[j]);

            let mut weight = 0.0;

            let same_category = block_i.category == block_j.category;
            let j_is_single_week = registry.category(block_j.category).days_parameter == DaysParameter::Continuous;
            if same_category && j_is_single_week {
                weight += CONSECUTIVE_CATEGORY_PENALTY;
            }

            let both_call = registry.task(block_i.task).task_type == TaskType::Call
                && registry.task(block_j.task).task_type == TaskType::Call;
            if both_call && (block_j.start_date() - block_i.end_date()) <= Duration::days(CALL_SPACING_DAYS) {
                weight += CALL_DISTRIBUTION_PENALTY;
            }

            if block_i.is_heavy() && block_j.is_heavy() {
                weight += HEAVY_TASK_PENALTY;
            }

            if weight == 0.0 {
                continue;
            }

            let y_i = vars.y(i, physician.id).unwrap();
            let y_j = vars.y(j, physician.id).unwrap();
            let both = backend.new_bool_var(&format!("both[{i},{j},{}]", physician.full_name));
            backend.add_linear_constraint(&[both, y_i], &[1.0, -1.0], Sense::Le, 0.0, "and-le-a");
            backend.add_linear_constraint(&[both, y_j], &[1.0, -1.0], Sense::Le, 0.0, "and-le-b");
            backend.add_linear_constraint(&[both, y_i, y_j], &[1.0, -1.0, -1.0], Sense::Le, -1.0, "and-ge");
            backend.add_objective_term(both, weight);
        }
    }
}

fn block_revenue(registry: &Registry, block: &ScheduledBlock) -> f64 {
    let task = registry.task(block.task);
    registry.category(block.category).revenue_for(task.task_type) as f64
}

fn block_weeks(block: &ScheduledBlock) -> f64 {
    block.days.len() as f64 / 7.0
}

/// Workload and revenue balance deviation terms. Requires continuous
/// auxiliary variables (see `SolverBackend::new_continuous_var`), so test
/// fixtures driven by `RecordingSolver` skip this pass - see DESIGN.md.
pub fn assemble_balance_terms(blocks: &[ScheduledBlock], registry: &Registry, vars: &VariableSet, backend: &mut dyn SolverBackend) {
    let physicians = registry.physicians();
    if physicians.is_empty() {
        return;
    }

    let total_weeks: f64 = blocks.iter().map(block_weeks).sum();
    let total_revenue: f64 = blocks.iter().map(|b| block_revenue(registry, b)).sum();
    let mean_revenue_target = total_revenue / physicians.len() as f64;
    let _ = total_weeks;

    for physician in physicians {
        let mut weeks_vars = Vec::new();
        let mut weeks_coeffs = Vec::new();
        let mut revenue_vars = Vec::new();
        let mut revenue_coeffs = Vec::new();

        for (idx, block) in blocks.iter().enumerate() {
            if let Some(y) = vars.y(idx, physician.id) {
                weeks_vars.push(y);
                weeks_coeffs.push(block_weeks(block));
                revenue_vars.push(y);
                revenue_coeffs.push(block_revenue(registry, block));
            }
        }

        // |assigned_weeks(p) - desired_weeks(p)| via pos/neg parts:
        // assigned_weeks(p) - pos + neg = desired_weeks(p)
        let desired_weeks = physician.desired_working_weeks * 52.0;
        let weeks_pos = backend.new_continuous_var(&format!("weeks_pos[{}]", physician.full_name), 0.0, f64::MAX);
        let weeks_neg = backend.new_continuous_var(&format!("weeks_neg[{}]", physician.full_name), 0.0, f64::MAX);
        let mut eq_vars = weeks_vars.clone();
        let mut eq_coeffs = weeks_coeffs.clone();
        eq_vars.push(weeks_pos);
        eq_coeffs.push(-1.0);
        eq_vars.push(weeks_neg);
        eq_coeffs.push(1.0);
        backend.add_linear_constraint(&eq_vars, &eq_coeffs, Sense::Eq, desired_weeks, "weeks-balance");
        backend.add_objective_term(weeks_pos, -DESIRED_WEEKS_SCORE);
        backend.add_objective_term(weeks_neg, -DESIRED_WEEKS_SCORE);

        // |revenue(p) - mean_revenue| via pos/neg parts, same pattern.
        let rev_pos = backend.new_continuous_var(&format!("rev_pos[{}]", physician.full_name), 0.0, f64::MAX);
        let rev_neg = backend.new_continuous_var(&format!("rev_neg[{}]", physician.full_name), 0.0, f64::MAX);
        let mut rev_eq_vars = revenue_vars;
        let mut rev_eq_coeffs = revenue_coeffs;
        rev_eq_vars.push(rev_pos);
        rev_eq_coeffs.push(-1.0);
        rev_eq_vars.push(rev_neg);
        rev_eq_coeffs.push(1.0);
        backend.add_linear_constraint(&rev_eq_vars, &rev_eq_coeffs, Sense::Eq, mean_revenue_target, "revenue-balance");
        backend.add_objective_term(rev_pos, -REVENUE_BALANCE_SCORE);
        backend.add_objective_term(rev_neg, -REVENUE_BALANCE_SCORE);
    }
}

/// Large penalty discouraging the solver from leaving a coverable mandatory
/// block to slack.
pub fn assemble_slack_penalty(slack_vars: impl Iterator<Item = crate::solver::VarId>, backend: &mut dyn SolverBackend) {
    for slack in slack_vars {
        backend.add_objective_term(slack, -SLACK_PENALTY);
    }
}

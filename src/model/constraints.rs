//! Constraint Assembler: the five hard constraint families from
//! SPEC_FULL.md §4.5 (C1 is folded into variable creation, see
//! `super::variables`).

use chrono::Duration;

use crate::blocks::{MultiWeekGroup, ScheduledBlock};
use crate::domain::{DaysParameter, Registry, TaskId};
use crate::solver::{Sense, SolverBackend};

use super::variables::VariableSet;

/// C3: mandatory blocks with at least one eligible/available physician
/// (`E(b) != empty`) are covered by exactly that physician (strict
/// equality, no slack - a conflict elsewhere in the model is a genuine
/// infeasibility). Mandatory blocks with no real candidate get a lone
/// slack variable instead. Optional blocks are covered by at most one
/// physician.
pub fn assemble_coverage(blocks: &[ScheduledBlock], vars: &VariableSet, backend: &mut dyn SolverBackend) {
    for (idx, block) in blocks.iter().enumerate() {
        let candidates: Vec<_> = vars.candidates_for_block(idx).collect();
        let (physicians, y_vars): (Vec<_>, Vec<_>) = candidates.into_iter().unzip();
        let coeffs = vec![1.0; y_vars.len()];
        let _ = physicians;

        if block.mandatory {
            if let Some(&slack) = vars.slack.get(&idx) {
                backend.add_linear_constraint(&[slack], &[1.0], Sense::Eq, 1.0, &format!("C3-slack[{idx}]"));
            } else {
                backend.add_linear_constraint(&y_vars, &coeffs, Sense::Eq, 1.0, &format!("C3-mandatory[{idx}]"));
            }
        } else if !y_vars.is_empty() {
            backend.add_linear_constraint(&y_vars, &coeffs, Sense::Le, 1.0, &format!("C3-optional[{idx}]"));
        }
    }
}

/// C4: no physician may hold two overlapping blocks. A sweep over blocks
/// sorted by start date keeps constraint emission linear in the number of
/// truly-overlapping pairs rather than quadratic in the block count.
pub fn assemble_non_simultaneous(blocks: &[ScheduledBlock], vars: &VariableSet, backend: &mut dyn SolverBackend) {
    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by_key(|&i| blocks[i].start_date());

    for (pos, &i) in order.iter().enumerate() {
        for &j in &order[pos + 1..] {
            if blocks[j].start_date() > blocks[i].end_date() {
                break;
            }
            if !blocks[i].overlaps(&blocks[j]) {
                continue;
            }
            for (physician, y_i) in vars.candidates_for_block(i) {
                if let Some(y_j) = vars.y(j, physician) {
                    backend.add_linear_constraint(
                        &[y_i, y_j],
                        &[1.0, 1.0],
                        Sense::Le,
                        1.0,
                        &format!("C4[{i},{j}]"),
                    );
                }
            }
        }
    }
}

/// C5a: multi-week coherence - every block of a group is assigned to the
/// same physician (or none, if optional and uncovered).
pub fn assemble_multi_week_coherence(
    groups: &[MultiWeekGroup],
    registry: &Registry,
    vars: &VariableSet,
    backend: &mut dyn SolverBackend,
) {
    for group in groups {
        if group.blocks.len() < 2 {
            continue;
        }
        for physician in registry.physicians() {
            let per_block: Vec<_> = group.blocks.iter().map(|&idx| vars.y(idx, physician.id)).collect();
            let present_in_all = per_block.iter().all(|v| v.is_some());

            if present_in_all {
                for w in per_block.windows(2) {
                    let (a, b) = (w[0].unwrap(), w[1].unwrap());
                    backend.add_linear_constraint(&[a, b], &[1.0, -1.0], Sense::Eq, 0.0, "C5-coherence");
                }
            } else {
                // Physician cannot hold every block of the group: any stray
                // variable for a subset of the group is forced to zero, since
                // assignment to the group is all-or-nothing.
                for v in per_block.into_iter().flatten() {
                    backend.add_linear_constraint(&[v], &[1.0], Sense::Le, 0.0, "C5-stray-zero");
                }
            }
        }
    }
}

fn is_adjacent_call(category_days: DaysParameter, main: &ScheduledBlock, call: &ScheduledBlock) -> bool {
    match category_days {
        DaysParameter::MultiWeek => {
            let before = call.start_date() - main.start_date();
            let after = main.end_date() - call.start_date();
            (before >= Duration::zero() && before <= Duration::days(7))
                || (after >= Duration::zero() && after <= Duration::days(7))
        }
        DaysParameter::Continuous => {
            let gap = call.start_date() - main.end_date();
            gap >= Duration::zero() && gap <= Duration::days(2)
        }
    }
}

/// C5b: a CALL block may only go to a physician who also holds an adjacent
/// linked MAIN block; every CALL block is capped at one physician even when
/// optional.
pub fn assemble_linkage(
    blocks: &[ScheduledBlock],
    registry: &Registry,
    vars: &VariableSet,
    backend: &mut dyn SolverBackend,
) {
    let call_indices: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| registry.task(b.task).task_type == crate::domain::TaskType::Call)
        .map(|(i, _)| i)
        .collect();

    for &c_idx in &call_indices {
        let call_block = &blocks[c_idx];
        let call_task: TaskId = call_block.task;
        let main_tasks = registry.main_tasks_linked_to(call_task);
        if main_tasks.is_empty() {
            continue;
        }
        let category_days = registry.category(call_block.category).days_parameter;

        let adjacent_main_indices: Vec<usize> = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| main_tasks.contains(&b.task))
            .filter(|(_, b)| is_adjacent_call(category_days, b, call_block))
            .map(|(i, _)| i)
            .collect();

        for (physician, y_call) in vars.candidates_for_block(c_idx) {
            let main_vars: Vec<_> = adjacent_main_indices
                .iter()
                .filter_map(|&m_idx| vars.y(m_idx, physician))
                .collect();

            let mut lhs_vars = vec![y_call];
            let mut lhs_coeffs = vec![1.0];
            for v in &main_vars {
                lhs_vars.push(*v);
                lhs_coeffs.push(-1.0);
            }
            backend.add_linear_constraint(&lhs_vars, &lhs_coeffs, Sense::Le, 0.0, &format!("C5-linkage[{c_idx}]"));
        }
    }
}

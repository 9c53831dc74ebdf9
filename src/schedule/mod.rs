//! Schedule Materializer: turns solver output into the final per-physician
//! assignment list, plus ICS export and the saved-schedule JSON round-trip.

pub mod ics;

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::blocks::ScheduledBlock;
use crate::domain::{DaysParameter, PhysicianId, Registry, TaskType};
use crate::error::{Result, SchedulerError};
use crate::model::objective::{
    CALL_DISTRIBUTION_PENALTY, CALL_SPACING_DAYS, CONSECUTIVE_CATEGORY_PENALTY, DESIRED_WEEKS_SCORE,
    HEAVY_TASK_PENALTY, PREFERENCE_SCORE, REVENUE_BALANCE_SCORE,
};
use crate::model::variables::VariableSet;
use crate::solver::SolverBackend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub task: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// Physician full name -> chronologically ordered assignments.
    pub assignments: HashMap<String, Vec<Assignment>>,
    /// Scheduled blocks that ended up covered by slack rather than a
    /// physician, surfaced for the operator (SPEC_FULL.md §7,
    /// `UnavailableForMandatoryBlock`). Not part of the saved-schedule
    /// document (SPEC_FULL.md §6): a diagnostic, not a persisted field.
    pub uncovered_mandatory_blocks: Vec<String>,
}

/// SPEC_FULL.md §6: the saved-schedule document's top level IS the
/// physician-name -> records map, with no wrapper object around it.
/// `uncovered_mandatory_blocks` is an in-memory diagnostic computed fresh
/// by `materialize_schedule` each run, so it is dropped on save and comes
/// back empty on load.
impl Serialize for Schedule {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.assignments.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let assignments = HashMap::<String, Vec<Assignment>>::deserialize(deserializer)?;
        Ok(Schedule {
            assignments,
            uncovered_mandatory_blocks: Vec::new(),
        })
    }
}

impl Schedule {
    /// Validates the round-trip invariant from SPEC_FULL.md §6: each
    /// assignment's `days` must be contiguous and bounded by `start_date`/
    /// `end_date`, and no physician may hold two overlapping assignments.
    pub fn validate(&self) -> Result<()> {
        for (physician, assignments) in &self.assignments {
            for a in assignments {
                if a.days.first() != Some(&a.start_date) || a.days.last() != Some(&a.end_date) {
                    return Err(SchedulerError::ConfigurationError {
                        path: "schedule.json".into(),
                        reason: format!("assignment '{}' for {physician} has inconsistent day bounds", a.task),
                    });
                }
            }
            let mut sorted = assignments.clone();
            sorted.sort_by_key(|a| a.start_date);
            for pair in sorted.windows(2) {
                if pair[0].end_date >= pair[1].start_date {
                    return Err(SchedulerError::OverlapInLoadedSchedule {
                        physician: physician.clone(),
                        first: pair[0].task.clone(),
                        second: pair[1].task.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Reads solver values and produces the final per-physician assignment
/// list, per SPEC_FULL.md §4.7. Each assignment also carries a diagnostic
/// `score` (§6), grounded in `_calculate_assignment_score` from
/// `original_source/models/math_schedule.py`: the same preference,
/// workload-balance, revenue-balance, consecutive-category, call-spacing
/// and heavy-task terms the Objective Assembler uses, reported per
/// assignment for operator review. Unlike the original's incrementally
/// running totals (order-dependent on solve iteration order, not on the
/// resulting schedule), the balance terms here use each physician's final
/// totals and the clustering terms look at the true chronological
/// predecessor in the materialized schedule - a deterministic reading of
/// the same formula that does not depend on solver internals.
pub fn materialize_schedule(
    registry: &Registry,
    blocks: &[ScheduledBlock],
    vars: &VariableSet,
    backend: &dyn SolverBackend,
) -> Schedule {
    let mut covered: HashMap<PhysicianId, Vec<usize>> = HashMap::new();
    let mut uncovered_mandatory_blocks = Vec::new();

    for (idx, block) in blocks.iter().enumerate() {
        let task = registry.task(block.task);
        let mut is_covered = false;
        for (physician, y) in vars.candidates_for_block(idx) {
            if backend.value(y) > 0.5 {
                is_covered = true;
                covered.entry(physician).or_default().push(idx);
            }
        }
        if block.mandatory && !is_covered {
            if let Some(slack) = vars.slack.get(&idx) {
                if backend.value(*slack) > 0.5 {
                    uncovered_mandatory_blocks.push(format!(
                        "{} {}..{}",
                        task.name,
                        block.start_date(),
                        block.end_date()
                    ));
                }
            }
        }
    }

    for indices in covered.values_mut() {
        indices.sort_by_key(|&idx| blocks[idx].start_date());
    }

    let block_revenue = |idx: usize| -> f64 {
        let task = registry.task(blocks[idx].task);
        registry.category(blocks[idx].category).revenue_for(task.task_type) as f64
    };
    let total_revenue: HashMap<PhysicianId, f64> = covered
        .iter()
        .map(|(&p, indices)| (p, indices.iter().copied().map(block_revenue).sum()))
        .collect();
    let mean_revenue = if total_revenue.is_empty() {
        0.0
    } else {
        total_revenue.values().sum::<f64>() / total_revenue.len() as f64
    };

    let mut assignments: HashMap<String, Vec<Assignment>> = HashMap::new();
    for (physician, indices) in &covered {
        let p = registry.physician(*physician);
        let total_days: usize = indices.iter().map(|&idx| blocks[idx].days.len()).sum();
        let assigned_weeks = total_days as f64 / 7.0;
        let desired_weeks = p.desired_working_weeks * 52.0;
        let weeks_term = DESIRED_WEEKS_SCORE / ((assigned_weeks - desired_weeks).abs() + 1.0);
        let revenue_term = REVENUE_BALANCE_SCORE / ((total_revenue[physician] - mean_revenue).abs() + 1.0);

        let list = assignments.entry(p.full_name.clone()).or_default();
        for (pos, &idx) in indices.iter().enumerate() {
            let block = &blocks[idx];
            let task = registry.task(block.task);
            let category = registry.category(block.category);
            let single_week = category.days_parameter == DaysParameter::Continuous;

            let mut score = weeks_term + revenue_term;
            if let Some(rank) = p.preference_rank(&category.name) {
                score += PREFERENCE_SCORE * (p.preferred_tasks.len() - rank) as f64;
            }
            if pos > 0 {
                let prev = &blocks[indices[pos - 1]];
                if single_week && prev.category == block.category {
                    score += CONSECUTIVE_CATEGORY_PENALTY;
                }
                if single_week && block.is_heavy() && prev.is_heavy() {
                    score += HEAVY_TASK_PENALTY;
                }
            }
            if task.task_type == TaskType::Call {
                let prev_call = indices[..pos]
                    .iter()
                    .rev()
                    .find(|&&i| registry.task(blocks[i].task).task_type == TaskType::Call);
                if let Some(&prev_idx) = prev_call {
                    let gap = block.start_date() - blocks[prev_idx].start_date();
                    if gap <= Duration::days(CALL_SPACING_DAYS) {
                        score += CALL_DISTRIBUTION_PENALTY;
                    }
                }
            }

            list.push(Assignment {
                task: task.name.clone(),
                start_date: block.start_date(),
                end_date: block.end_date(),
                days: block.days.clone(),
                score,
            });
        }
    }

    for list in assignments.values_mut() {
        list.sort_by_key(|a| a.start_date);
    }

    Schedule {
        assignments,
        uncovered_mandatory_blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn assignment(task: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Assignment {
        let start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        let end_date = NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap();
        let mut days = Vec::new();
        let mut d = start_date;
        while d <= end_date {
            days.push(d);
            d += chrono::Duration::days(1);
        }
        Assignment {
            task: task.into(),
            start_date,
            end_date,
            days,
            score: 0.0,
        }
    }

    #[test]
    fn validate_rejects_overlap() {
        let mut schedule = Schedule::default();
        schedule.assignments.insert(
            "Dr. Alpha".into(),
            vec![
                assignment("CTU_A", (2025, 1, 13), (2025, 1, 19)),
                assignment("CTU_B", (2025, 1, 19), (2025, 1, 26)),
            ],
        );
        let err = schedule.validate().unwrap_err();
        assert!(matches!(err, SchedulerError::OverlapInLoadedSchedule { .. }));
    }

    #[test]
    fn validate_rejects_inconsistent_day_bounds() {
        let mut schedule = Schedule::default();
        let mut bad = assignment("CTU_A", (2025, 1, 13), (2025, 1, 19));
        bad.days.pop();
        schedule.assignments.insert("Dr. Alpha".into(), vec![bad]);
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn validate_accepts_disjoint_assignments() {
        let mut schedule = Schedule::default();
        schedule.assignments.insert(
            "Dr. Alpha".into(),
            vec![
                assignment("CTU_A", (2025, 1, 13), (2025, 1, 17)),
                assignment("CTU_B", (2025, 1, 20), (2025, 1, 24)),
            ],
        );
        assert!(schedule.validate().is_ok());
    }
}

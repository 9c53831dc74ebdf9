//! Block Materializer: turns `(Task, PeriodBlock)` pairs into the atomic
//! assignment units the solver reasons about.

use chrono::NaiveDate;

use crate::calendar::{Calendar, PeriodBlockType};
use crate::domain::{CategoryId, DaysParameter, PhysicianId, Registry, TaskId, TaskType};

#[derive(Debug, Clone)]
pub struct ScheduledBlock {
    pub task: TaskId,
    pub category: CategoryId,
    pub week_start: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub heaviness: u32,
    pub mandatory: bool,
    /// Physicians not pre-excluded by qualification/exclusion, kept for
    /// diagnostic traceability (see `crate::cli::debug_trace`).
    pub candidates: Vec<PhysicianId>,
}

impl ScheduledBlock {
    pub fn start_date(&self) -> NaiveDate {
        *self.days.first().expect("block has at least one day")
    }

    pub fn end_date(&self) -> NaiveDate {
        *self.days.last().expect("block has at least one day")
    }

    pub fn is_heavy(&self) -> bool {
        self.heaviness >= 5
    }

    pub fn overlaps(&self, other: &ScheduledBlock) -> bool {
        self.start_date() <= other.end_date() && other.start_date() <= self.end_date()
    }
}

/// A chronologically consecutive run of `ScheduledBlock`s for the same
/// multi-week MAIN task, always assigned to a single physician as a unit.
#[derive(Debug, Clone)]
pub struct MultiWeekGroup {
    pub task: TaskId,
    pub blocks: Vec<usize>, // indices into the flat ScheduledBlock arena
}

pub struct MaterializedBlocks {
    pub blocks: Vec<ScheduledBlock>,
    pub multi_week_groups: Vec<MultiWeekGroup>,
}

fn candidates_for(registry: &Registry, category_id: CategoryId) -> Vec<PhysicianId> {
    let category = registry.category(category_id);
    registry
        .physicians()
        .iter()
        .filter(|p| registry.eligible(p, &category.name))
        .map(|p| p.id)
        .collect()
}

/// Materialize every task's blocks across the decomposed calendar.
///
/// `horizon_end` may extend past the caller's requested end date so that
/// multi-week groups beginning near the boundary have room to complete
/// (see SPEC_FULL.md §4.4, step 1); blocks entirely beyond the caller's
/// original end date are still generated here and filtered by the solver
/// driver only if they fall outside the extended horizon.
pub fn materialize(registry: &Registry, calendar: &Calendar) -> MaterializedBlocks {
    let weeks = calendar.decompose();
    let mut blocks = Vec::new();
    let mut multi_week_groups = Vec::new();

    for task in registry.tasks() {
        let category = registry.category(task.category);
        let candidates = candidates_for(registry, task.category);

        match task.task_type {
            TaskType::Call => {
                for (week_start, period_blocks) in &weeks {
                    for pb in period_blocks.iter().filter(|b| b.block_type == PeriodBlockType::Call) {
                        blocks.push(ScheduledBlock {
                            task: task.id,
                            category: task.category,
                            week_start: *week_start,
                            days: pb.days.clone(),
                            heaviness: task.heaviness,
                            mandatory: task.mandatory,
                            candidates: candidates.clone(),
                        });
                    }
                }
            }
            TaskType::Main => match category.days_parameter {
                DaysParameter::Continuous => {
                    for (week_start, period_blocks) in &weeks {
                        for pb in period_blocks.iter().filter(|b| b.block_type == PeriodBlockType::Main) {
                            blocks.push(ScheduledBlock {
                                task: task.id,
                                category: task.category,
                                week_start: *week_start,
                                days: pb.days.clone(),
                                heaviness: task.heaviness,
                                mandatory: task.mandatory,
                                candidates: candidates.clone(),
                            });
                        }
                    }
                }
                DaysParameter::MultiWeek => {
                    let n = category.number_of_weeks;
                    let mut group_start: Option<usize> = None;
                    let mut indices_for_group: Vec<usize> = Vec::new();

                    for (week_index, (week_start, period_blocks)) in weeks.iter().enumerate() {
                        let Some(main_block) = period_blocks
                            .iter()
                            .find(|b| b.block_type == PeriodBlockType::Main)
                        else {
                            continue;
                        };
                        let aligned = (week_index as u32 + task.week_offset) % n == 0;

                        if aligned {
                            flush_incomplete_group(&mut blocks, &mut group_start, &mut indices_for_group);
                            group_start = Some(week_index);
                        }
                        if group_start.is_none() {
                            // Horizon starts mid-cycle; skip until the next aligned week.
                            continue;
                        }

                        let idx = blocks.len();
                        blocks.push(ScheduledBlock {
                            task: task.id,
                            category: task.category,
                            week_start: *week_start,
                            days: main_block.days.clone(),
                            heaviness: task.heaviness,
                            mandatory: task.mandatory,
                            candidates: candidates.clone(),
                        });
                        indices_for_group.push(idx);

                        if indices_for_group.len() == n as usize {
                            multi_week_groups.push(MultiWeekGroup {
                                task: task.id,
                                blocks: std::mem::take(&mut indices_for_group),
                            });
                            group_start = None;
                        }
                    }
                    // A trailing incomplete group runs off the end of the
                    // horizon; per SPEC_FULL.md §4.3 it is discarded along
                    // with its constituent blocks.
                    for idx in indices_for_group {
                        blocks[idx].mandatory = false;
                        blocks[idx].candidates.clear();
                    }
                }
            },
        }
    }

    MaterializedBlocks {
        blocks,
        multi_week_groups,
    }
}

/// Discards a group interrupted mid-cycle (e.g. by an all-off-day week with
/// no MAIN period block) exactly as the trailing-group case at the end of
/// the horizon is discarded: the already-emitted blocks stay in the arena
/// (other tasks may still reference their indices) but are demoted to
/// non-mandatory with no candidates, and never join a `MultiWeekGroup`.
fn flush_incomplete_group(blocks: &mut [ScheduledBlock], group_start: &mut Option<usize>, indices: &mut Vec<usize>) {
    if group_start.is_some() && !indices.is_empty() {
        for idx in indices.drain(..) {
            blocks[idx].mandatory = false;
            blocks[idx].candidates.clear();
        }
    }
    *group_start = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::domain::Registry;

    /// Scenario 5 (Multi-week alignment): a 4-week horizon, 2-week
    /// multi-week CTU category, `CTU_A.week_offset = 0`,
    /// `CTU_B.week_offset = 1`. `CTU_A` must span weeks 1-2 and weeks 3-4;
    /// `CTU_B` must span only weeks 2-3 (its would-be second group runs off
    /// the end of the horizon and is discarded).
    #[test]
    fn multi_week_offsets_produce_the_expected_group_spans() {
        let mut b = Registry::builder();
        let ctu = b.add_category("CTU", DaysParameter::MultiWeek, 2, 100, 50, false);
        let ctu_a = b.add_task("CTU_A", ctu, TaskType::Main, 0, 3, true);
        let ctu_b = b.add_task("CTU_B", ctu, TaskType::Main, 1, 3, true);
        b.add_physician(|id| crate::domain::Physician {
            id,
            full_name: "Dr. Alpha".into(),
            qualifications: ["CTU".to_string()].into_iter().collect(),
            exclusion_tasks: Default::default(),
            restricted_tasks: Default::default(),
            preferred_tasks: vec![],
            desired_working_weeks: 0.5,
            discontinuity_preference: false,
            unavailability: vec![],
        });
        let registry = b.build().unwrap();

        let calendar = Calendar::new(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 2, 9).unwrap(),
            "QC",
        );
        let materialized = materialize(&registry, &calendar);

        let a_groups: Vec<&MultiWeekGroup> = materialized.multi_week_groups.iter().filter(|g| g.task == ctu_a).collect();
        let b_groups: Vec<&MultiWeekGroup> = materialized.multi_week_groups.iter().filter(|g| g.task == ctu_b).collect();

        assert_eq!(a_groups.len(), 2, "CTU_A should complete two 2-week groups across the 4-week horizon");
        assert_eq!(b_groups.len(), 1, "CTU_B's second group runs off the horizon and must be discarded");

        let a_weeks: Vec<_> = a_groups[0].blocks.iter().map(|&i| materialized.blocks[i].week_start).collect();
        assert_eq!(a_weeks, vec![
            chrono::NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        ]);

        let b_weeks: Vec<_> = b_groups[0].blocks.iter().map(|&i| materialized.blocks[i].week_start).collect();
        assert_eq!(b_weeks, vec![
            chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
        ]);
    }

    /// A MAIN-less week (all days off, SPEC_FULL.md §4.1: "a week containing
    /// only off-days yields a single CALL block") interrupts a multi-week
    /// cycle mid-stream. The partially-built group must be discarded exactly
    /// like a trailing group that runs off the horizon: its blocks are
    /// demoted to non-mandatory with no candidates, and never join a
    /// `MultiWeekGroup`.
    #[test]
    fn main_less_week_discards_the_interrupted_multi_week_group() {
        let mut b = Registry::builder();
        let ctu = b.add_category("CTU", DaysParameter::MultiWeek, 2, 100, 50, false);
        b.add_task("CTU_A", ctu, TaskType::Main, 0, 3, true);
        b.add_physician(|id| crate::domain::Physician {
            id,
            full_name: "Dr. Alpha".into(),
            qualifications: ["CTU".to_string()].into_iter().collect(),
            exclusion_tasks: Default::default(),
            restricted_tasks: Default::default(),
            preferred_tasks: vec![],
            desired_working_weeks: 0.5,
            discontinuity_preference: false,
            unavailability: vec![],
        });
        let registry = b.build().unwrap();

        let mut calendar = Calendar::new(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
            "QC",
        );
        // Make every day of the second week (Jan 20-24) a holiday, so that
        // week yields no MAIN period block at all.
        for d in 20..=24 {
            calendar.add_holiday(chrono::NaiveDate::from_ymd_opt(2025, 1, d).unwrap());
        }

        let materialized = materialize(&registry, &calendar);

        let groups: Vec<&MultiWeekGroup> = materialized.multi_week_groups.iter().collect();
        assert!(groups.is_empty(), "no 2-week group can complete across a MAIN-less interrupting week");

        for block in &materialized.blocks {
            assert!(!block.mandatory, "interrupted group blocks must be demoted to non-mandatory");
            assert!(block.candidates.is_empty(), "interrupted group blocks must have candidates cleared");
        }
    }

    #[test]
    fn call_task_gets_one_scheduled_block_per_week() {
        let mut b = Registry::builder();
        let er = b.add_category("ER", DaysParameter::Continuous, 1, 80, 40, false);
        b.add_task("ER_CALL", er, TaskType::Call, 0, 2, true);
        let registry = b.build().unwrap();

        let calendar = Calendar::new(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 26).unwrap(),
            "QC",
        );
        let materialized = materialize(&registry, &calendar);
        assert_eq!(materialized.blocks.len(), 2);
        assert!(materialized.blocks.iter().all(|b| b.days.len() == 2));
    }
}

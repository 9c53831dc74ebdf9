//! End-to-end scenario tests driven by `RecordingSolver`, covering the
//! concrete scenarios from SPEC_FULL.md §8. Workload/revenue balance terms
//! are disabled here since `RecordingSolver` only brute-forces boolean
//! search spaces (see `model::GenerateOptions::include_balance_terms`).

use chrono::NaiveDate;
use dutyweave::domain::{DaysParameter, Registry, TaskType};
use dutyweave::model::{self, GenerateOptions};
use dutyweave::solver::recording::RecordingSolver;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn opts() -> GenerateOptions {
    GenerateOptions {
        include_balance_terms: false,
        ..GenerateOptions::default()
    }
}

/// Scenario 1 (Minimal): one multi-week category, two physicians, linked call.
fn minimal_registry(exclude_second_physician_from_ctu: bool) -> Registry {
    let mut b = Registry::builder();
    let ctu = b.add_category("CTU", DaysParameter::MultiWeek, 2, 100, 50, false);
    b.add_task("CTU_A", ctu, TaskType::Main, 0, 3, true);
    b.add_task("CTU_B", ctu, TaskType::Main, 1, 3, true);
    b.add_task("CTU_AB_CALL", ctu, TaskType::Call, 0, 2, true);
    b.link("CTU_A", "CTU_AB_CALL");
    b.link("CTU_B", "CTU_AB_CALL");

    b.add_physician(|id| dutyweave::domain::Physician {
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
    b.add_physician(|id| dutyweave::domain::Physician {
        id,
        full_name: "Dr. Beta".into(),
        qualifications: ["CTU".to_string()].into_iter().collect(),
        exclusion_tasks: if exclude_second_physician_from_ctu {
            ["CTU".to_string()].into_iter().collect()
        } else {
            Default::default()
        },
        restricted_tasks: Default::default(),
        preferred_tasks: vec![],
        desired_working_weeks: 0.5,
        discontinuity_preference: false,
        unavailability: vec![],
    });

    b.build().unwrap()
}

#[test]
fn minimal_scenario_links_call_to_main_physician() {
    let registry = minimal_registry(false);
    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 26),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    )
    .expect("minimal scenario is feasible");

    assert!(outcome.schedule.uncovered_mandatory_blocks.is_empty());

    // Every physician who holds a CTU_A/CTU_B block must also hold the
    // CTU_AB_CALL block adjacent to it (the linkage property).
    for (_, assignments) in &outcome.schedule.assignments {
        let main_weeks: Vec<_> = assignments
            .iter()
            .filter(|a| a.task == "CTU_A" || a.task == "CTU_B")
            .collect();
        let call_assignments: Vec<_> = assignments.iter().filter(|a| a.task == "CTU_AB_CALL").collect();
        if !call_assignments.is_empty() {
            assert!(!main_weeks.is_empty(), "call assignment without an adjacent main block");
        }
    }
}

#[test]
fn exclusion_is_respected() {
    let registry = minimal_registry(true);
    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 26),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    )
    .expect("feasible even with one physician excluded");

    let beta_assignments = outcome.schedule.assignments.get("Dr. Beta");
    assert!(
        beta_assignments.is_none() || beta_assignments.unwrap().is_empty(),
        "excluded physician must never be assigned a CTU task"
    );
}

/// Scenario 3 (Unavailability forces slack): single-week mandatory task,
/// both physicians unavailable for its entire span.
#[test]
fn unavailability_forces_slack() {
    let mut b = Registry::builder();
    let er = b.add_category("ER", DaysParameter::Continuous, 1, 80, 40, false);
    b.add_task("ER_SHIFT", er, TaskType::Main, 0, 2, true);

    for name in ["Dr. Alpha", "Dr. Beta"] {
        b.add_physician(|id| dutyweave::domain::Physician {
            id,
            full_name: name.into(),
            qualifications: ["ER".to_string()].into_iter().collect(),
            exclusion_tasks: Default::default(),
            restricted_tasks: Default::default(),
            preferred_tasks: vec![],
            desired_working_weeks: 0.5,
            discontinuity_preference: false,
            unavailability: vec![dutyweave::domain::UnavailabilityInterval {
                start: date(2025, 1, 13),
                end: date(2025, 1, 19),
            }],
        });
    }
    let registry = b.build().unwrap();

    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 19),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    )
    .expect("infeasibility is absorbed by slack, not reported as Infeasible");

    assert_eq!(outcome.schedule.uncovered_mandatory_blocks.len(), 1);
}

/// Scenario 6 (Preference bonus): two equally-eligible physicians, one
/// prefers the category — the solver must pick that one in the tie.
#[test]
fn preference_bonus_breaks_the_tie() {
    let mut b = Registry::builder();
    let er = b.add_category("ER", DaysParameter::Continuous, 1, 80, 40, false);
    b.add_task("ER_SHIFT", er, TaskType::Main, 0, 1, true);

    b.add_physician(|id| dutyweave::domain::Physician {
        id,
        full_name: "Dr. Prefers".into(),
        qualifications: ["ER".to_string()].into_iter().collect(),
        exclusion_tasks: Default::default(),
        restricted_tasks: Default::default(),
        preferred_tasks: vec!["ER".to_string()],
        desired_working_weeks: 0.5,
        discontinuity_preference: false,
        unavailability: vec![],
    });
    b.add_physician(|id| dutyweave::domain::Physician {
        id,
        full_name: "Dr. Neutral".into(),
        qualifications: ["ER".to_string()].into_iter().collect(),
        exclusion_tasks: Default::default(),
        restricted_tasks: Default::default(),
        preferred_tasks: vec![],
        desired_working_weeks: 0.5,
        discontinuity_preference: false,
        unavailability: vec![],
    });
    let registry = b.build().unwrap();

    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 19),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    )
    .expect("feasible");

    let prefers = outcome.schedule.assignments.get("Dr. Prefers").map(|v| v.len()).unwrap_or(0);
    assert_eq!(prefers, 1, "the physician with a matching preference should win the tie");
}

/// Scenario 2 (Single holiday): a mid-week holiday splits the MAIN block of
/// its week but linkage between the CALL block and its adjacent MAIN
/// block(s) still holds (see DESIGN.md, Open Questions, for why the exact
/// day grouping in SPEC_FULL.md §8 is read as a property rather than a
/// literal non-contiguous block).
#[test]
fn single_holiday_does_not_break_linkage() {
    let registry = minimal_registry(false);
    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 26),
        "QC",
        &[date(2025, 1, 20)],
        None,
        &mut solver,
        &opts(),
    )
    .expect("single-holiday scenario is feasible");

    assert!(outcome.schedule.uncovered_mandatory_blocks.is_empty());
    for (_, assignments) in &outcome.schedule.assignments {
        let has_main = assignments.iter().any(|a| a.task == "CTU_A" || a.task == "CTU_B");
        let has_call = assignments.iter().any(|a| a.task == "CTU_AB_CALL");
        if has_call {
            assert!(has_main, "call assignment without an adjacent main block despite the holiday split");
        }
    }
}

/// A genuine conflict (not merely unmet demand) must surface as
/// `InfeasibleError`, not be silently absorbed by slack: two mandatory
/// single-week MAIN blocks overlap in the same week, and only one
/// physician is eligible for both, so C3 (strict coverage, no slack
/// since E(b) is non-empty) and C4 (non-simultaneous) cannot both hold.
#[test]
fn genuine_conflict_is_reported_infeasible_not_absorbed_by_slack() {
    let mut b = Registry::builder();
    let cat_a = b.add_category("A", DaysParameter::Continuous, 1, 80, 0, false);
    let cat_b = b.add_category("B", DaysParameter::Continuous, 1, 80, 0, false);
    b.add_task("A_SHIFT", cat_a, TaskType::Main, 0, 1, true);
    b.add_task("B_SHIFT", cat_b, TaskType::Main, 0, 1, true);
    b.add_physician(|id| dutyweave::domain::Physician {
        id,
        full_name: "Dr. Only".into(),
        qualifications: ["A".to_string(), "B".to_string()].into_iter().collect(),
        exclusion_tasks: Default::default(),
        restricted_tasks: Default::default(),
        preferred_tasks: vec![],
        desired_working_weeks: 1.0,
        discontinuity_preference: false,
        unavailability: vec![],
    });
    let registry = b.build().unwrap();

    let mut solver = RecordingSolver::new();
    let result = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 19),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    );

    assert!(matches!(result, Err(dutyweave::SchedulerError::InfeasibleError { .. })));
}

#[test]
fn schedule_round_trips_through_json() {
    let registry = minimal_registry(false);
    let mut solver = RecordingSolver::new();
    let outcome = model::generate(
        &registry,
        date(2025, 1, 13),
        date(2025, 1, 26),
        "QC",
        &[],
        None,
        &mut solver,
        &opts(),
    )
    .expect("feasible");

    let json = serde_json::to_string(&outcome.schedule).unwrap();
    let reloaded: dutyweave::schedule::Schedule = serde_json::from_str(&json).unwrap();
    reloaded.validate().expect("round-tripped schedule is valid");
    assert_eq!(reloaded.assignments.len(), outcome.schedule.assignments.len());
}

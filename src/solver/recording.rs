//! In-memory solver double used by unit tests (per SPEC_FULL.md §9,
//! "Solver interface"). Solves small boolean ILPs by brute-force search
//! over feasible assignments, which is adequate for the handful of
//! variables a scenario-sized test fixture produces, and lets constraint
//! and objective assembly be exercised without linking HiGHS.

use std::collections::HashMap;

use super::{SolveStatus, SolverBackend, Sense, VarId};

struct Constraint {
    vars: Vec<VarId>,
    coeffs: Vec<f64>,
    sense: Sense,
    rhs: f64,
}

#[derive(Default)]
pub struct RecordingSolver {
    pub var_labels: Vec<String>,
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
    pub hints: HashMap<usize, bool>,
    solution: Vec<f64>,
}

impl RecordingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn satisfies(&self, assignment: &[bool]) -> bool {
        self.constraints.iter().all(|c| {
            let sum: f64 = c
                .vars
                .iter()
                .zip(c.coeffs.iter())
                .map(|(v, &coeff)| if assignment[v.0] { coeff } else { 0.0 })
                .sum();
            match c.sense {
                Sense::Eq => (sum - c.rhs).abs() < 1e-6,
                Sense::Le => sum <= c.rhs + 1e-6,
            }
        })
    }

    fn objective_value(&self, assignment: &[bool]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(i, &v)| if v { self.objective[i] } else { 0.0 })
            .sum()
    }
}

impl SolverBackend for RecordingSolver {
    fn new_bool_var(&mut self, label: &str) -> VarId {
        let id = VarId(self.var_labels.len());
        self.var_labels.push(label.to_string());
        self.objective.push(0.0);
        id
    }

    fn new_continuous_var(&mut self, _label: &str, _lower: f64, _upper: f64) -> VarId {
        panic!(
            "RecordingSolver only brute-forces boolean search spaces; pass \
             include_balance_terms: false when assembling the objective against it"
        );
    }

    fn hint(&mut self, var: VarId, value: bool) {
        self.hints.insert(var.0, value);
    }

    fn add_linear_constraint(&mut self, vars: &[VarId], coeffs: &[f64], sense: Sense, rhs: f64, _label: &str) {
        self.constraints.push(Constraint {
            vars: vars.to_vec(),
            coeffs: coeffs.to_vec(),
            sense,
            rhs,
        });
    }

    fn add_objective_term(&mut self, var: VarId, weight: f64) {
        self.objective[var.0] += weight;
    }

    fn set_time_limit_seconds(&mut self, _seconds: f64) {}

    fn solve(&mut self) -> SolveStatus {
        let n = self.var_labels.len();
        assert!(
            n <= 22,
            "RecordingSolver brute-forces 2^n assignments; fixture has {n} variables"
        );

        let mut best: Option<(f64, Vec<bool>)> = None;
        for mask in 0u32..(1u32 << n) {
            let assignment: Vec<bool> = (0..n).map(|i| (mask >> i) & 1 == 1).collect();
            if !self.satisfies(&assignment) {
                continue;
            }
            let obj = self.objective_value(&assignment);
            if best.as_ref().map(|(b, _)| obj > *b).unwrap_or(true) {
                best = Some((obj, assignment));
            }
        }

        match best {
            Some((_, assignment)) => {
                self.solution = assignment.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect();
                SolveStatus::Optimal
            }
            None => SolveStatus::Infeasible,
        }
    }

    fn value(&self, var: VarId) -> f64 {
        self.solution.get(var.0).copied().unwrap_or(0.0)
    }

    fn export_model(&self) -> String {
        format!("{} vars, {} constraints", self.var_labels.len(), self.constraints.len())
    }
}

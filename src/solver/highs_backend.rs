//! HiGHS-backed implementation of [`super::SolverBackend`].
//!
//! `highs` is a real, actively maintained Rust binding to the HiGHS MIP
//! solver; it is the nearest available pure-Rust analogue to OR-Tools'
//! CP-SAT for this problem shape. Grounded in
//! `examples/other_examples/manifests/christophcharles-Collomatique`,
//! which solves a structurally similar course-timetabling ILP via the
//! sibling `coin_cbc`/`highs` crates (see DESIGN.md).

use highs::{HighsModelStatus, RowProblem, Sense as HighsSense};

use super::{SolveStatus, SolverBackend, Sense, VarId};

struct Constraint {
    vars: Vec<VarId>,
    coeffs: Vec<f64>,
    sense: Sense,
    rhs: f64,
}

/// Buffers the model in plain Rust structures and only hands it to HiGHS at
/// `solve()` time, so variables and constraints can be assembled in any
/// order (the solver trait does not require columns to be declared before
/// the rows that reference them).
#[derive(Default)]
pub struct HighsBackend {
    var_labels: Vec<String>,
    objective: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    integral: Vec<bool>,
    constraints: Vec<Constraint>,
    hints: Vec<Option<bool>>,
    time_limit_seconds: Option<f64>,
    solution: Vec<f64>,
}

impl HighsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SolverBackend for HighsBackend {
    fn new_bool_var(&mut self, label: &str) -> VarId {
        let id = VarId(self.var_labels.len());
        self.var_labels.push(label.to_string());
        self.objective.push(0.0);
        self.bounds.push((0.0, 1.0));
        self.integral.push(true);
        self.hints.push(None);
        id
    }

    fn new_continuous_var(&mut self, label: &str, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.var_labels.len());
        self.var_labels.push(label.to_string());
        self.objective.push(0.0);
        self.bounds.push((lower, upper));
        self.integral.push(false);
        self.hints.push(None);
        id
    }

    fn hint(&mut self, var: VarId, value: bool) {
        // HiGHS's MIP-start interface is not exposed by the `highs` crate
        // version pinned here; the hint is retained for parity with
        // `RecordingSolver` (used in tests) but does not affect the solve.
        self.hints[var.0] = Some(value);
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

    fn set_time_limit_seconds(&mut self, seconds: f64) {
        self.time_limit_seconds = Some(seconds);
    }

    fn solve(&mut self) -> SolveStatus {
        let mut problem = RowProblem::default();
        let cols: Vec<_> = self
            .objective
            .iter()
            .enumerate()
            .map(|(i, &cost)| {
                let (lo, hi) = self.bounds[i];
                if self.integral[i] {
                    problem.add_integer_column(cost, lo..=hi)
                } else {
                    problem.add_column(cost, lo..=hi)
                }
            })
            .collect();

        for c in &self.constraints {
            let row: Vec<(highs::Col, f64)> = c
                .vars
                .iter()
                .zip(c.coeffs.iter())
                .map(|(v, &coeff)| (cols[v.0], coeff))
                .collect();
            match c.sense {
                Sense::Eq => problem.add_row(c.rhs..=c.rhs, &row),
                Sense::Le => problem.add_row(..=c.rhs, &row),
            }
        }

        let mut model = problem.optimise(HighsSense::Maximise);
        if let Some(limit) = self.time_limit_seconds {
            model.set_option("time_limit", limit);
        }
        let solved = model.solve();

        let status = match solved.status() {
            HighsModelStatus::Optimal => SolveStatus::Optimal,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                SolveStatus::Feasible
            }
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            _ => SolveStatus::Unknown,
        };

        if matches!(status, SolveStatus::Optimal | SolveStatus::Feasible) {
            let solution = solved.get_solution();
            self.solution = solution.columns().to_vec();
        }

        status
    }

    fn value(&self, var: VarId) -> f64 {
        self.solution.get(var.0).copied().unwrap_or(0.0)
    }

    fn export_model(&self) -> String {
        let mut out = String::new();
        for (i, label) in self.var_labels.iter().enumerate() {
            out.push_str(&format!("var[{i}] = {label} (obj {})\n", self.objective[i]));
        }
        for c in &self.constraints {
            out.push_str(&format!(
                "{:?} {:?} {} == sense {:?}\n",
                c.vars, c.coeffs, c.rhs, c.sense
            ));
        }
        out
    }
}

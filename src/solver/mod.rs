//! Solver backend abstraction: the core scheduling pipeline depends on this
//! trait, never directly on a concrete ILP/MIP library, so it can be driven
//! in unit tests by [`recording::RecordingSolver`] without linking HiGHS.

pub mod highs_backend;
pub mod recording;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub usize);

/// Linear constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Eq,
    Le,
}

/// A capability injected into the Variable Builder / Constraint Assembler /
/// Objective Assembler. Implementations turn boolean decision variables,
/// linear (in)equalities and a weighted maximization objective into a
/// concrete assignment.
pub trait SolverBackend {
    /// Create a new boolean decision variable, returning its handle.
    fn new_bool_var(&mut self, label: &str) -> VarId;

    /// Create a new non-negative continuous variable (used only by the
    /// workload/revenue-balance deviation terms in the objective, see
    /// `crate::model::objective`).
    fn new_continuous_var(&mut self, label: &str, lower: f64, upper: f64) -> VarId;

    /// Hint a starting value for a variable (used when `use_initial` warm-starts
    /// the solve from a previously saved schedule).
    fn hint(&mut self, var: VarId, value: bool);

    /// `sum(coeffs[i] * vars[i]) <sense> rhs`
    fn add_linear_constraint(&mut self, vars: &[VarId], coeffs: &[f64], sense: Sense, rhs: f64, label: &str);

    /// Add `weight * var` to the objective (to be maximized).
    fn add_objective_term(&mut self, var: VarId, weight: f64);

    fn set_time_limit_seconds(&mut self, seconds: f64);

    fn solve(&mut self) -> SolveStatus;

    /// Value of a variable after a successful solve (0.0 or 1.0 for bool vars).
    fn value(&self, var: VarId) -> f64;

    /// Serialize the model for offline inspection when infeasible.
    fn export_model(&self) -> String;
}

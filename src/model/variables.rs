use std::collections::HashMap;

use crate::blocks::ScheduledBlock;
use crate::domain::{PhysicianId, Registry};
use crate::solver::{SolverBackend, VarId};

/// All decision/slack variables for one solve, keyed for O(1) lookup by the
/// Constraint and Objective Assemblers.
pub struct VariableSet {
    pub assignment: HashMap<(usize, PhysicianId), VarId>,
    pub slack: HashMap<usize, VarId>,
}

impl VariableSet {
    pub fn y(&self, block_idx: usize, physician: PhysicianId) -> Option<VarId> {
        self.assignment.get(&(block_idx, physician)).copied()
    }

    pub fn candidates_for_block(&self, block_idx: usize) -> impl Iterator<Item = (PhysicianId, VarId)> + '_ {
        self.assignment
            .iter()
            .filter(move |((b, _), _)| *b == block_idx)
            .map(|((_, p), v)| (*p, *v))
    }
}

/// Create `y[block, physician]` for every block x pre-filtered candidate,
/// plus a slack variable for every mandatory block whose candidate set
/// (E(b) in SPEC_FULL.md §4.5, C3) turns out empty once availability is
/// applied. A mandatory block with at least one real candidate gets no
/// slack at all: its coverage constraint is a strict equality, so a
/// contradiction elsewhere in the model (e.g. two mandatory blocks
/// overlapping with only one shared eligible physician, C4) surfaces as
/// genuine infeasibility rather than being quietly absorbed.
pub fn build_variables(
    registry: &Registry,
    blocks: &[ScheduledBlock],
    backend: &mut dyn SolverBackend,
) -> VariableSet {
    let mut assignment = HashMap::new();
    let mut slack = HashMap::new();

    for (idx, block) in blocks.iter().enumerate() {
        let task = registry.task(block.task);
        let mut any_candidate = false;
        for &physician in &block.candidates {
            // C1 (availability): physicians unavailable on any day of the
            // block never get a variable at all, which is equivalent to
            // forcing y=0 but avoids inflating the model with dead columns.
            let p = registry.physician(physician);
            if block.days.iter().any(|&d| p.is_unavailable(d)) {
                continue;
            }
            let label = format!(
                "y[{}#{},{}]",
                task.name,
                idx,
                registry.physician(physician).full_name
            );
            let var = backend.new_bool_var(&label);
            assignment.insert((idx, physician), var);
            any_candidate = true;
        }
        if block.mandatory && !any_candidate {
            let label = format!("slack[{}#{}]", task.name, idx);
            let var = backend.new_bool_var(&label);
            slack.insert(idx, var);
        }
    }

    VariableSet { assignment, slack }
}

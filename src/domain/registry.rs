use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::ids::{CategoryId, PhysicianId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysParameter {
    Continuous,
    MultiWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Main,
    Call,
}

#[derive(Debug, Clone)]
pub struct TaskCategory {
    pub id: CategoryId,
    pub name: String,
    pub days_parameter: DaysParameter,
    pub number_of_weeks: u32,
    pub weekday_revenue: u32,
    pub call_revenue: u32,
    pub restricted: bool,
}

impl TaskCategory {
    pub fn revenue_for(&self, task_type: TaskType) -> u32 {
        match task_type {
            TaskType::Main => self.weekday_revenue,
            TaskType::Call => self.call_revenue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub category: CategoryId,
    pub task_type: TaskType,
    /// MAIN only: phase offset aligning multi-week blocks across the horizon.
    pub week_offset: u32,
    pub heaviness: u32,
    pub mandatory: bool,
}

impl Task {
    pub fn is_heavy(&self) -> bool {
        self.heaviness >= 5
    }
}

/// Single date or closed date range during which a physician is unavailable.
#[derive(Debug, Clone, Copy)]
pub struct UnavailabilityInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl UnavailabilityInterval {
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

#[derive(Debug, Clone)]
pub struct Physician {
    pub id: PhysicianId,
    pub full_name: String,
    pub qualifications: HashSet<String>,
    pub exclusion_tasks: HashSet<String>,
    /// Informational only; never wired into a hard constraint. See DESIGN.md.
    pub restricted_tasks: HashSet<String>,
    pub preferred_tasks: Vec<String>,
    pub desired_working_weeks: f64,
    pub discontinuity_preference: bool,
    pub unavailability: Vec<UnavailabilityInterval>,
}

impl Physician {
    pub fn is_unavailable(&self, day: NaiveDate) -> bool {
        self.unavailability.iter().any(|iv| iv.contains(day))
    }

    pub fn is_excluded_from(&self, category_name: &str) -> bool {
        self.exclusion_tasks.contains(category_name)
    }

    pub fn preference_rank(&self, category_name: &str) -> Option<usize> {
        self.preferred_tasks.iter().position(|c| c == category_name)
    }
}

/// Immutable catalog of categories, tasks, linkages and physicians.
///
/// Built once from validated configuration documents ([crate::config]) and
/// never mutated afterward - the scheduling pipeline only ever reads from
/// it, so there is no interior mutability or locking to reason about.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    categories: Vec<TaskCategory>,
    tasks: Vec<Task>,
    physicians: Vec<Physician>,
    /// MAIN task id -> CALL task id, within the same category.
    linkages: HashMap<TaskId, TaskId>,
    task_name_index: HashMap<String, TaskId>,
    category_name_index: HashMap<String, CategoryId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn category(&self, id: CategoryId) -> &TaskCategory {
        &self.categories[id.index()]
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    pub fn physician(&self, id: PhysicianId) -> &Physician {
        &self.physicians[id.index()]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn physicians(&self) -> &[Physician] {
        &self.physicians
    }

    pub fn categories(&self) -> &[TaskCategory] {
        &self.categories
    }

    pub fn get_task(&self, name: &str) -> Option<TaskId> {
        self.task_name_index.get(name).copied()
    }

    pub fn get_category(&self, name: &str) -> Option<CategoryId> {
        self.category_name_index.get(name).copied()
    }

    pub fn tasks_by_type(&self, task_type: TaskType) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.task_type == task_type)
    }

    pub fn linked_call_of(&self, main_task: TaskId) -> Option<TaskId> {
        self.linkages.get(&main_task).copied()
    }

    /// MAIN tasks linked to a given CALL task (several MAIN tasks may share
    /// one CALL task, e.g. CTU_A, CTU_B -> CTU_AB_CALL).
    pub fn main_tasks_linked_to(&self, call_task: TaskId) -> Vec<TaskId> {
        self.linkages
            .iter()
            .filter(|(_, call)| **call == call_task)
            .map(|(main, _)| *main)
            .collect()
    }

    pub fn eligible(&self, physician: &Physician, category_name: &str) -> bool {
        physician.qualifications.contains(category_name) && !physician.is_excluded_from(category_name)
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    categories: Vec<TaskCategory>,
    tasks: Vec<Task>,
    physicians: Vec<Physician>,
    linkages: Vec<(String, String)>,
}

impl RegistryBuilder {
    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        days_parameter: DaysParameter,
        number_of_weeks: u32,
        weekday_revenue: u32,
        call_revenue: u32,
        restricted: bool,
    ) -> CategoryId {
        let id = CategoryId(self.categories.len());
        self.categories.push(TaskCategory {
            id,
            name: name.into(),
            days_parameter,
            number_of_weeks,
            weekday_revenue,
            call_revenue,
            restricted,
        });
        id
    }

    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        category: CategoryId,
        task_type: TaskType,
        week_offset: u32,
        heaviness: u32,
        mandatory: bool,
    ) -> TaskId {
        let id = TaskId(self.tasks.len());
        self.tasks.push(Task {
            id,
            name: name.into(),
            category,
            task_type,
            week_offset,
            heaviness,
            mandatory,
        });
        id
    }

    pub fn link(&mut self, main_task_name: impl Into<String>, call_task_name: impl Into<String>) {
        self.linkages.push((main_task_name.into(), call_task_name.into()));
    }

    pub fn add_physician(&mut self, physician: impl FnOnce(PhysicianId) -> Physician) -> PhysicianId {
        let id = PhysicianId(self.physicians.len());
        let physician = physician(id);
        self.physicians.push(physician);
        id
    }

    pub fn build(self) -> crate::error::Result<Registry> {
        let mut task_name_index = HashMap::new();
        for t in &self.tasks {
            task_name_index.insert(t.name.clone(), t.id);
        }
        let mut category_name_index = HashMap::new();
        for c in &self.categories {
            category_name_index.insert(c.name.clone(), c.id);
        }

        let mut linkages = HashMap::new();
        for (main_name, call_name) in &self.linkages {
            let main_id = task_name_index
                .get(main_name)
                .copied()
                .ok_or_else(|| crate::error::SchedulerError::ConfigurationError {
                    path: "tasks.json".into(),
                    reason: format!("link references unknown MAIN task '{main_name}'"),
                })?;
            let call_id = task_name_index
                .get(call_name)
                .copied()
                .ok_or_else(|| crate::error::SchedulerError::ConfigurationError {
                    path: "tasks.json".into(),
                    reason: format!("link references unknown CALL task '{call_name}'"),
                })?;
            linkages.insert(main_id, call_id);
        }

        Ok(Registry {
            categories: self.categories,
            tasks: self.tasks,
            physicians: self.physicians,
            linkages,
            task_name_index,
            category_name_index,
        })
    }
}

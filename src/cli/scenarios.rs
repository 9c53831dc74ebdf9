//! Scenario composition: a scenario is a named directory under
//! `scenarios/<name>/` holding some subset of `tasks.json`,
//! `physicians.json`, `calendar.json`, `schedule.json`. `run` composes one
//! scenario by name, optionally overriding individual fragments from other
//! named scenarios; `run-all` enumerates every scenario directory present.

use std::path::{Path, PathBuf};

pub struct ScenarioPaths {
    pub tasks: PathBuf,
    pub physicians: PathBuf,
    pub calendar: PathBuf,
    pub schedule: Option<PathBuf>,
}

fn fragment_path(scenarios_root: &Path, scenario: &str, file: &str) -> PathBuf {
    scenarios_root.join(scenario).join(file)
}

pub fn compose(
    scenarios_root: &Path,
    scenario: &str,
    task_scenario: Option<&str>,
    physician_scenario: Option<&str>,
    calendar_scenario: Option<&str>,
    schedule_scenario: Option<&str>,
) -> ScenarioPaths {
    let tasks = fragment_path(scenarios_root, task_scenario.unwrap_or(scenario), "tasks.json");
    let physicians = fragment_path(scenarios_root, physician_scenario.unwrap_or(scenario), "physicians.json");
    let calendar = fragment_path(scenarios_root, calendar_scenario.unwrap_or(scenario), "calendar.json");
    let schedule_path = fragment_path(scenarios_root, schedule_scenario.unwrap_or(scenario), "schedule.json");
    let schedule = schedule_path.exists().then_some(schedule_path);

    ScenarioPaths {
        tasks,
        physicians,
        calendar,
        schedule,
    }
}

/// Every named scenario directory directly under `scenarios_root`.
pub fn list_scenarios(scenarios_root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(scenarios_root) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

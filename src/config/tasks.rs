//! Loads and validates `tasks.json` into a `(categories, tasks, linkages)`
//! fragment of the [`Registry`](crate::domain::Registry).

use std::path::Path;

use serde::Deserialize;

use crate::domain::{DaysParameter, RegistryBuilder, TaskType};
use crate::error::{Result, SchedulerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DaysParameterDoc {
    Continuous,
    MultiWeek,
}

impl From<DaysParameterDoc> for DaysParameter {
    fn from(value: DaysParameterDoc) -> Self {
        match value {
            DaysParameterDoc::Continuous => DaysParameter::Continuous,
            DaysParameterDoc::MultiWeek => DaysParameter::MultiWeek,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaskTypeDoc {
    Main,
    Call,
}

impl From<TaskTypeDoc> for TaskType {
    fn from(value: TaskTypeDoc) -> Self {
        match value {
            TaskTypeDoc::Main => TaskType::Main,
            TaskTypeDoc::Call => TaskType::Call,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryDoc {
    name: String,
    days_parameter: DaysParameterDoc,
    #[serde(default = "default_number_of_weeks")]
    number_of_weeks: u32,
    weekday_revenue: u32,
    call_revenue: u32,
    #[serde(default)]
    restricted: bool,
}

fn default_number_of_weeks() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TaskDoc {
    name: String,
    category: String,
    #[serde(rename = "type")]
    task_type: TaskTypeDoc,
    #[serde(default)]
    week_offset: u32,
    #[serde(default = "default_heaviness")]
    heaviness: u32,
    #[serde(default)]
    mandatory: bool,
}

fn default_heaviness() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct LinkageDoc {
    main: String,
    call: String,
}

#[derive(Debug, Deserialize)]
struct TasksDoc {
    categories: Vec<CategoryDoc>,
    tasks: Vec<TaskDoc>,
    #[serde(default)]
    linkages: Vec<LinkageDoc>,
}

pub fn load(path: &Path, builder: &mut RegistryBuilder) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let doc: TasksDoc = serde_json::from_str(&text).map_err(|e| SchedulerError::ConfigurationError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut category_ids = std::collections::HashMap::new();
    let mut category_weeks = std::collections::HashMap::new();
    for c in doc.categories {
        if c.days_parameter_is_multi_week() && c.number_of_weeks < 2 {
            return Err(SchedulerError::ConfigurationError {
                path: path.to_path_buf(),
                reason: format!("category '{}' is multi_week but number_of_weeks < 2", c.name),
            });
        }
        let id = builder.add_category(
            c.name.clone(),
            c.days_parameter.into(),
            c.number_of_weeks,
            c.weekday_revenue,
            c.call_revenue,
            c.restricted,
        );
        category_weeks.insert(c.name.clone(), c.number_of_weeks);
        category_ids.insert(c.name, id);
    }

    for t in doc.tasks {
        let Some(&category_id) = category_ids.get(&t.category) else {
            return Err(SchedulerError::ConfigurationError {
                path: path.to_path_buf(),
                reason: format!("task '{}' references unknown category '{}'", t.name, t.category),
            });
        };
        let number_of_weeks = category_weeks[&t.category];
        if t.week_offset >= number_of_weeks {
            return Err(SchedulerError::ConfigurationError {
                path: path.to_path_buf(),
                reason: format!(
                    "task '{}' has week_offset={} >= category '{}' number_of_weeks={}",
                    t.name, t.week_offset, t.category, number_of_weeks
                ),
            });
        }
        builder.add_task(t.name, category_id, t.task_type.into(), t.week_offset, t.heaviness, t.mandatory);
    }

    for l in doc.linkages {
        builder.link(l.main, l.call);
    }

    Ok(())
}

impl CategoryDoc {
    fn days_parameter_is_multi_week(&self) -> bool {
        matches!(self.days_parameter, DaysParameterDoc::MultiWeek)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Registry;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn rejects_multi_week_category_with_too_few_weeks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tasks.json",
            r#"{
                "categories": [
                    {"name": "CTU", "days_parameter": "multi_week", "number_of_weeks": 1,
                     "weekday_revenue": 100, "call_revenue": 50}
                ],
                "tasks": []
            }"#,
        );
        let mut builder = Registry::builder();
        let err = load(&path, &mut builder).unwrap_err();
        assert!(err.to_string().contains("number_of_weeks"));
    }

    #[test]
    fn rejects_week_offset_at_or_above_number_of_weeks() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tasks.json",
            r#"{
                "categories": [
                    {"name": "CTU", "days_parameter": "multi_week", "number_of_weeks": 2,
                     "weekday_revenue": 100, "call_revenue": 50}
                ],
                "tasks": [
                    {"name": "CTU_A", "category": "CTU", "type": "main", "week_offset": 2}
                ]
            }"#,
        );
        let mut builder = Registry::builder();
        let err = load(&path, &mut builder).unwrap_err();
        assert!(err.to_string().contains("week_offset"));
    }

    #[test]
    fn rejects_task_referencing_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tasks.json",
            r#"{
                "categories": [],
                "tasks": [
                    {"name": "CTU_A", "category": "CTU", "type": "main"}
                ]
            }"#,
        );
        let mut builder = Registry::builder();
        let err = load(&path, &mut builder).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "tasks.json", "{not json");
        let mut builder = Registry::builder();
        assert!(load(&path, &mut builder).is_err());
    }

    #[test]
    fn loads_categories_tasks_and_linkages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "tasks.json",
            r#"{
                "categories": [
                    {"name": "CTU", "days_parameter": "multi_week", "number_of_weeks": 2,
                     "weekday_revenue": 100, "call_revenue": 50}
                ],
                "tasks": [
                    {"name": "CTU_A", "category": "CTU", "type": "main", "mandatory": true},
                    {"name": "CTU_AB_CALL", "category": "CTU", "type": "call", "mandatory": true}
                ],
                "linkages": [
                    {"main": "CTU_A", "call": "CTU_AB_CALL"}
                ]
            }"#,
        );
        let mut builder = Registry::builder();
        load(&path, &mut builder).unwrap();
        let registry = builder.build().unwrap();
        let main = registry.get_task("CTU_A").unwrap();
        let call = registry.get_task("CTU_AB_CALL").unwrap();
        assert_eq!(registry.linked_call_of(main), Some(call));
    }
}

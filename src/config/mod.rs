//! Configuration layer: JSON document loading/validation, generalized from
//! the teacher's SQLite-backed `db`/`models` modules (see DESIGN.md) - the
//! Registry is immutable after load, so there is no schema migration or
//! transactional persistence to manage, only a one-shot parse + validate.

pub mod calendar;
pub mod holidays_api;
pub mod physicians;
pub mod schedule_doc;
pub mod tasks;

use std::path::Path;

use crate::domain::Registry;
use crate::error::Result;

/// Loads `tasks.json` + `physicians.json` into a single immutable [`Registry`].
pub fn load_registry(tasks_path: &Path, physicians_path: &Path) -> Result<Registry> {
    let mut builder = Registry::builder();
    tasks::load(tasks_path, &mut builder)?;
    physicians::load(physicians_path, &mut builder)?;
    builder.build()
}

//! Load/save for the saved-schedule JSON document (SPEC_FULL.md §6).

use std::path::Path;

use crate::error::Result;
use crate::schedule::Schedule;

pub fn load(path: &Path) -> Result<Schedule> {
    let text = std::fs::read_to_string(path)?;
    let schedule: Schedule = serde_json::from_str(&text)?;
    schedule.validate()?;
    Ok(schedule)
}

pub fn save(path: &Path, schedule: &Schedule) -> Result<()> {
    let text = serde_json::to_string_pretty(schedule)?;
    std::fs::write(path, text)?;
    Ok(())
}

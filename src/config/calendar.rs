//! Loads and validates `calendar.json` into a [`Calendar`](crate::calendar::Calendar).

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calendar::Calendar;
use crate::error::{Result, SchedulerError};

#[derive(Debug, Deserialize)]
struct CalendarDoc {
    start_date: NaiveDate,
    end_date: NaiveDate,
    region: String,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

pub fn load(path: &Path) -> Result<Calendar> {
    let text = std::fs::read_to_string(path)?;
    let doc: CalendarDoc = serde_json::from_str(&text).map_err(|e| SchedulerError::ConfigurationError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if doc.end_date < doc.start_date {
        return Err(SchedulerError::ConfigurationError {
            path: path.to_path_buf(),
            reason: format!("end_date {} precedes start_date {}", doc.end_date, doc.start_date),
        });
    }

    let mut calendar = Calendar::new(doc.start_date, doc.end_date, doc.region);
    for h in doc.holidays {
        calendar.add_holiday(h);
    }
    Ok(calendar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn rejects_end_date_before_start_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "calendar.json",
            r#"{"start_date": "2025-01-26", "end_date": "2025-01-13", "region": "QC"}"#,
        );
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("precedes"));
    }

    #[test]
    fn loads_holidays() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "calendar.json",
            r#"{"start_date": "2025-01-13", "end_date": "2025-01-26", "region": "QC",
                "holidays": ["2025-01-20"]}"#,
        );
        let calendar = load(&path).unwrap();
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()));
    }
}
